use image::{ImageBuffer, Rgb};
use slide_report::{Layout, Presentation};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::process::{Command, Output};
use std::thread;
use tempfile::TempDir;
use zip::ZipArchive;

fn run_command(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slide-report"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn png_bytes() -> Vec<u8> {
    let img = ImageBuffer::from_fn(40, 30, |x, y| Rgb([(x * 6) as u8, (y * 8) as u8, 128u8]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageOutputFormat::Png)
        .expect("Failed to encode image");
    out.into_inner()
}

/// Serve `count` requests with the given status and body, returning the URL
fn serve(status: u16, body: Vec<u8>, count: usize) -> String {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("Failed to start server");
    let port = server
        .server_addr()
        .to_ip()
        .expect("Server has no IP address")
        .port();
    thread::spawn(move || {
        for _ in 0..count {
            if let Ok(request) = server.recv() {
                let response = tiny_http::Response::from_data(body.clone())
                    .with_status_code(tiny_http::StatusCode(status));
                let _ = request.respond(response);
            }
        }
    });
    format!("http://127.0.0.1:{}/S_N-Diagram.png", port)
}

fn write_sample(dir: &Path) -> std::path::PathBuf {
    fs::write(dir.join("plot_data.csv"), "1;2\n3;4\n5;3\n").expect("Failed to write plot data");
    let config = dir.join("sample.json");
    fs::write(
        &config,
        r#"{"presentation": [
            {"type": "title", "title": "Fatigue report", "content": "Generated slides"},
            {"type": "text", "title": "Summary", "content": "All specimens passed."},
            {"type": "list", "title": "Contents", "content": [
                {"text": "Setup", "level": 0},
                {"text": "Specimens", "level": 1},
                {"text": "Results", "level": 0}
            ]},
            {"type": "graph", "title": "not a type"},
            {"type": "picture", "title": "S-N Diagram", "content": "picture.png"},
            {"type": "plot", "title": "Load history", "content": "plot_data.csv",
             "configuration": {"x-label": "Cycles", "y-label": "Stress"}}
        ]}"#,
    )
    .expect("Failed to write config");
    config
}

#[test]
fn test_generate_command_builds_full_deck() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_sample(temp_dir.path());
    let output_path = temp_dir.path().join("example_output.pptx");
    let url = serve(200, png_bytes(), 1);

    let output = run_command(&[
        "generate",
        "-c",
        config.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
        "--picture-url",
        &url,
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(output_path.exists(), "PPTX file was not created");
    assert!(!temp_dir.path().join("picture.png").exists(), "Downloaded picture was left behind");

    let deck = Presentation::open(&output_path).expect("Failed to open output");
    assert_eq!(deck.slide_count(), 5);

    let titles: Vec<_> = deck.slides().iter().filter_map(|s| s.title()).collect();
    assert_eq!(
        titles,
        vec!["Fatigue report", "Summary", "Contents", "S-N Diagram", "Load history"]
    );
    assert_eq!(deck.slides()[0].layout(), Layout::Title);
    assert_eq!(deck.slides()[0].body().text(), "Generated slides");
    assert_eq!(deck.slides()[2].layout(), Layout::TitleAndContent);
    let levels: Vec<_> = deck.slides()[2]
        .body()
        .paragraphs()
        .iter()
        .map(|p| p.level)
        .collect();
    assert_eq!(levels, vec![0, 1, 0]);
    assert_eq!(deck.slides()[3].pictures().count(), 1);
    assert_eq!(deck.slides()[4].pictures().count(), 1);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Invalid 'type' value: 'graph', Index: 3"), "stdout: {}", stdout);
}

#[test]
fn test_picture_fetch_failure_keeps_title_only_slide() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_sample(temp_dir.path());
    let output_path = temp_dir.path().join("out.pptx");
    let url = serve(404, b"missing".to_vec(), 1);

    let output = run_command(&[
        "generate",
        "--config",
        config.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
        "--picture-url",
        &url,
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let deck = Presentation::open(&output_path).expect("Failed to open output");
    assert_eq!(deck.slide_count(), 5);
    let picture_slide = &deck.slides()[3];
    assert_eq!(picture_slide.title(), Some("S-N Diagram"));
    assert_eq!(picture_slide.pictures().count(), 0);
    assert!(!temp_dir.path().join("picture.png").exists());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Response status: '404'"), "stdout: {}", stdout);
}

#[test]
fn test_malformed_plot_data_aborts_with_partial_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("bad.csv"), "1;2\n3;oops\n").unwrap();
    let config = temp_dir.path().join("sample.json");
    fs::write(
        &config,
        r#"[
            {"type": "title", "title": "Before", "content": "ok"},
            {"type": "plot", "title": "Broken", "content": "bad.csv",
             "configuration": {"x-label": "X", "y-label": "Y"}},
            {"type": "title", "title": "After", "content": "never"}
        ]"#,
    )
    .unwrap();
    let output_path = temp_dir.path().join("out.pptx");

    let output = run_command(&[
        "generate",
        "-c",
        config.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
    ]);
    assert!(!output.status.success(), "Command should fail: {:?}", output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Malformed plot data"), "stderr: {}", stderr);

    let deck = Presentation::open(&output_path).expect("Partial output should exist");
    assert_eq!(deck.slide_count(), 1);
    assert_eq!(deck.slides()[0].title(), Some("Before"));

    // With --keep-going the broken record is skipped instead
    let output = run_command(&[
        "generate",
        "-c",
        config.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
        "--keep-going",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    let deck = Presentation::open(&output_path).unwrap();
    assert_eq!(deck.slide_count(), 2);
    assert_eq!(deck.slides()[1].title(), Some("After"));
}

#[test]
fn test_output_is_a_valid_pptx_package() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = temp_dir.path().join("sample.json");
    fs::write(
        &config,
        r#"[
            {"type": "title", "title": "One", "content": "a"},
            {"type": "text", "title": "Two", "content": "b"}
        ]"#,
    )
    .unwrap();
    let output_path = temp_dir.path().join("out.pptx");

    let output = run_command(&[
        "generate",
        "-c",
        config.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let file = fs::File::open(&output_path).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    let names: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .collect();

    for required in [
        "[Content_Types].xml",
        "_rels/.rels",
        "ppt/presentation.xml",
        "ppt/_rels/presentation.xml.rels",
        "ppt/slideMasters/slideMaster1.xml",
        "ppt/theme/theme1.xml",
        "ppt/slideLayouts/slideLayout1.xml",
        "ppt/slides/slide1.xml",
        "ppt/slides/slide2.xml",
    ] {
        assert!(names.iter().any(|n| n == required), "missing part {}", required);
    }
    assert!(!names.iter().any(|n| n == "ppt/slides/slide3.xml"));
}

#[test]
fn test_inspect_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = temp_dir.path().join("sample.json");
    fs::write(
        &config,
        r#"[{"type": "list", "title": "Agenda", "content": [{"text": "First", "level": 0}]}]"#,
    )
    .unwrap();
    let output_path = temp_dir.path().join("out.pptx");
    let output = run_command(&[
        "generate",
        "-c",
        config.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let output = run_command(&["inspect", output_path.to_str().unwrap()]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 slides"));
    assert!(stdout.contains("[Title and Content] Agenda"));
    assert!(stdout.contains("- First"));
}
