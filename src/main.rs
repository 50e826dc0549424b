// ABOUTME: Main entry point for the slide-report program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the slide records of a config document into a presentation
    Generate(GenerateArgs),

    /// Print a summary of a generated presentation
    Inspect {
        /// Path to the .pptx file
        path: PathBuf,
    },
}

#[derive(Args, Default)]
struct GenerateArgs {
    /// Path to the JSON config document
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the output presentation
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// URL of the image shown on picture slides
    #[arg(long)]
    picture_url: Option<String>,

    /// Skip records whose renderer fails instead of stopping the run
    #[arg(long)]
    keep_going: bool,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let config = slide_report::Config::from_env().with_overrides(
        args.config.clone(),
        args.output.clone(),
        args.picture_url.clone(),
        args.keep_going,
    );
    let report = slide_report::generate_report(&config)?;

    println!(
        "Presentation generated successfully: {:?} ({} slides from {} records)",
        report.output_path, report.slides, report.records
    );
    for diagnostic in &report.diagnostics {
        println!("  warning: {}", diagnostic);
    }
    Ok(())
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let deck = slide_report::Presentation::open(path)?;
    println!("{:?}: {} slides", path, deck.slide_count());
    for (i, slide) in deck.slides().iter().enumerate() {
        println!(
            "  {:>3}. [{}] {}",
            i + 1,
            slide.layout().name(),
            slide.title().unwrap_or("")
        );
        for paragraph in slide.body().paragraphs() {
            println!(
                "       {}- {}",
                "  ".repeat(paragraph.level as usize),
                paragraph.text
            );
        }
        for (_, text) in slide.text_boxes() {
            println!("       text: {}", text.text());
        }
        for picture in slide.pictures() {
            println!(
                "       picture: {} ({}, {} bytes)",
                picture.name,
                picture.format.extension(),
                picture.data.len()
            );
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Some(Commands::Generate(args)) => generate(args),
        Some(Commands::Inspect { path }) => inspect(path),
        None => generate(&GenerateArgs::default()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
