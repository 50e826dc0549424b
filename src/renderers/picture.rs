// ABOUTME: Picture slide renderer for the slide-report application
// ABOUTME: Downloads the report picture, embeds it and removes the local copy

use super::{titled_slide, Renderer};
use crate::errors::{ReportError, Result};
use crate::fetch::ImageFetcher;
use crate::pptx::{Layout, Rect, Slide, EMU_PER_INCH};
use crate::record::Record;
use crate::session::{Diagnostic, DocumentSession};
use crate::utils;
use log::{debug, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// 1.42in, 1.21in, 7.185in x 4.54in
pub const PICTURE_FRAME: Rect = Rect {
    x: 142 * EMU_PER_INCH / 100,
    y: 121 * EMU_PER_INCH / 100,
    cx: 7185 * EMU_PER_INCH / 1000,
    cy: 454 * EMU_PER_INCH / 100,
};

/// Picture slide showing an image downloaded from a fixed URL.
///
/// The download is stored as PNG at the path named by the record's `content`
/// (or a temporary file when `content` is empty), embedded from there, and
/// the file is removed again whatever the outcome. A `content` path that
/// already exists is never written; the slide then keeps only its title.
pub struct PictureRenderer {
    fetcher: Box<dyn ImageFetcher>,
    url: String,
    base_dir: Option<PathBuf>,
}

impl PictureRenderer {
    pub fn new(fetcher: Box<dyn ImageFetcher>, url: &str, base_dir: Option<&Path>) -> Self {
        Self {
            fetcher,
            url: url.to_string(),
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    fn attach_image(&self, slide: &mut Slide, body: &[u8], target: &str) -> Result<()> {
        let image = image::load_from_memory(body)?;
        let (scratch, file) = if target.is_empty() {
            ScratchImage::temporary()?
        } else {
            ScratchImage::create(utils::resolve_relative_to(self.base_dir.as_deref(), target))?
        };
        let mut writer = BufWriter::new(file);
        image.write_to(&mut writer, image::ImageOutputFormat::Png)?;
        writer.flush().map_err(ReportError::FileReadError)?;
        drop(writer);
        slide.add_picture_file(scratch.path(), PICTURE_FRAME)
    }
}

impl Renderer for PictureRenderer {
    fn name(&self) -> &'static str {
        "picture"
    }

    fn layout(&self) -> Layout {
        Layout::TitleOnly
    }

    fn build(&self, record: &Record, session: &mut DocumentSession) -> Result<Slide> {
        let mut slide = titled_slide(self.layout(), record)?;
        let target = record.content_str()?;
        let index = record.index();

        match self.fetcher.fetch(&self.url) {
            Ok(response) if response.is_success() => {
                if let Err(e) = self.attach_image(&mut slide, &response.body, target) {
                    session.report(Diagnostic::ImageFailed {
                        index,
                        cause: e.to_string(),
                    });
                }
            }
            Ok(response) => session.report(Diagnostic::FetchFailed {
                index,
                status: Some(response.status),
                reason: format!("HTTP status {}", response.status),
            }),
            Err(e) => session.report(Diagnostic::FetchFailed {
                index,
                status: None,
                reason: e.to_string(),
            }),
        }

        Ok(slide)
    }
}

/// Local copy of the downloaded picture, deleted when dropped.
///
/// Only files created here are ever owned by a guard; an existing file at the
/// target path is left untouched and the attach fails instead.
struct ScratchImage {
    path: PathBuf,
}

impl ScratchImage {
    fn create(path: PathBuf) -> Result<(Self, File)> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => ReportError::ValidationError(format!(
                    "refusing to overwrite existing file {:?}",
                    path
                )),
                _ => ReportError::FileReadError(e),
            })?;
        Ok((Self { path }, file))
    }

    fn temporary() -> Result<(Self, File)> {
        let file = tempfile::Builder::new()
            .prefix("picture")
            .suffix(".png")
            .tempfile()
            .map_err(ReportError::FileReadError)?;
        let (file, path) = file.keep().map_err(|e| ReportError::FileReadError(e.error))?;
        Ok((Self { path }, file))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchImage {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("The downloaded picture has been deleted: {:?}", self.path),
            Err(e) => warn!("Failed to delete downloaded picture {:?}: {}", self.path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchResponse;
    use image::{ImageBuffer, Rgb};
    use serde_json::json;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct StubFetcher {
        status: u16,
        body: Vec<u8>,
    }

    impl ImageFetcher for StubFetcher {
        fn fetch(&self, _url: &str) -> Result<FetchResponse> {
            Ok(FetchResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    struct FailingFetcher;

    impl ImageFetcher for FailingFetcher {
        fn fetch(&self, url: &str) -> Result<FetchResponse> {
            Err(ReportError::InvalidResourceUrl(url.to_string()))
        }
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = ImageBuffer::from_fn(16, 12, |x, y| Rgb([(x * 10) as u8, (y * 10) as u8, 90u8]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageOutputFormat::Jpeg(90))
            .expect("Failed to encode jpeg");
        out.into_inner()
    }

    fn stub(status: u16, body: Vec<u8>) -> Box<StubFetcher> {
        Box::new(StubFetcher { status, body })
    }

    fn picture_record(content: &str) -> Record {
        Record::from_value(
            2,
            json!({"type": "picture", "title": "S-N Diagram", "content": content}),
        )
    }

    #[test]
    fn test_successful_download_is_embedded_and_removed() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let renderer = PictureRenderer::new(stub(200, jpeg_bytes()), "http://x/y.jpeg", Some(dir.path()));

        let slide = renderer
            .build(&picture_record("picture.png"), &mut session)
            .expect("Failed to build slide");

        let pictures: Vec<_> = slide.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].frame, PICTURE_FRAME);
        assert_eq!(pictures[0].format, crate::pptx::PictureFormat::Png);
        assert!(session.diagnostics().is_empty());
        assert!(!dir.path().join("picture.png").exists());
    }

    #[test]
    fn test_empty_content_uses_temporary_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let renderer = PictureRenderer::new(stub(200, jpeg_bytes()), "http://x/y.jpeg", None);

        let slide = renderer.build(&picture_record(""), &mut session).unwrap();
        assert_eq!(slide.pictures().count(), 1);
    }

    #[test]
    fn test_non_success_status_is_recoverable() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let fetcher = stub(404, Vec::new());
        let renderer = PictureRenderer::new(fetcher, "http://x/y.jpeg", Some(dir.path()));

        let slide = renderer.build(&picture_record("picture.png"), &mut session).unwrap();
        assert_eq!(slide.title(), Some("S-N Diagram"));
        assert_eq!(slide.pictures().count(), 0);
        assert_eq!(
            session.diagnostics(),
            &[Diagnostic::FetchFailed {
                index: 2,
                status: Some(404),
                reason: "HTTP status 404".to_string(),
            }]
        );
        assert!(!dir.path().join("picture.png").exists());
    }

    #[test]
    fn test_undecodable_body_is_recoverable() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let renderer = PictureRenderer::new(
            stub(200, b"<html>not an image</html>".to_vec()),
            "http://x/y.jpeg",
            Some(dir.path()),
        );

        let slide = renderer.build(&picture_record("picture.png"), &mut session).unwrap();
        assert_eq!(slide.pictures().count(), 0);
        assert!(matches!(
            session.diagnostics(),
            [Diagnostic::ImageFailed { index: 2, .. }]
        ));
        assert!(!dir.path().join("picture.png").exists());
    }

    #[test]
    fn test_unwritable_target_is_recoverable_and_cleaned_up() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let renderer = PictureRenderer::new(stub(200, jpeg_bytes()), "http://x/y.jpeg", Some(dir.path()));

        let slide = renderer
            .build(&picture_record("missing-dir/picture.png"), &mut session)
            .unwrap();
        assert_eq!(slide.pictures().count(), 0);
        assert!(matches!(
            session.diagnostics(),
            [Diagnostic::ImageFailed { .. }]
        ));
    }

    #[test]
    fn test_existing_file_at_content_path_is_left_intact() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let data = dir.path().join("data.txt");
        fs::write(&data, "1;2\n3;4\n").expect("Failed to write data file");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let renderer = PictureRenderer::new(stub(200, jpeg_bytes()), "http://x/y.jpeg", Some(dir.path()));

        let slide = renderer.build(&picture_record("data.txt"), &mut session).unwrap();

        assert_eq!(slide.title(), Some("S-N Diagram"));
        assert_eq!(slide.pictures().count(), 0);
        assert!(matches!(
            session.diagnostics(),
            [Diagnostic::ImageFailed { index: 2, .. }]
        ));
        assert_eq!(fs::read_to_string(&data).unwrap(), "1;2\n3;4\n");
    }

    #[test]
    fn test_transport_error_is_recoverable() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let renderer = PictureRenderer::new(Box::new(FailingFetcher), "http://x/y.jpeg", None);

        let slide = renderer.build(&picture_record("picture.png"), &mut session).unwrap();
        assert_eq!(slide.pictures().count(), 0);
        assert!(matches!(
            session.diagnostics(),
            [Diagnostic::FetchFailed { status: None, .. }]
        ));
    }

    #[test]
    fn test_missing_content_fails_the_record() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let fetcher = stub(200, jpeg_bytes());
        let renderer = PictureRenderer::new(fetcher, "http://x/y.jpeg", None);
        let record = Record::from_value(0, json!({"type": "picture", "title": "T"}));
        assert!(matches!(
            renderer.build(&record, &mut session),
            Err(ReportError::InvalidRecord { .. })
        ));
    }
}
