// ABOUTME: Document session for the slide-report application
// ABOUTME: Owns the output presentation for a run, persists it after every slide and collects diagnostics

use crate::errors::Result;
use crate::pptx::{Presentation, Slide};
use log::{error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

/// A recoverable condition observed during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The record's type tag matched no renderer; the record was skipped
    UnknownType { index: usize, value: String },
    /// The picture download did not succeed; the slide has no picture
    FetchFailed {
        index: usize,
        status: Option<u16>,
        reason: String,
    },
    /// The downloaded picture could not be decoded or attached
    ImageFailed { index: usize, cause: String },
    /// A renderer failed and the record produced no slide
    SlideSkipped { index: usize, cause: String },
}

impl Diagnostic {
    /// Index of the record the diagnostic refers to
    pub fn index(&self) -> usize {
        match self {
            Diagnostic::UnknownType { index, .. }
            | Diagnostic::FetchFailed { index, .. }
            | Diagnostic::ImageFailed { index, .. }
            | Diagnostic::SlideSkipped { index, .. } => *index,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownType { index, value } => {
                write!(f, "Invalid 'type' value: '{}', Index: {}", value, index)
            }
            Diagnostic::FetchFailed {
                index,
                status: Some(status),
                ..
            } => write!(f, "Response status: '{}', Index: {}", status, index),
            Diagnostic::FetchFailed { index, reason, .. } => {
                write!(f, "Picture download failed: '{}', Index: {}", reason, index)
            }
            Diagnostic::ImageFailed { index, cause } => write!(
                f,
                "An error occurred while processing the image: '{}', Index: {}",
                cause, index
            ),
            Diagnostic::SlideSkipped { index, cause } => {
                write!(f, "Slide skipped: '{}', Index: {}", cause, index)
            }
        }
    }
}

/// The single output document of a run.
///
/// The session keeps the presentation in memory and writes it to disk after
/// every appended slide, so the file on disk always holds every slide
/// completed so far.
pub struct DocumentSession {
    path: PathBuf,
    presentation: Presentation,
    diagnostics: Vec<Diagnostic>,
}

impl DocumentSession {
    /// Start a session from an empty presentation, overwriting `path`
    pub fn create(path: &Path) -> Result<Self> {
        let session = Self {
            path: path.to_path_buf(),
            presentation: Presentation::new(),
            diagnostics: Vec::new(),
        };
        session.save()?;
        info!("Empty presentation created at {:?}", path);
        Ok(session)
    }

    /// Continue an existing presentation at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let presentation = Presentation::open(path)?;
        info!(
            "Opened presentation {:?} with {} slides",
            path,
            presentation.slide_count()
        );
        Ok(Self {
            path: path.to_path_buf(),
            presentation,
            diagnostics: Vec::new(),
        })
    }

    /// Append a finished slide and persist the document
    pub fn append(&mut self, slide: Slide) -> Result<()> {
        self.presentation.push_slide(slide);
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        self.presentation.save(&self.path)
    }

    /// Record a recoverable condition and log it
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnknownType { .. } => warn!("{}", diagnostic),
            _ => error!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn slide_count(&self) -> usize {
        self.presentation.slide_count()
    }

    /// Close the session, returning what was collected
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::Layout;
    use tempfile::TempDir;

    #[test]
    fn test_create_overwrites_previous_output() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("out.pptx");

        let mut first = DocumentSession::create(&path).expect("Failed to create session");
        first.append(Slide::new(Layout::TitleOnly)).unwrap();
        assert_eq!(Presentation::open(&path).unwrap().slide_count(), 1);

        let second = DocumentSession::create(&path).expect("Failed to create session");
        assert_eq!(second.slide_count(), 0);
        assert_eq!(Presentation::open(&path).unwrap().slide_count(), 0);
    }

    #[test]
    fn test_every_append_is_persisted() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("out.pptx");
        let mut session = DocumentSession::create(&path).expect("Failed to create session");

        for n in 1..=3 {
            let mut slide = Slide::new(Layout::TitleOnly);
            slide.set_title(&format!("Slide {}", n));
            session.append(slide).unwrap();
            let on_disk = Presentation::open(&path).unwrap();
            assert_eq!(on_disk.slide_count(), n);
            assert_eq!(on_disk.slides()[n - 1].title(), Some(format!("Slide {}", n).as_str()));
        }
    }

    #[test]
    fn test_open_continues_existing_document() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("out.pptx");
        let mut session = DocumentSession::create(&path).unwrap();
        session.append(Slide::new(Layout::Title)).unwrap();
        drop(session);

        let mut reopened = DocumentSession::open(&path).expect("Failed to open session");
        reopened.append(Slide::new(Layout::TitleOnly)).unwrap();
        let on_disk = Presentation::open(&path).unwrap();
        assert_eq!(on_disk.slide_count(), 2);
        assert_eq!(on_disk.slides()[0].layout(), Layout::Title);
        assert_eq!(on_disk.slides()[1].layout(), Layout::TitleOnly);
    }

    #[test]
    fn test_report_collects_diagnostics() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        session.report(Diagnostic::UnknownType {
            index: 4,
            value: "chart".to_string(),
        });
        assert_eq!(session.diagnostics().len(), 1);
        assert_eq!(session.diagnostics()[0].index(), 4);
        assert_eq!(
            session.diagnostics()[0].to_string(),
            "Invalid 'type' value: 'chart', Index: 4"
        );
    }
}
