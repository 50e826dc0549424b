// ABOUTME: Error types for the slide-report application
// ABOUTME: Provides structured error handling for each stage of the pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to fetch remote resource: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Invalid resource URL: {0}")]
    InvalidResourceUrl(String),

    #[error("Failed to parse config document: {0}")]
    ConfigParseError(#[from] serde_json::Error),

    #[error("Invalid record at index {index}: {message}")]
    InvalidRecord { index: usize, message: String },

    #[error("Malformed plot data in {path:?} at line {line}: {message}")]
    PlotDataError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Chart rendering error: {0}")]
    ChartError(String),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("PPTX generation error: {0}")]
    PptxError(String),

    #[error("PPTX read error: {0}")]
    PptxReadError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ReportError {
    /// Shorthand for a record-level validation failure.
    pub fn invalid_record(index: usize, message: impl Into<String>) -> Self {
        ReportError::InvalidRecord {
            index,
            message: message.into(),
        }
    }
}

// Implement conversion from zip errors
impl From<zip::result::ZipError> for ReportError {
    fn from(err: zip::result::ZipError) -> Self {
        ReportError::PptxError(format!("ZIP operation failed: {}", err))
    }
}

impl From<quick_xml::Error> for ReportError {
    fn from(err: quick_xml::Error) -> Self {
        ReportError::PptxReadError(format!("XML parsing failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
