// ABOUTME: Library module for the slide-report program.
// ABOUTME: Contains the record source, type resolver, renderers and document session.

// Reexport modules
pub mod chart;
pub mod config;
pub mod driver;
pub mod errors;
pub mod fetch;
pub mod pptx;
pub mod record;
pub mod renderers;
pub mod resolver;
pub mod session;
pub mod utils;

// Reexport common types and functions
pub use config::{Config, FailurePolicy};
pub use driver::{generate_report, run, RunReport};
pub use errors::{ReportError, Result};
pub use fetch::{FetchResponse, HttpFetcher, ImageFetcher};
pub use pptx::{Layout, Presentation, Slide};
pub use record::{load_records, parse_records, Record};
pub use renderers::Renderer;
pub use resolver::{RendererTable, SlideType};
pub use session::{Diagnostic, DocumentSession};
