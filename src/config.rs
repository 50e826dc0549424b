// ABOUTME: Configuration module for the slide-report application
// ABOUTME: Provides configuration settings and environment variable handling

use crate::errors::{ReportError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "sample.json";
pub const DEFAULT_OUTPUT_PATH: &str = "example_output.pptx";
pub const DEFAULT_PICTURE_URL: &str =
    "https://i0.wp.com/mechguru.com/wp-content/uploads/2012/05/S_N-Diagram.jpeg?w=688&ssl=1";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30000;

/// What the driver does when a renderer fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run; slides completed so far stay on disk.
    #[default]
    Abort,
    /// Record the failure, produce no slide for the record, and continue.
    Skip,
}

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub output_path: PathBuf,
    pub picture_url: String,
    pub fetch_timeout_ms: u64,
    pub failure_policy: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            picture_url: DEFAULT_PICTURE_URL.to_string(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let config_path = env::var("REPORT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let output_path = env::var("REPORT_OUTPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_PATH));
        let picture_url =
            env::var("PICTURE_URL").unwrap_or_else(|_| DEFAULT_PICTURE_URL.to_string());
        let fetch_timeout_ms = env::var("FETCH_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_MS);
        let failure_policy = env::var("KEEP_GOING")
            .ok()
            .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
            .map(|keep_going| {
                if keep_going {
                    FailurePolicy::Skip
                } else {
                    FailurePolicy::Abort
                }
            })
            .unwrap_or_default();

        Self {
            config_path,
            output_path,
            picture_url,
            fetch_timeout_ms,
            failure_policy,
        }
    }

    /// Apply command-line overrides on top of this configuration
    pub fn with_overrides(
        mut self,
        config_path: Option<PathBuf>,
        output_path: Option<PathBuf>,
        picture_url: Option<String>,
        keep_going: bool,
    ) -> Self {
        if let Some(path) = config_path {
            self.config_path = path;
        }
        if let Some(path) = output_path {
            self.output_path = path;
        }
        if let Some(url) = picture_url {
            self.picture_url = url;
        }
        if keep_going {
            self.failure_policy = FailurePolicy::Skip;
        }
        self
    }

    /// Timeout applied to the picture download
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Check that the configured values are usable before the run starts
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.picture_url)
            .map_err(|e| ReportError::InvalidResourceUrl(format!("{}: {}", self.picture_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ReportError::InvalidResourceUrl(format!(
                "unsupported scheme '{}' in {}",
                parsed.scheme(),
                self.picture_url
            )));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ReportError::ConfigError(
                "output path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
