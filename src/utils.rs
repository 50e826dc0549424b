// ABOUTME: Utility functions for the slide-report application
// ABOUTME: Provides path validation and resolution helpers

use crate::errors::{ReportError, Result};
use std::path::{Path, PathBuf};

/// Validate that a file exists
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ReportError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ReportError::ValidationError(format!(
            "Path is not a file: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(ReportError::FileReadError)?;
    } else if !path.is_dir() {
        return Err(ReportError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory_exists(parent)?;
        }
    }
    Ok(())
}

/// Resolve a path named inside a config document.
/// Relative paths are taken relative to the directory holding the config.
pub fn resolve_relative_to(base_dir: Option<&Path>, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    match base_dir {
        Some(dir) if candidate.is_relative() => dir.join(candidate),
        _ => candidate.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_file_exists() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let file = dir.path().join("data.csv");
        assert!(matches!(
            validate_file_exists(&file),
            Err(ReportError::PathNotFoundError(_))
        ));

        std::fs::write(&file, "1;2\n").expect("Failed to write file");
        assert!(validate_file_exists(&file).is_ok());
        assert!(matches!(
            validate_file_exists(dir.path()),
            Err(ReportError::ValidationError(_))
        ));
    }

    #[test]
    fn test_ensure_parent_directory_exists() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let file = dir.path().join("nested/deeper/out.pptx");
        ensure_parent_directory_exists(&file).expect("Failed to create parents");
        assert!(dir.path().join("nested/deeper").is_dir());

        // A bare file name has an empty parent and needs nothing
        assert!(ensure_parent_directory_exists(Path::new("out.pptx")).is_ok());
    }

    #[test]
    fn test_resolve_relative_to() {
        let base = Path::new("/srv/reports");
        assert_eq!(
            resolve_relative_to(Some(base), "data/plot.csv"),
            PathBuf::from("/srv/reports/data/plot.csv")
        );
        assert_eq!(
            resolve_relative_to(Some(base), "/abs/plot.csv"),
            PathBuf::from("/abs/plot.csv")
        );
        assert_eq!(
            resolve_relative_to(None, "plot.csv"),
            PathBuf::from("plot.csv")
        );
    }
}
