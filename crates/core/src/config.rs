//! Configuration module for the manual builder
//!
//! The defaults reproduce the fixed behavior of the zero-argument tool:
//! document the current directory into `docstring_man.md`, treating
//! `__init__.py` as the package marker.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the generated document
pub const DEFAULT_OUTPUT: &str = "docstring_man.md";

/// Filename that marks a directory as a package
pub const DEFAULT_PACKAGE_MARKER: &str = "__init__.py";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Configuration for the manual builder
#[derive(Debug, Clone)]
pub struct DocConfig {
    /// Root directory to document
    pub root: PathBuf,

    /// Path of the generated document
    pub output: PathBuf,

    /// Filename of package initializers
    pub package_marker: String,

    /// Files never documented (the tool itself)
    pub skip_paths: Vec<PathBuf>,

    /// Whether to descend into symlinked directories
    pub follow_symlinks: bool,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT),
            package_marker: DEFAULT_PACKAGE_MARKER.to_string(),
            skip_paths: std::env::current_exe().into_iter().collect(),
            follow_symlinks: false,
        }
    }
}

impl DocConfig {
    /// Create new config with root directory
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    /// Set output path (builder pattern)
    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = output;
        self
    }

    /// Set package marker filename (builder pattern)
    pub fn with_package_marker(mut self, marker: impl Into<String>) -> Self {
        self.package_marker = marker.into();
        self
    }

    /// Add a path to skip (builder pattern)
    pub fn with_skip_path(mut self, path: PathBuf) -> Self {
        self.skip_paths.push(path);
        self
    }

    /// Set follow symlinks (builder pattern)
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root.is_dir() {
            return Err(ConfigError::InvalidConfig(format!(
                "root is not a directory: {}",
                self.root.display()
            )));
        }
        if self.package_marker.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "package marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Canonical forms of the skip paths that currently exist
    pub fn canonical_skip_paths(&self) -> Vec<PathBuf> {
        self.skip_paths
            .iter()
            .filter_map(|p| fs::canonicalize(p).ok())
            .collect()
    }
}

/// Whether `path` refers to one of the (canonicalized) skip paths
pub fn is_skipped(path: &Path, canonical_skips: &[PathBuf]) -> bool {
    if canonical_skips.is_empty() {
        return false;
    }
    match fs::canonicalize(path) {
        Ok(canonical) => canonical_skips.contains(&canonical),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DocConfig::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.output, PathBuf::from("docstring_man.md"));
        assert_eq!(config.package_marker, "__init__.py");
        assert!(!config.follow_symlinks);
    }

    #[test]
    fn test_config_builder() {
        let config = DocConfig::new(PathBuf::from("/test"))
            .with_output(PathBuf::from("/tmp/out.md"))
            .with_package_marker("pkg.py")
            .with_follow_symlinks(true);

        assert_eq!(config.root, PathBuf::from("/test"));
        assert_eq!(config.output, PathBuf::from("/tmp/out.md"));
        assert_eq!(config.package_marker, "pkg.py");
        assert!(config.follow_symlinks);
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let dir = TempDir::new().unwrap();
        let config = DocConfig::new(dir.path().join("missing"));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));

        let config = DocConfig::new(dir.path().to_path_buf()).with_package_marker("");
        assert!(config.validate().is_err());

        let config = DocConfig::new(dir.path().to_path_buf());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_skip_by_identity() {
        let dir = TempDir::new().unwrap();
        let tool = dir.path().join("tool.py");
        let other = dir.path().join("other.py");
        fs::write(&tool, "'''tool'''\n").unwrap();
        fs::write(&other, "'''other'''\n").unwrap();

        let config = DocConfig::new(dir.path().to_path_buf()).with_skip_path(tool.clone());
        let skips = config.canonical_skip_paths();

        assert!(is_skipped(&dir.path().join(".").join("tool.py"), &skips));
        assert!(!is_skipped(&other, &skips));
    }
}
