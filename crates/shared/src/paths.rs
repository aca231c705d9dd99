//! File path utilities for organizing data files.
//!
//! This module provides a centralized way to manage file paths for the
//! collector's data files (checkpoint, final export, logs).

use std::path::{Path, PathBuf};

/// File path manager for data files
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Create a new DataPaths with the given root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Get the checkpoint file path for the given file name
    pub fn checkpoint_file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Get the export file path for the given file name
    pub fn export_file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create all required directories
    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_layout() {
        let paths = DataPaths::new("data");
        assert_eq!(paths.root(), Path::new("data"));
        assert_eq!(paths.log_dir(), Path::new("data/logs"));
        assert_eq!(
            paths.checkpoint_file("channels_partial.csv"),
            Path::new("data/channels_partial.csv")
        );
    }

    #[test]
    fn test_create_dirs() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = DataPaths::new(temp_dir.path().join("data"));

        paths.create_dirs()?;
        assert!(paths.root().exists());
        assert!(paths.log_dir().exists());

        Ok(())
    }
}
