//! Test utilities for building temporary directory trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory tree for testing.
///
/// The directory is automatically cleaned up when dropped.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Create a temporary directory containing the given relative directories.
    pub fn with_dirs(dirs: &[&str]) -> Self {
        let test = Self::new();
        for dir in dirs {
            test.add_dir(dir);
        }
        test
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a relative entry.
    pub fn join(&self, path: &str) -> PathBuf {
        self.dir.path().join(path)
    }

    /// Add a directory, creating parents as needed.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Add a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Remove a file or a whole directory.
    pub fn remove(&self, path: &str) {
        let full_path = self.join(path);
        if full_path.is_dir() {
            fs::remove_dir_all(&full_path).expect("Failed to remove dir");
        } else {
            fs::remove_file(&full_path).expect("Failed to remove file");
        }
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}
