//! Where configuration documents live.
//!
//! [`FileConfig`](super::file_config::FileConfig) never touches the
//! filesystem directly; it goes through a [`DocumentStore`].  Production code
//! uses [`FileStore`], tests and embedders can use [`MemoryStore`] or a mock.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Reads and writes one whole configuration document.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentStore {
    /// Human-readable origin used in errors and logs, e.g. a file path.
    fn origin(&self) -> String;

    /// Reads the document.  Returns `Ok(None)` when it does not exist yet.
    fn read(&self) -> io::Result<Option<String>>;

    /// Replaces the document with `contents`.
    fn write(&mut self, contents: &str) -> io::Result<()>;
}

/// A document stored in a file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileStore {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Creates missing parent directories before writing.
    fn write(&mut self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, contents)?;
        debug!("wrote {} byte(s) to {}", contents.len(), self.path.display());
        Ok(())
    }
}

/// A document held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    contents: Option<String>,
}

impl MemoryStore {
    /// A store whose document does not exist yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl DocumentStore for MemoryStore {
    fn origin(&self) -> String {
        "<memory>".to_string()
    }

    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        self.contents = Some(contents.to_string());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("anura-store-test-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_store_read_missing_file_returns_none() {
        let store = FileStore::new(temp_dir().join("absent.yml"));
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn test_file_store_write_creates_parent_directories() {
        // Arrange
        let dir = temp_dir();
        let mut store = FileStore::new(dir.join("nested").join("config.yml"));

        // Act
        store.write("a: 1\n").unwrap();

        // Assert
        assert_eq!(store.read().unwrap().as_deref(), Some("a: 1\n"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_origin_is_path() {
        let store = FileStore::new("conf/config.yml");
        assert!(store.origin().ends_with("config.yml"));
        assert_eq!(store.path(), Path::new("conf/config.yml"));
    }

    #[test]
    fn test_memory_store_write_then_read() {
        let mut store = MemoryStore::new();
        assert!(store.read().unwrap().is_none());
        store.write("x: 1\n").unwrap();
        assert_eq!(store.contents(), Some("x: 1\n"));
    }
}
