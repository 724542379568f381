//! A configuration tree bound to a document.
//!
//! [`FileConfig`] owns a [`ConfigTree`] plus the store and format it was
//! loaded from.  It dereferences to the tree, so every tree operation works on
//! it directly:
//!
//! ```rust
//! use anura_config::{FileConfig, MemoryStore, DocumentFormat, Scalars};
//!
//! let store = MemoryStore::with_contents("sql:\n  port: 3306\n");
//! let mut config = FileConfig::with_store(store, DocumentFormat::Yaml).unwrap();
//! assert_eq!(config.get_i32("sql.port"), 3306);
//!
//! config.set("sql.host", "localhost").unwrap();
//! config.save().unwrap();
//! ```

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::domain::tree::ConfigTree;
use crate::infrastructure::document::{self, DocumentFormat, LoadError, SaveError};
use crate::infrastructure::store::{DocumentStore, FileStore};

/// A [`ConfigTree`] loaded from, and saved to, a [`DocumentStore`].
#[derive(Debug)]
pub struct FileConfig<S: DocumentStore = FileStore> {
    store: S,
    format: DocumentFormat,
    tree: ConfigTree,
}

impl FileConfig<FileStore> {
    /// Opens the document at `path`, creating an empty file when it is
    /// missing.  The format follows the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be read, created or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let path = path.into();
        let format = DocumentFormat::from_path(&path);
        Self::with_store(FileStore::new(path), format)
    }
}

impl<S: DocumentStore> FileConfig<S> {
    /// Loads a configuration from `store`.
    ///
    /// # Errors
    ///
    /// See [`reload`](Self::reload).
    pub fn with_store(store: S, format: DocumentFormat) -> Result<Self, LoadError> {
        let mut config = Self {
            store,
            format,
            tree: ConfigTree::new(),
        };
        config.reload(false)?;
        Ok(config)
    }

    /// Re-reads the document and applies every value in it.
    ///
    /// With `clear == true` the current tree is discarded first, which also
    /// invalidates every [`NodeId`](crate::NodeId) handed out so far.
    /// Otherwise values missing from the document stay as they are.
    ///
    /// Returns the number of values applied.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the document cannot be read or parsed.  The
    /// tree is left untouched in that case.
    pub fn reload(&mut self, clear: bool) -> Result<usize, LoadError> {
        let origin = self.store.origin();
        let text = match self.store.read() {
            Ok(Some(text)) => text,
            Ok(None) => {
                self.store
                    .write("")
                    .map_err(|source| LoadError::Io { origin: origin.clone(), source })?;
                info!("created empty config document {origin}");
                String::new()
            }
            Err(source) => return Err(LoadError::Io { origin, source }),
        };

        let flat = document::load(&text, self.format)?;
        if clear {
            self.tree = ConfigTree::new();
        }
        let applied = self.tree.set_all(flat);
        info!("loaded {applied} config value(s) from {origin}");
        Ok(applied)
    }

    /// Writes every value of the tree back to the store.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError`] if serialization or the write fails.
    pub fn save(&mut self) -> Result<(), SaveError> {
        let text = document::save(self.tree.root_section(), self.format)?;
        let origin = self.store.origin();
        self.store
            .write(&text)
            .map_err(|source| SaveError::Io { origin: origin.clone(), source })?;
        info!("saved config to {origin}");
        Ok(())
    }

    /// Fills absent paths from a defaults template written in this
    /// configuration's format.
    ///
    /// Best effort: a malformed template is logged and ignored.  Returns the
    /// number of values copied.
    pub fn load_defaults(&mut self, template: &str) -> usize {
        let applied = document::overlay_defaults(&mut self.tree, template, self.format);
        if applied > 0 {
            info!("applied {applied} default config value(s)");
        }
        applied
    }

    /// Like [`load_defaults`](Self::load_defaults), but reads a template
    /// written in `format` from another store.
    ///
    /// A missing or unreadable template is logged and ignored.
    pub fn load_defaults_from(
        &mut self,
        defaults: &impl DocumentStore,
        format: DocumentFormat,
    ) -> usize {
        match defaults.read() {
            Ok(Some(template)) => {
                let applied = document::overlay_defaults(&mut self.tree, &template, format);
                if applied > 0 {
                    info!("applied {applied} default config value(s) from {}", defaults.origin());
                }
                applied
            }
            Ok(None) => {
                warn!("config defaults {} not found", defaults.origin());
                0
            }
            Err(e) => {
                warn!("failed to read config defaults {}: {e}", defaults.origin());
                0
            }
        }
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ConfigTree {
        &mut self.tree
    }

    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }
}

impl<S: DocumentStore> Deref for FileConfig<S> {
    type Target = ConfigTree;

    fn deref(&self) -> &ConfigTree {
        &self.tree
    }
}

impl<S: DocumentStore> DerefMut for FileConfig<S> {
    fn deref_mut(&mut self) -> &mut ConfigTree {
        &mut self.tree
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::domain::value::Scalars;
    use crate::infrastructure::store::{MemoryStore, MockDocumentStore};

    fn yaml(text: &str) -> FileConfig<MemoryStore> {
        FileConfig::with_store(MemoryStore::with_contents(text), DocumentFormat::Yaml).unwrap()
    }

    #[test]
    fn test_with_store_loads_document() {
        let config = yaml("discord:\n  token: abc\n");
        assert_eq!(config.get_string("discord.token"), Some("abc"));
    }

    #[test]
    fn test_with_store_missing_document_is_created_empty() {
        // Arrange / Act
        let config = FileConfig::with_store(MemoryStore::new(), DocumentFormat::Yaml).unwrap();

        // Assert
        assert_eq!(config.store().contents(), Some(""));
        assert!(config.get_keys(true).is_empty());
    }

    #[test]
    fn test_save_writes_sorted_document() {
        let mut config = yaml("");
        config.set("sql.port", 3306).unwrap();
        config.set("discord.token", "abc").unwrap();

        config.save().unwrap();

        assert_eq!(
            config.store().contents(),
            Some("discord:\n  token: abc\nsql:\n  port: 3306\n")
        );
    }

    #[test]
    fn test_reload_without_clear_keeps_unlisted_values() {
        let mut config = yaml("a: 1\n");
        config.set("local", "x").unwrap();
        config.reload(false).unwrap();
        assert_eq!(config.get_keys(true), vec!["a", "local"]);
    }

    #[test]
    fn test_reload_with_clear_drops_unlisted_values() {
        let mut config = yaml("a: 1\n");
        config.set("local", "x").unwrap();
        config.reload(true).unwrap();
        assert_eq!(config.get_keys(true), vec!["a"]);
    }

    #[test]
    fn test_load_defaults_respects_user_values() {
        let mut config = yaml("sql:\n  port: 3307\n");
        let applied = config.load_defaults("sql:\n  port: 3306\n  host: localhost\n");
        assert_eq!(applied, 1);
        assert_eq!(config.get_i32("sql.port"), 3307);
        assert_eq!(config.get_string("sql.host"), Some("localhost"));
    }

    #[test]
    fn test_load_defaults_from_missing_store_applies_nothing() {
        let mut config = yaml("a: 1\n");
        assert_eq!(
            config.load_defaults_from(&MemoryStore::new(), DocumentFormat::Yaml),
            0
        );
        assert_eq!(config.get_keys(true), vec!["a"]);
    }

    #[test]
    fn test_load_defaults_from_parses_template_in_its_own_format() {
        let mut config = yaml("sql:\n  port: 3307\n");
        let template = MemoryStore::with_contents("[sql]\nport = 3306\nhost = \"localhost\"\n");

        let applied = config.load_defaults_from(&template, DocumentFormat::Toml);

        assert_eq!(applied, 1);
        assert_eq!(config.get_i32("sql.port"), 3307);
        assert_eq!(config.get_string("sql.host"), Some("localhost"));
    }

    #[test]
    fn test_load_defaults_from_unreadable_store_applies_nothing() {
        // Arrange
        let mut config = yaml("a: 1\n");
        let mut defaults = MockDocumentStore::new();
        defaults.expect_origin().return_const("defaults".to_string());
        defaults
            .expect_read()
            .returning(|| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));

        // Act
        let applied = config.load_defaults_from(&defaults, DocumentFormat::Yaml);

        // Assert
        assert_eq!(applied, 0);
        assert_eq!(config.get_i32("a"), 1);
    }

    #[test]
    fn test_read_failure_is_load_error() {
        // Arrange
        let mut store = MockDocumentStore::new();
        store.expect_origin().return_const("mock".to_string());
        store
            .expect_read()
            .returning(|| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));

        // Act
        let result = FileConfig::with_store(store, DocumentFormat::Yaml);

        // Assert
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_write_failure_is_save_error() {
        // Arrange
        let mut store = MockDocumentStore::new();
        store.expect_origin().return_const("mock".to_string());
        store.expect_read().returning(|| Ok(Some("a: 1\n".to_string())));
        store
            .expect_write()
            .returning(|_| Err(io::Error::new(io::ErrorKind::Other, "disk full")));
        let mut config = FileConfig::with_store(store, DocumentFormat::Yaml).unwrap();

        // Act
        let result = config.save();

        // Assert
        assert!(matches!(result, Err(SaveError::Io { ref origin, .. }) if origin == "mock"));
    }

    #[test]
    fn test_malformed_document_is_load_error() {
        let result = FileConfig::with_store(
            MemoryStore::with_contents("a: [unclosed"),
            DocumentFormat::Yaml,
        );
        assert!(matches!(result, Err(LoadError::Yaml(_))));
    }
}
