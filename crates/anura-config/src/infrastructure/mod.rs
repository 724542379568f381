//! Infrastructure layer: documents, stores and file-backed configurations.
//!
//! - [`document`] converts YAML and TOML text to and from flat path maps.
//! - [`store`] abstracts where a document is read from and written to.
//! - [`file_config`] ties a tree to a store.

pub mod document;
pub mod file_config;
pub mod store;

pub use document::{load, overlay_defaults, parse, render, save, DocumentFormat, LoadError, SaveError};
pub use file_config::FileConfig;
pub use store::{DocumentStore, FileStore, MemoryStore};
