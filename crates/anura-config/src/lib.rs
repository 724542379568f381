//! # anura-config
//!
//! Hierarchical, path-addressed configuration for the Anura bot.
//!
//! # Architecture overview (for beginners)
//!
//! Configuration is a tree.  Every node is either a *value* (a piece of text
//! such as `"3306"`) or a *section* holding named children.  Nodes are
//! addressed by dotted paths: `sql.pool.size` is the `size` value inside the
//! `pool` section inside the `sql` section.
//!
//! - **`domain`** – The tree, path rules, section views and typed reads.
//!   Values are stored as text and parsed on demand, so `get_i32` on `"42"`
//!   gives `42` and on `"abc"` gives `0`.
//!
//! - **`application`** – Flattening nested tables into path maps and
//!   overlaying defaults onto a tree without overwriting user values.
//!
//! - **`infrastructure`** – YAML/TOML documents and the stores they live in,
//!   plus [`FileConfig`], a tree bound to its file.
//!
//! ```rust
//! use anura_config::{ConfigTree, Scalars};
//!
//! let mut config = ConfigTree::new();
//! config.set("sql.port", 3306).unwrap();
//! assert_eq!(config.get_i32("sql.port"), 3306);
//! assert!(config.is_i32("sql.port"));
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{apply_defaults, apply_defaults_at, flatten, flatten_once, nest, Entry, FlatMap, Table};
pub use domain::error::ConfigError;
pub use domain::path::{KeyError, PathError, SEPARATOR};
pub use domain::section::{Section, SectionMut};
pub use domain::tree::{ConfigTree, NodeId};
pub use domain::value::{FromScalar, Lookup, Scalars, Value};
pub use infrastructure::{
    DocumentFormat, DocumentStore, FileConfig, FileStore, LoadError, MemoryStore, SaveError,
};
