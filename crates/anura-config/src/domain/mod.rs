//! Domain layer: the configuration tree and everything needed to address it.
//!
//! This module contains pure data-structure logic with no I/O.
//!
//! # What lives here (for beginners)
//!
//! - [`path`] decides which strings are valid keys and paths and splits a
//!   path like `sql.pool.size` into its keys.
//! - [`tree`] is the tree itself: nodes stored in an arena, each either a
//!   leaf value or a set of named children.
//! - [`section`] offers views that run the same operations relative to one
//!   section of the tree.
//! - [`value`] describes what can be written into the tree and how text
//!   values are read back as numbers and booleans.
//!
//! Nothing in this module knows about YAML, TOML or files.  The
//! `infrastructure` layer translates documents into the flat `path → value`
//! form that the tree consumes.

pub mod error;
pub mod path;
pub mod section;
pub mod tree;
pub mod value;
