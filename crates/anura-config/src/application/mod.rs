//! Application layer: operations composed on top of the tree contract.
//!
//! - [`flatten`] bridges nested document tables and the flat `path → value`
//!   form the tree consumes.
//! - [`defaults`] fills absent paths from a template without touching
//!   anything the user configured.

pub mod defaults;
pub mod flatten;

pub use defaults::{apply_defaults, apply_defaults_at};
pub use flatten::{flatten, flatten_once, nest, Entry, FlatMap, Table};
