//! Errors reported by configuration tree operations.

use thiserror::Error;

use crate::domain::path::PathError;

/// Error type for operations on a [`crate::ConfigTree`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The path (or one of its keys) failed validation.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// An empty path was used to assign a value on the root section.
    #[error("the root section cannot hold a value; an empty path is only allowed below the root")]
    EmptyRootPath,

    /// The value stored at `path` cannot be coerced to the requested type.
    #[error("value at '{path}' is not a valid {expected}: '{found}'")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: String,
    },

    /// A [`crate::NodeId`] refers to a node that was removed or belongs to another tree.
    #[error("node handle does not refer to a live node of this tree")]
    UnknownNode,

    /// A section was assigned somewhere inside its own subtree.
    #[error("cannot move section '{section}' below itself (target '{target}')")]
    CyclicSection { section: String, target: String },
}
