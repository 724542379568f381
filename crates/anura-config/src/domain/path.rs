//! Dotted path validation and splitting.
//!
//! A path such as `discord.guild.id` addresses a node from the root of a
//! configuration tree.  Each dot-separated piece is a *key*.
//!
//! # Reserved characters (for beginners)
//!
//! Three characters may never appear inside a key:
//!
//! - `.` – it separates keys inside a path, so a key containing a dot could
//!   never be addressed unambiguously.
//! - `:` – the document format uses it to assign a value to a key.
//! - `#` – the document format uses it to start a comment.

use thiserror::Error;

/// Separator between the keys of a path.
pub const SEPARATOR: char = '.';

/// Characters that may not appear inside a single key.
pub const RESERVED: [char; 3] = ['.', ':', '#'];

/// Errors produced when validating a single key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key is the empty string.
    #[error("key may not be empty")]
    Empty,

    /// The key contains `.`, `:` or `#`.
    #[error("key '{key}' contains reserved character '{found}'")]
    ReservedChar { key: String, found: char },
}

/// Errors produced when validating a dotted path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path is the empty string.
    #[error("path may not be empty")]
    Empty,

    /// The path contains two consecutive separators.
    #[error("path '{0}' contains an empty segment ('..')")]
    EmptySegment(String),

    /// The path starts with a separator.
    #[error("path '{0}' starts with '.'")]
    LeadingSeparator(String),

    /// The path ends with a separator.
    #[error("path '{0}' ends with '.'")]
    TrailingSeparator(String),

    /// One of the segments is not a valid key.
    #[error("path '{path}' has an invalid segment: {source}")]
    InvalidKey {
        path: String,
        #[source]
        source: KeyError,
    },
}

/// Checks that `key` can be used as a single path segment.
///
/// # Errors
///
/// Returns [`KeyError::Empty`] for `""` and [`KeyError::ReservedChar`] when
/// the key contains `.`, `:` or `#`.
pub fn validate_key(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    match key.chars().find(|c| RESERVED.contains(c)) {
        Some(found) => Err(KeyError::ReservedChar {
            key: key.to_string(),
            found,
        }),
        None => Ok(()),
    }
}

/// Checks that `path` is a non-empty, dot-separated sequence of valid keys.
///
/// # Errors
///
/// Returns the first [`PathError`] that applies, checked in this order:
/// empty path, `..`, leading `.`, trailing `.`, invalid segment.
pub fn validate_path(path: &str) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    if path.contains("..") {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    if path.starts_with(SEPARATOR) {
        return Err(PathError::LeadingSeparator(path.to_string()));
    }
    if path.ends_with(SEPARATOR) {
        return Err(PathError::TrailingSeparator(path.to_string()));
    }
    for segment in path.split(SEPARATOR) {
        validate_key(segment).map_err(|source| PathError::InvalidKey {
            path: path.to_string(),
            source,
        })?;
    }
    Ok(())
}

/// Validates `path` and returns its keys in root-to-leaf order.
///
/// # Errors
///
/// Returns the [`PathError`] reported by [`validate_path`].
///
/// # Examples
///
/// ```rust
/// use anura_config::domain::path::split;
///
/// assert_eq!(split("discord.guild").unwrap(), vec!["discord", "guild"]);
/// assert!(split("discord..guild").is_err());
/// ```
pub fn split(path: &str) -> Result<Vec<&str>, PathError> {
    validate_path(path)?;
    Ok(path.split(SEPARATOR).collect())
}

/// Splits a validated path into its first key and the (possibly empty) rest.
pub(crate) fn split_first(path: &str) -> (&str, &str) {
    match path.split_once(SEPARATOR) {
        Some((head, rest)) => (head, rest),
        None => (path, ""),
    }
}

/// Joins a parent path and a key, treating an empty parent as the root.
pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}{SEPARATOR}{key}")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
