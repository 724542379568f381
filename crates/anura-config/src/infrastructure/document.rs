//! Persistence bridge between text documents and the flat path model.
//!
//! Loading parses a YAML or TOML document into a nested [`Table`] and
//! flattens it into `path → value` pairs for [`ConfigTree::set_all`].
//! Saving collects every leaf of a tree, sorts by path and lets the
//! serializer rebuild the nesting.
//!
//! # Scalar conversion (for beginners)
//!
//! The tree only stores text, but documents have types.  On load:
//!
//! | Document value      | Stored text                  |
//! |---------------------|------------------------------|
//! | string              | the string itself            |
//! | integer / float     | its decimal form             |
//! | boolean             | `true` / `false`             |
//! | `null` / empty      | nothing (entry is skipped)   |
//! | sequence            | `[a, b, c]`                  |
//!
//! On save, text that is a canonical integer or exactly `true`/`false` is
//! written unquoted so the document stays pleasant to edit by hand;
//! everything else is written as a string.
//!
//! [`ConfigTree::set_all`]: crate::ConfigTree::set_all

use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::application::defaults::apply_defaults;
use crate::application::flatten::{flatten, nest, Entry, FlatMap, Table};
use crate::domain::section::Section;
use crate::domain::tree::ConfigTree;

/// Errors raised while reading or parsing a document (LoadFailure).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document could not be read.
    #[error("failed to read config document {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: io::Error,
    },

    /// The YAML text is malformed.
    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The TOML text is malformed.
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The document root is a scalar or sequence instead of a mapping.
    #[error("config document root must be a mapping, found {0}")]
    NotAMapping(&'static str),

    /// A mapping key is itself a sequence or mapping.
    #[error("config document contains an unsupported key: {0}")]
    UnsupportedKey(String),
}

/// Errors raised while serializing or writing a document (SaveFailure).
#[derive(Debug, Error)]
pub enum SaveError {
    /// The document could not be written.
    #[error("failed to write config document {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: io::Error,
    },

    /// YAML serialization failed.
    #[error("failed to serialize YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML serialization failed.
    #[error("failed to serialize TOML config: {0}")]
    Toml(#[from] toml::ser::Error),
}

/// Text format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// YAML, the primary format.
    #[default]
    Yaml,
    /// TOML.
    Toml,
}

impl DocumentFormat {
    /// Picks the format from a file extension: `.toml` is TOML, anything
    /// else is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Yaml,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parses `text` into a nested table.
///
/// An empty YAML document yields an empty table.
///
/// # Errors
///
/// Returns [`LoadError`] for malformed text, a non-mapping root or
/// unsupported keys.
pub fn parse(text: &str, format: DocumentFormat) -> Result<Table, LoadError> {
    match format {
        DocumentFormat::Yaml => yaml::parse(text),
        DocumentFormat::Toml => toml_format::parse(text),
    }
}

/// Parses `text` and flattens it into a `path → value` map.
///
/// # Errors
///
/// See [`parse`].
///
/// # Examples
///
/// ```rust
/// use anura_config::infrastructure::document::{load, DocumentFormat};
///
/// let flat = load("sql:\n  port: 3306\n", DocumentFormat::Yaml).unwrap();
/// assert_eq!(flat.get("sql.port").map(String::as_str), Some("3306"));
/// ```
pub fn load(text: &str, format: DocumentFormat) -> Result<FlatMap, LoadError> {
    let flat = flatten(parse(text, format)?);
    debug!("loaded {} config value(s) from {format:?} document", flat.len());
    Ok(flat)
}

/// Serializes a flat map as a nested document.
///
/// # Errors
///
/// Returns [`SaveError`] if the serializer fails.
pub fn render(flat: &FlatMap, format: DocumentFormat) -> Result<String, SaveError> {
    let nested = nest(flat);
    match format {
        DocumentFormat::Yaml => yaml::render(nested),
        DocumentFormat::Toml => toml_format::render(nested),
    }
}

/// Serializes every leaf below `section`, keyed by full path, sorted.
///
/// # Errors
///
/// See [`render`].
pub fn save(section: Section<'_>, format: DocumentFormat) -> Result<String, SaveError> {
    render(&section.map(true), format)
}

/// Overlays a defaults template onto `tree`, best effort.
///
/// A template that cannot be parsed is logged and ignored so that a broken
/// defaults resource never prevents startup.  Returns the number of values
/// copied.
pub fn overlay_defaults(tree: &mut ConfigTree, template: &str, format: DocumentFormat) -> usize {
    match load(template, format) {
        Ok(flat) => apply_defaults(tree, &flat),
        Err(e) => {
            warn!("ignoring config defaults: {e}");
            0
        }
    }
}

/// Returns `Some(n)` when `text` is exactly the decimal form of an `i64`.
fn canonical_integer(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().filter(|n| n.to_string() == text)
}

/// Returns `Some(f)` when `text` is exactly the plain decimal form of a
/// moderate, non-integral `f64`.  Exponent forms stay strings because the
/// serializers may print them differently.
fn canonical_float(text: &str) -> Option<f64> {
    if !text.contains('.') {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| (1e-4..1e15).contains(&f.abs()) && f.to_string() == text)
}

fn canonical_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// ── YAML ──────────────────────────────────────────────────────────────────────

mod yaml {
    use serde_yaml::{Mapping, Number, Value};

    use super::{
        canonical_bool, canonical_float, canonical_integer, Entry, LoadError, SaveError, Table,
    };

    pub(super) fn parse(text: &str) -> Result<Table, LoadError> {
        if is_blank(text) {
            return Ok(Table::new());
        }
        let value: Value = serde_yaml::from_str(text)?;
        root_table(value)
    }

    pub(super) fn render(table: Table) -> Result<String, SaveError> {
        Ok(serde_yaml::to_string(&Value::Mapping(to_mapping(table)))?)
    }

    /// `true` for documents holding nothing but whitespace and comments.
    fn is_blank(text: &str) -> bool {
        text.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        })
    }

    fn root_table(value: Value) -> Result<Table, LoadError> {
        match value {
            Value::Null => Ok(Table::new()),
            Value::Mapping(mapping) => from_mapping(mapping),
            Value::Tagged(tagged) => root_table(tagged.value),
            Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                Err(LoadError::NotAMapping("a scalar"))
            }
            Value::Sequence(_) => Err(LoadError::NotAMapping("a sequence")),
        }
    }

    fn from_mapping(mapping: Mapping) -> Result<Table, LoadError> {
        let mut table = Table::new();
        for (key, value) in mapping {
            let key = match key {
                Value::Sequence(_) | Value::Mapping(_) => {
                    return Err(LoadError::UnsupportedKey(inline(&key)))
                }
                other => inline(&other),
            };
            if let Some(entry) = to_entry(value)? {
                table.insert(key, entry);
            }
        }
        Ok(table)
    }

    fn to_entry(value: Value) -> Result<Option<Entry>, LoadError> {
        Ok(match value {
            Value::Null => None,
            Value::Mapping(mapping) => Some(Entry::Table(from_mapping(mapping)?)),
            Value::Tagged(tagged) => to_entry(tagged.value)?,
            other => Some(Entry::Scalar(inline(&other))),
        })
    }

    /// Single-line text form of any YAML value.
    fn inline(value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Sequence(items) => {
                let items: Vec<String> = items.iter().map(inline).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Mapping(mapping) => {
                let entries: Vec<String> = mapping
                    .iter()
                    .map(|(k, v)| format!("{}: {}", inline(k), inline(v)))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Value::Tagged(tagged) => inline(&tagged.value),
        }
    }

    fn to_mapping(table: Table) -> Mapping {
        table
            .into_iter()
            .map(|(key, entry)| {
                let value = match entry {
                    Entry::Scalar(text) => scalar(text),
                    Entry::Table(inner) => Value::Mapping(to_mapping(inner)),
                };
                (Value::String(key), value)
            })
            .collect()
    }

    fn scalar(text: String) -> Value {
        if let Some(n) = canonical_integer(&text) {
            Value::Number(Number::from(n))
        } else if let Some(f) = canonical_float(&text) {
            Value::Number(Number::from(f))
        } else if let Some(b) = canonical_bool(&text) {
            Value::Bool(b)
        } else {
            Value::String(text)
        }
    }
}

// ── TOML ──────────────────────────────────────────────────────────────────────

mod toml_format {
    use toml::Value;

    use super::{
        canonical_bool, canonical_float, canonical_integer, Entry, LoadError, SaveError, Table,
    };

    pub(super) fn parse(text: &str) -> Result<Table, LoadError> {
        let table: toml::Table = toml::from_str(text)?;
        Ok(from_table(table))
    }

    pub(super) fn render(table: Table) -> Result<String, SaveError> {
        Ok(toml::to_string(&to_table(table))?)
    }

    fn from_table(table: toml::Table) -> Table {
        table
            .into_iter()
            .map(|(key, value)| {
                let entry = match value {
                    Value::Table(inner) => Entry::Table(from_table(inner)),
                    other => Entry::Scalar(inline(&other)),
                };
                (key, entry)
            })
            .collect()
    }

    fn inline(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Datetime(dt) => dt.to_string(),
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(inline).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Table(table) => {
                let entries: Vec<String> = table
                    .iter()
                    .map(|(k, v)| format!("{k} = {}", inline(v)))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }

    fn to_table(table: Table) -> toml::Table {
        table
            .into_iter()
            .map(|(key, entry)| {
                let value = match entry {
                    Entry::Scalar(text) => scalar(text),
                    Entry::Table(inner) => Value::Table(to_table(inner)),
                };
                (key, value)
            })
            .collect()
    }

    fn scalar(text: String) -> Value {
        if let Some(n) = canonical_integer(&text) {
            Value::Integer(n)
        } else if let Some(f) = canonical_float(&text) {
            Value::Float(f)
        } else if let Some(b) = canonical_bool(&text) {
            Value::Boolean(b)
        } else {
            Value::String(text)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
