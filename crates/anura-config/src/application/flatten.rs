//! Conversion between nested key/value tables and flat dotted-path maps.
//!
//! Documents are naturally nested:
//!
//! ```text
//! sql:
//!   host: localhost
//!   pool:
//!     size: 8
//! ```
//!
//! The tree, however, is fed one `(path, value)` pair at a time.  Flattening
//! turns the nested table above into
//! `{"sql.host": "localhost", "sql.pool.size": "8"}`; nesting reverses it.

use std::collections::BTreeMap;

use crate::domain::path;

/// A flat `path → value` map, sorted by path.
pub type FlatMap = BTreeMap<String, String>;

/// A nested table as produced by a document parser.
pub type Table = BTreeMap<String, Entry>;

/// One value of a nested [`Table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Leaf text.
    Scalar(String),
    /// A nested table.
    Table(Table),
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Entry::Scalar(value.to_string())
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Entry::Scalar(value)
    }
}

impl From<Table> for Entry {
    fn from(table: Table) -> Self {
        Entry::Table(table)
    }
}

/// Performs one flattening pass.
///
/// Every `(key, Table)` entry is replaced by `(key.inner_key, inner_value)`
/// for each of its inner entries.  Inner values that are themselves tables
/// stay tables, so a table nested `n` levels deep needs `n` passes.
pub fn flatten_once(table: Table) -> Table {
    let mut out = Table::new();
    for (key, entry) in table {
        match entry {
            Entry::Scalar(_) => {
                out.insert(key, entry);
            }
            Entry::Table(inner) => {
                for (inner_key, inner_entry) in inner {
                    out.insert(path::join(&key, &inner_key), inner_entry);
                }
            }
        }
    }
    out
}

/// Flattens `table` completely, however deep it is nested.
///
/// Empty tables contribute nothing.  When two entries flatten to the same
/// path (e.g. a literal `"a.b"` key next to `a: {b: ..}`) the one visited
/// last in key order wins.
///
/// # Examples
///
/// ```rust
/// use anura_config::application::flatten::{flatten, Entry, Table};
///
/// let inner: Table = [("c".to_string(), Entry::from("1"))].into();
/// let middle: Table = [("b".to_string(), Entry::from(inner))].into();
/// let outer: Table = [("a".to_string(), Entry::from(middle))].into();
///
/// let flat = flatten(outer);
/// assert_eq!(flat.get("a.b.c").map(String::as_str), Some("1"));
/// ```
pub fn flatten(mut table: Table) -> FlatMap {
    while table.values().any(|e| matches!(e, Entry::Table(_))) {
        table = flatten_once(table);
    }
    table
        .into_iter()
        .filter_map(|(key, entry)| match entry {
            Entry::Scalar(value) => Some((key, value)),
            Entry::Table(_) => None,
        })
        .collect()
}

/// Rebuilds a nested table from a flat map by splitting each path at `.`.
///
/// Entries are applied in path order.  A scalar and a table competing for the
/// same key resolve the way the tree does: whichever is written later
/// replaces the other.
pub fn nest(flat: &FlatMap) -> Table {
    let mut root = Table::new();
    for (full_path, value) in flat {
        let mut keys = full_path.split(path::SEPARATOR).peekable();
        let mut table = &mut root;
        while let Some(key) = keys.next() {
            if keys.peek().is_none() {
                table.insert(key.to_string(), Entry::Scalar(value.clone()));
                break;
            }
            let entry = table
                .entry(key.to_string())
                .or_insert_with(|| Entry::Table(Table::new()));
            if let Entry::Scalar(_) = entry {
                *entry = Entry::Table(Table::new());
            }
            table = match entry {
                Entry::Table(inner) => inner,
                Entry::Scalar(_) => break,
            };
        }
    }
    root
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: Vec<(&str, Entry)>) -> Table {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn flat(entries: &[(&str, &str)]) -> FlatMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn abc() -> Table {
        table(vec![(
            "a",
            Entry::Table(table(vec![(
                "b",
                Entry::Table(table(vec![("c", Entry::from("1"))])),
            )])),
        )])
    }

    #[test]
    fn test_flatten_nested_table_produces_dotted_paths() {
        assert_eq!(flatten(abc()), flat(&[("a.b.c", "1")]));
    }

    #[test]
    fn test_flatten_once_removes_exactly_one_level() {
        // Arrange / Act
        let once = flatten_once(abc());

        // Assert
        assert_eq!(
            once,
            table(vec![(
                "a.b",
                Entry::Table(table(vec![("c", Entry::from("1"))]))
            )])
        );
    }

    #[test]
    fn test_flatten_in_two_single_level_passes_matches_one_full_pass() {
        let two_passes = flatten_once(flatten_once(abc()));
        assert_eq!(flatten(two_passes), flatten(abc()));
    }

    #[test]
    fn test_flatten_keeps_top_level_scalars() {
        let input = table(vec![
            ("x", Entry::from("1")),
            ("y", Entry::Table(table(vec![("z", Entry::from("2"))]))),
        ]);
        assert_eq!(flatten(input), flat(&[("x", "1"), ("y.z", "2")]));
    }

    #[test]
    fn test_flatten_drops_empty_tables() {
        let input = table(vec![("empty", Entry::Table(Table::new()))]);
        assert!(flatten(input).is_empty());
    }

    #[test]
    fn test_nest_inverts_flatten() {
        let original = flat(&[("a.b.c", "1"), ("a.d", "2"), ("e", "3")]);
        assert_eq!(flatten(nest(&original)), original);
    }

    #[test]
    fn test_nest_builds_tables_per_segment() {
        let nested = nest(&flat(&[("a.b", "1"), ("a.c", "2")]));
        assert_eq!(
            nested,
            table(vec![(
                "a",
                Entry::Table(table(vec![("b", Entry::from("1")), ("c", Entry::from("2"))]))
            )])
        );
    }

    #[test]
    fn test_nest_later_table_replaces_earlier_scalar() {
        // "a" sorts before "a.b", so the table wins.
        let nested = nest(&flat(&[("a", "1"), ("a.b", "2")]));
        assert_eq!(flatten(nested), flat(&[("a.b", "2")]));
    }
}
