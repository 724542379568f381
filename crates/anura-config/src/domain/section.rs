//! Views that run tree operations relative to one section.
//!
//! [`ConfigTree::create_section`] hands out a [`NodeId`].  Wrapping that
//! handle in a [`Section`] (read-only) or [`SectionMut`] (read-write) lets a
//! subsystem work with paths relative to "its" part of the configuration,
//! e.g. a database layer that only ever sees `host`, `port` and `user` below
//! `sql`.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::ConfigError;
use crate::domain::tree::{ConfigTree, NodeId};
use crate::domain::value::{Lookup, Scalars, Value};

/// Read-only view of the subtree rooted at one node.
#[derive(Clone, Copy)]
pub struct Section<'a> {
    tree: &'a ConfigTree,
    id: NodeId,
}

impl<'a> Section<'a> {
    pub(crate) fn new(tree: &'a ConfigTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// Handle of the node this view is rooted at.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Key of this section; `None` for the root.
    pub fn key(&self) -> Option<&'a str> {
        self.tree.key(self.id)
    }

    /// Full dotted path of this section; empty for the root.
    pub fn path(&self) -> String {
        self.tree.path(self.id).unwrap_or_default()
    }

    /// Returns `true` if this view is rooted at the root section.
    pub fn is_root(&self) -> bool {
        self.tree.is_root(self.id)
    }

    /// View of the parent section, `None` for the root.
    pub fn parent(&self) -> Option<Section<'a>> {
        self.tree.parent(self.id).map(|p| Section::new(self.tree, p))
    }

    /// Resolves `path` relative to this section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] when `path` is malformed.
    pub fn get(&self, path: &str) -> Result<Option<Lookup<'a>>, ConfigError> {
        self.tree.get_from(self.id, path)
    }

    /// View of the section at `path`, `None` when absent or a leaf.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] when `path` is malformed.
    pub fn section(&self, path: &str) -> Result<Option<Section<'a>>, ConfigError> {
        Ok(self
            .get(path)?
            .and_then(Lookup::as_section)
            .map(|id| Section::new(self.tree, id)))
    }

    /// Full paths of the leaf values below this section.
    pub fn keys(&self, deep: bool) -> Vec<String> {
        self.tree.keys_at(self.id, deep).unwrap_or_default()
    }

    /// Full paths of the leaf values below this section mapped to their text.
    pub fn map(&self, deep: bool) -> BTreeMap<String, String> {
        self.tree.map_at(self.id, deep).unwrap_or_default()
    }
}

impl Scalars for Section<'_> {
    fn lookup(&self, path: &str) -> Result<Option<Lookup<'_>>, ConfigError> {
        self.get(path)
    }
}

/// Renders the subtree as `Section[key]{a='1', Section[b]{c='2'}}`.
impl fmt::Display for Section<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Section[{}]{{", self.key().unwrap_or_default())?;
        if let Ok(Some(Lookup::Scalar(value))) = self.get("") {
            write!(f, "'{value}'")?;
        }
        let mut first = true;
        for (key, child) in self.tree.children(self.id) {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            match self.tree.get_from(child, "") {
                Ok(Some(Lookup::Scalar(value))) => write!(f, "{key}='{value}'")?,
                _ => write!(f, "{}", Section::new(self.tree, child))?,
            }
        }
        f.write_str("}")
    }
}

impl fmt::Debug for Section<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Read-write view of the subtree rooted at one node.
pub struct SectionMut<'a> {
    tree: &'a mut ConfigTree,
    id: NodeId,
}

impl<'a> SectionMut<'a> {
    pub(crate) fn new(tree: &'a mut ConfigTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// Handle of the node this view is rooted at.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Read-only view of the same section.
    pub fn as_section(&self) -> Section<'_> {
        Section::new(self.tree, self.id)
    }

    /// Assigns `value` at `path` relative to this section.
    ///
    /// # Errors
    ///
    /// See [`ConfigTree::set_at`].
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        self.tree.set_at(self.id, path, value.into())
    }

    /// Removes whatever is stored at `path` relative to this section.
    ///
    /// # Errors
    ///
    /// See [`ConfigTree::set_at`].
    pub fn remove(&mut self, path: &str) -> Result<(), ConfigError> {
        self.tree.set_at(self.id, path, Value::Null)
    }

    /// Fetches or creates the section at `path` relative to this section.
    ///
    /// # Errors
    ///
    /// See [`ConfigTree::create_section_at`].
    pub fn create_section(&mut self, path: &str) -> Result<NodeId, ConfigError> {
        self.tree.create_section_at(self.id, path)
    }

    /// Applies every entry relative to this section, skipping invalid ones.
    pub fn set_all<I, K, V>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.tree.set_all_at(self.id, entries)
    }
}

impl Scalars for SectionMut<'_> {
    fn lookup(&self, path: &str) -> Result<Option<Lookup<'_>>, ConfigError> {
        self.tree.get_from(self.id, path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
