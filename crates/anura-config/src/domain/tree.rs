//! The configuration tree.
//!
//! A [`ConfigTree`] is a recursive structure of named nodes.  Every node is
//! either a **leaf** holding one text value or a **branch** holding uniquely
//! keyed children, never both.  Nodes are addressed by dotted paths such as
//! `sql.pool.size`.
//!
//! # Arena storage (for beginners)
//!
//! A node needs to know its parent so it can report its own path, while the
//! parent owns its children.  Storing `Rc` links in both directions would
//! create reference cycles.  Instead every node lives in a single `Vec` (the
//! *arena*) owned by the tree, and nodes refer to each other by [`NodeId`],
//! a plain index plus a generation counter.  The parent link is therefore just
//! a number: it never keeps anything alive.
//!
//! Removed slots are recycled.  Each reuse bumps the slot's generation, so a
//! stale [`NodeId`] held by a caller is detected and rejected with
//! [`ConfigError::UnknownNode`] instead of silently pointing at a new node.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::domain::error::ConfigError;
use crate::domain::path::{self, SEPARATOR};
use crate::domain::section::{Section, SectionMut};
use crate::domain::value::{Lookup, Scalars, Value};

/// Handle to a node inside a [`ConfigTree`].
///
/// Handles are cheap to copy.  They stay valid until the node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// Payload of a node: exactly one of a leaf value or a set of children.
#[derive(Debug, Clone)]
enum Content {
    Scalar(String),
    Branch(BTreeMap<String, NodeId>),
}

impl Content {
    fn empty_branch() -> Self {
        Content::Branch(BTreeMap::new())
    }
}

#[derive(Debug, Clone)]
struct Node {
    /// `None` only for the root.
    key: Option<String>,
    /// Non-owning link used to compute paths; `None` only for the root.
    parent: Option<NodeId>,
    content: Content,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A hierarchical, path-addressed configuration store.
///
/// Single writer: mutation requires `&mut self`, so the borrow
/// checker serialises access.  Wrap the tree in a `Mutex` to share it across
/// threads.
///
/// # Examples
///
/// ```rust
/// use anura_config::{ConfigTree, Scalars};
///
/// let mut config = ConfigTree::new();
/// config.set("sql.port", 3306).unwrap();
/// config.set("sql.host", "localhost").unwrap();
///
/// assert_eq!(config.get_i32("sql.port"), 3306);
/// assert_eq!(config.get_keys(true), vec!["sql.host", "sql.port"]);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    /// Creates an empty tree consisting of the root section only.
    pub fn new() -> Self {
        let root = Node {
            key: None,
            parent: None,
            content: Content::empty_branch(),
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    // ── Node metadata ─────────────────────────────────────────────────────────

    /// Returns the handle of the root section.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns `true` if `id` refers to a live node of this tree.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Returns the number of live nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Returns the key of `id`, or `None` for the root and for stale handles.
    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.node(id).ok().and_then(|n| n.key.as_deref())
    }

    /// Returns the parent of `id`, or `None` for the root and for stale handles.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    /// Returns `true` if `id` is the root of this tree.
    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.root
    }

    /// Returns `true` if `id` holds a leaf value.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.node(id), Ok(Node { content: Content::Scalar(_), .. }))
    }

    /// Computes the dotted path from the root to `id`.
    ///
    /// The root contributes nothing, so its own path is the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownNode`] for stale handles.
    pub fn path(&self, id: NodeId) -> Result<String, ConfigError> {
        let mut keys = Vec::new();
        let mut current = self.node(id)?;
        while let (Some(key), Some(parent)) = (current.key.as_deref(), current.parent) {
            keys.push(key);
            current = self.node(parent)?;
        }
        keys.reverse();
        Ok(keys.join(&SEPARATOR.to_string()))
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    /// Returns a read-only view of the whole tree.
    pub fn root_section(&self) -> Section<'_> {
        Section::new(self, self.root)
    }

    /// Returns a read-only view rooted at `id`.
    pub fn section(&self, id: NodeId) -> Option<Section<'_>> {
        self.contains_node(id).then(|| Section::new(self, id))
    }

    /// Returns a mutable view rooted at `id`.
    pub fn section_mut(&mut self, id: NodeId) -> Option<SectionMut<'_>> {
        if self.contains_node(id) {
            Some(SectionMut::new(self, id))
        } else {
            None
        }
    }

    // ── Root-relative operations ──────────────────────────────────────────────

    /// Resolves `path` from the root.  See [`ConfigTree::get_from`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] when `path` is malformed.
    pub fn get(&self, path: &str) -> Result<Option<Lookup<'_>>, ConfigError> {
        self.get_from(self.root, path)
    }

    /// Assigns `value` at `path` from the root.  See [`ConfigTree::set_at`].
    ///
    /// # Errors
    ///
    /// See [`ConfigTree::set_at`].
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        self.set_at(self.root, path, value.into())
    }

    /// Removes whatever is stored at `path`, including whole subtrees.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] when `path` is malformed.
    pub fn remove(&mut self, path: &str) -> Result<(), ConfigError> {
        self.set_at(self.root, path, Value::Null)
    }

    /// Fetches or creates the section at `path` below the root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] when `path` is malformed.
    pub fn create_section(&mut self, path: &str) -> Result<NodeId, ConfigError> {
        self.create_section_at(self.root, path)
    }

    /// Lists the full paths of leaf values below the root.
    ///
    /// With `deep == false` only the root's direct leaf children are listed.
    pub fn get_keys(&self, deep: bool) -> Vec<String> {
        self.keys_at(self.root, deep).unwrap_or_default()
    }

    /// Maps the full paths of leaf values below the root to their text.
    pub fn get_map(&self, deep: bool) -> BTreeMap<String, String> {
        self.map_at(self.root, deep).unwrap_or_default()
    }

    /// Applies every `(path, value)` entry from the root, skipping invalid
    /// entries.  Returns the number of entries applied.
    pub fn set_all<I, K, V>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.set_all_at(self.root, entries)
    }

    // ── Node-relative operations ──────────────────────────────────────────────

    /// Resolves `path` relative to `at`.
    ///
    /// An empty path returns `at` itself: its value when it is a leaf,
    /// otherwise the section handle.  A non-empty path walks one key at a
    /// time and yields `Ok(None)` as soon as a key is missing.  Nothing is
    /// ever created by a lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] for malformed non-empty paths and
    /// [`ConfigError::UnknownNode`] when `at` is stale.
    pub fn get_from(&self, at: NodeId, path: &str) -> Result<Option<Lookup<'_>>, ConfigError> {
        self.node(at)?;
        if !path.is_empty() {
            path::validate_path(path)?;
        }
        Ok(self.resolve(at, path).map(|id| self.lookup_of(id)))
    }

    /// Resolves `path` relative to `at` to a node handle, leaf or branch.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigTree::get_from`].
    pub fn node_at(&self, at: NodeId, path: &str) -> Result<Option<NodeId>, ConfigError> {
        self.node(at)?;
        if !path.is_empty() {
            path::validate_path(path)?;
        }
        Ok(self.resolve(at, path))
    }

    /// Assigns `value` at `path` relative to `at`.
    ///
    /// - [`Value::Scalar`] stores the text, replacing any section with the
    ///   same key.
    /// - [`Value::Null`] removes the node and its whole subtree.
    /// - [`Value::Section`] moves an existing section to `path`, replacing
    ///   whatever was stored there.
    ///
    /// Missing intermediate sections are created on the way down, except for
    /// removals, which never create anything.  An empty path assigns to `at`
    /// itself, which is rejected for the root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] for malformed paths,
    /// [`ConfigError::EmptyRootPath`] for an empty path on the root,
    /// [`ConfigError::UnknownNode`] for stale handles and
    /// [`ConfigError::CyclicSection`] when a section would be moved below
    /// itself.
    pub fn set_at(&mut self, at: NodeId, path: &str, value: Value) -> Result<(), ConfigError> {
        let node = self.node(at)?;
        if path.is_empty() {
            return match (node.parent, node.key.clone()) {
                (Some(parent), Some(key)) => self.set_at(parent, &key, value),
                _ => Err(ConfigError::EmptyRootPath),
            };
        }
        path::validate_path(path)?;
        if let Value::Section(moved) = value {
            self.check_move(at, path, moved)?;
        }
        self.set_validated(at, path, value)
    }

    /// Fetches or creates the section at `path` relative to `at`.
    ///
    /// Calling this twice with the same path returns the same handle.  Missing
    /// intermediate sections are created; a leaf in the way is turned into an
    /// empty section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] for malformed (including empty)
    /// paths and [`ConfigError::UnknownNode`] when `at` is stale.
    pub fn create_section_at(&mut self, at: NodeId, path: &str) -> Result<NodeId, ConfigError> {
        self.node(at)?;
        let keys = path::split(path)?;
        let mut current = at;
        for key in keys {
            current = self.child_section(current, key)?;
        }
        Ok(current)
    }

    /// Lists the full paths of leaf values below `at`.
    ///
    /// With `deep == false` only direct leaf children are listed; with
    /// `deep == true` the whole subtree is walked.  The value of `at` itself
    /// is never listed.  Paths are sorted by key at every level.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownNode`] when `at` is stale.
    pub fn keys_at(&self, at: NodeId, deep: bool) -> Result<Vec<String>, ConfigError> {
        let mut keys = Vec::new();
        self.walk_leaves(at, deep, &mut |path: String, _: &str| keys.push(path))?;
        Ok(keys)
    }

    /// Maps the full paths of leaf values below `at` to their text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownNode`] when `at` is stale.
    pub fn map_at(&self, at: NodeId, deep: bool) -> Result<BTreeMap<String, String>, ConfigError> {
        let mut map = BTreeMap::new();
        self.walk_leaves(at, deep, &mut |path: String, value: &str| {
            map.insert(path, value.to_string());
        })?;
        Ok(map)
    }

    /// Applies every `(path, value)` entry relative to `at`.
    ///
    /// Entries that fail (malformed path, stale section handle, cyclic move)
    /// are logged and skipped; the rest of the batch is still applied.
    /// Returns the number of entries applied.
    pub fn set_all_at<I, K, V>(&mut self, at: NodeId, entries: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut applied = 0;
        for (path, value) in entries {
            let path = path.as_ref();
            match self.set_at(at, path, value.into()) {
                Ok(()) => applied += 1,
                Err(e) => warn!("skipping config entry '{path}': {e}"),
            }
        }
        applied
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn node(&self, id: NodeId) -> Result<&Node, ConfigError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(ConfigError::UnknownNode)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, ConfigError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(ConfigError::UnknownNode)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.generation = slot.generation.wrapping_add(1);
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Releases `id` and every node below it.
    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index)
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            let Some(node) = slot.node.take() else {
                continue;
            };
            if let Content::Branch(children) = node.content {
                stack.extend(children.into_values());
            }
            self.free.push(current.index);
        }
    }

    /// Iterates the direct children of `id` in key order.
    pub(crate) fn children(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        let children = match self.node(id) {
            Ok(Node {
                content: Content::Branch(children),
                ..
            }) => Some(children),
            _ => None,
        };
        children
            .into_iter()
            .flatten()
            .map(|(key, &child)| (key.as_str(), child))
    }

    fn child(&self, at: NodeId, key: &str) -> Option<NodeId> {
        match self.node(at) {
            Ok(Node {
                content: Content::Branch(children),
                ..
            }) => children.get(key).copied(),
            _ => None,
        }
    }

    /// Walks a validated (or empty) path without creating anything.
    fn resolve(&self, at: NodeId, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return Some(at);
        }
        path.split(SEPARATOR)
            .try_fold(at, |current, key| self.child(current, key))
    }

    fn lookup_of(&self, id: NodeId) -> Lookup<'_> {
        match self.node(id) {
            Ok(Node {
                content: Content::Scalar(value),
                ..
            }) => Lookup::Scalar(value),
            _ => Lookup::Section(id),
        }
    }

    /// Returns the children of `id`, turning a leaf into an empty branch first.
    fn branch_mut(&mut self, id: NodeId) -> Result<&mut BTreeMap<String, NodeId>, ConfigError> {
        let node = self.node_mut(id)?;
        if let Content::Scalar(old) = &node.content {
            trace!("replacing value '{old}' with a section");
            node.content = Content::empty_branch();
        }
        match &mut node.content {
            Content::Branch(children) => Ok(children),
            Content::Scalar(_) => Err(ConfigError::UnknownNode),
        }
    }

    /// Fetches or creates the branch child `key` of `at`.
    fn child_section(&mut self, at: NodeId, key: &str) -> Result<NodeId, ConfigError> {
        if let Some(existing) = self.child(at, key) {
            self.branch_mut(existing)?;
            return Ok(existing);
        }
        let id = self.alloc(Node {
            key: Some(key.to_string()),
            parent: Some(at),
            content: Content::empty_branch(),
        });
        self.branch_mut(at)?.insert(key.to_string(), id);
        let created = self.path(id)?;
        debug!("created config section '{created}'");
        Ok(id)
    }

    fn set_validated(&mut self, at: NodeId, path: &str, value: Value) -> Result<(), ConfigError> {
        let (head, rest) = path::split_first(path);
        if rest.is_empty() {
            return self.assign(at, head, value);
        }
        let next = match (&value, self.child(at, head)) {
            // Removing below a missing or leaf node: nothing to do.
            (Value::Null, None) => return Ok(()),
            (Value::Null, Some(child)) if self.is_leaf(child) => return Ok(()),
            (Value::Null, Some(child)) => child,
            _ => self.child_section(at, head)?,
        };
        self.set_validated(next, rest, value)
    }

    /// Assigns `value` to the direct child `key` of `at`.
    fn assign(&mut self, at: NodeId, key: &str, value: Value) -> Result<(), ConfigError> {
        match value {
            Value::Null => {
                if let Some(child) = self.child(at, key) {
                    let removed = self.path(child)?;
                    debug!("removing config path '{removed}'");
                    self.branch_mut(at)?.remove(key);
                    self.free_subtree(child);
                }
            }
            Value::Scalar(text) => match self.child(at, key) {
                Some(child) => {
                    let node = self.node_mut(child)?;
                    let old = std::mem::replace(&mut node.content, Content::Scalar(text));
                    if let Content::Branch(children) = old {
                        for grandchild in children.into_values() {
                            self.free_subtree(grandchild);
                        }
                    }
                }
                None => {
                    let id = self.alloc(Node {
                        key: Some(key.to_string()),
                        parent: Some(at),
                        content: Content::Scalar(text),
                    });
                    self.branch_mut(at)?.insert(key.to_string(), id);
                }
            },
            Value::Section(moved) => {
                if self.child(at, key) == Some(moved) {
                    return Ok(());
                }
                self.detach(moved)?;
                let replaced = self.branch_mut(at)?.insert(key.to_string(), moved);
                if let Some(replaced) = replaced {
                    self.free_subtree(replaced);
                }
                let node = self.node_mut(moved)?;
                node.key = Some(key.to_string());
                node.parent = Some(at);
                let target = self.path(moved)?;
                debug!("moved config section to '{target}'");
            }
        }
        Ok(())
    }

    /// Unlinks `id` from its parent without freeing it.
    fn detach(&mut self, id: NodeId) -> Result<(), ConfigError> {
        let node = self.node(id)?;
        if let (Some(parent), Some(key)) = (node.parent, node.key.clone()) {
            self.branch_mut(parent)?.remove(&key);
            self.node_mut(id)?.parent = None;
        }
        Ok(())
    }

    /// Rejects moves of the root and moves of a section below itself.
    fn check_move(&self, at: NodeId, path: &str, moved: NodeId) -> Result<(), ConfigError> {
        self.node(moved)?;
        let cyclic = || ConfigError::CyclicSection {
            section: self.path(moved).unwrap_or_default(),
            target: path.to_string(),
        };
        if moved == self.root {
            return Err(cyclic());
        }
        // `at` inside the moved subtree?
        let mut ancestor = Some(at);
        while let Some(current) = ancestor {
            if current == moved {
                return Err(cyclic());
            }
            ancestor = self.parent(current);
        }
        // An existing prefix of `path` passing through the moved section?
        let keys: Vec<&str> = path.split(SEPARATOR).collect();
        let mut current = at;
        for (i, key) in keys.iter().enumerate() {
            let Some(next) = self.child(current, key) else {
                break;
            };
            if next == moved && i + 1 < keys.len() {
                return Err(cyclic());
            }
            current = next;
        }
        Ok(())
    }

    /// Visits the leaves below `at` in key order, passing full paths.
    fn walk_leaves(
        &self,
        at: NodeId,
        deep: bool,
        visit: &mut dyn FnMut(String, &str),
    ) -> Result<(), ConfigError> {
        let base = self.path(at)?;
        let Content::Branch(children) = &self.node(at)?.content else {
            return Ok(());
        };
        for (key, &child) in children {
            let child_path = path::join(&base, key);
            match &self.node(child)?.content {
                Content::Scalar(value) => visit(child_path, value),
                Content::Branch(_) if deep => self.walk_leaves(child, true, visit)?,
                Content::Branch(_) => {}
            }
        }
        Ok(())
    }
}

impl Scalars for ConfigTree {
    fn lookup(&self, path: &str) -> Result<Option<Lookup<'_>>, ConfigError> {
        self.get(path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
