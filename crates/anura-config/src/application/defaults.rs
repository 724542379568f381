//! Defaults overlay: fill the gaps of a configuration from a template.
//!
//! On first start the user's configuration file is empty.  Rather than
//! shipping code full of hard-coded fallbacks, a template document lists
//! every known path with its default value.  The overlay copies a template
//! value into the target only where the target has nothing, so anything the
//! user configured always wins.

use tracing::{debug, warn};

use crate::application::flatten::FlatMap;
use crate::domain::error::ConfigError;
use crate::domain::path::{self, SEPARATOR};
use crate::domain::tree::{ConfigTree, NodeId};
use crate::domain::value::Lookup;

/// Applies `template` to the whole tree.  See [`apply_defaults_at`].
pub fn apply_defaults(target: &mut ConfigTree, template: &FlatMap) -> usize {
    let root = target.root();
    apply_defaults_at(target, root, template).unwrap_or_default()
}

/// Copies every template entry whose path is absent below `at`.
///
/// A template path counts as present when it resolves to a value or a
/// section, and also when one of its prefixes already holds a value: writing
/// `x.y` would otherwise replace a user-supplied `x`.  Template entries with
/// invalid paths are logged and skipped.
///
/// Returns the number of entries copied.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownNode`] when `at` is stale.
pub fn apply_defaults_at(
    target: &mut ConfigTree,
    at: NodeId,
    template: &FlatMap,
) -> Result<usize, ConfigError> {
    target.node_at(at, "")?;
    let mut applied = 0;
    for (template_path, value) in template {
        match is_occupied(target, at, template_path) {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                warn!("ignoring default for '{template_path}': {e}");
                continue;
            }
        }
        target.set_at(at, template_path, value.into())?;
        applied += 1;
    }
    debug!("applied {applied} of {} default value(s)", template.len());
    Ok(applied)
}

/// Returns `true` when `full_path` or any of its prefixes holds something.
fn is_occupied(tree: &ConfigTree, at: NodeId, full_path: &str) -> Result<bool, ConfigError> {
    path::validate_path(full_path)?;
    let mut prefix_end = 0;
    for (i, key) in full_path.split(SEPARATOR).enumerate() {
        prefix_end += key.len() + usize::from(i > 0);
        match tree.get_from(at, &full_path[..prefix_end])? {
            None => return Ok(false),
            Some(Lookup::Scalar(_)) => return Ok(true),
            Some(Lookup::Section(_)) => {}
        }
    }
    Ok(true)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
