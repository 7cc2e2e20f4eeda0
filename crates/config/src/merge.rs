//! Deep-merge engine for configuration trees.
//!
//! Responsibilities:
//! - Combine two trees with overlay precedence: mappings recurse, every
//!   other value (sequences included) is replaced wholesale.
//! - Report partial overrides on a warning channel unless suppressed.
//!
//! Does NOT handle:
//! - Import expansion (see `loader::resolver`), which calls into this
//!   module at each mount point.
//!
//! Invariants:
//! - Sequences are replaced, never concatenated or appended. This is a
//!   deliberate policy.
//! - Merge is not commutative: `merge(A, B) != merge(B, A)` whenever any
//!   leaf differs.
//! - `suppress_config_merge_warnings: true` on either input takes effect
//!   for the entire walk the moment it is seen.

use crate::constants::SUPPRESS_KEY;
use crate::value::{Map, Value};

/// Deep-merge `overlay` into `base`, favoring overlay leaves.
///
/// `suppress` silences the partial-override warning channel; the flag key
/// on either input's top level is honored as well.
pub fn deep_merge(base: &mut Map, overlay: Map, suppress: bool) {
    let suppress = suppress || suppress_flag(base) || suppress_flag(&overlay);
    let mut path = Vec::new();
    merge_node(base, overlay, suppress, &mut path);
}

/// True when a tree opts out of merge warnings at its top level.
pub fn suppress_flag(map: &Map) -> bool {
    matches!(map.get(SUPPRESS_KEY), Some(Value::Bool(true)))
}

fn merge_node(base: &mut Map, overlay: Map, suppress: bool, path: &mut Vec<String>) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Mapping(base_child)), Value::Mapping(overlay_child)) => {
                path.push(key);
                if !suppress && is_partial_override(base_child, &overlay_child) {
                    tracing::warn!(
                        key = %path.join("."),
                        "partial override: overlay supplies a subset of existing keys"
                    );
                }
                merge_node(base_child, overlay_child, suppress, path);
                path.pop();
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// A partial override supplies some, but not all, of the keys already
/// present at a path, leaving the rest to fall through from base.
fn is_partial_override(base: &Map, overlay: &Map) -> bool {
    !overlay.is_empty()
        && overlay.len() < base.len()
        && overlay.keys().all(|key| base.contains_key(key))
}
