//! core::uninstance
//!
//! Making forwarded paths directly editable.
//!
//! # Algorithm
//!
//! Instancing forbids per-location edits: every descendant of an instance is
//! shared prototype content. Uninstancing clears the instanceable flag on
//! the minimal chain of ancestors so the requested path composes directly.
//! Each iteration clears exactly one flag (the nearest existing ancestor's)
//! and re-probes; callers observing the stage see each individual change.
//!
//! # Invariants
//!
//! - No mutation happens unless forwarding resolution succeeds first
//! - Only instanceable flags change; shared prototype content is never
//!   touched, so sibling instances of the same prototype are unaffected
//! - Each iteration strictly decreases the number of instanced ancestors
//!   above the path, bounding the loop by the path's depth

use crate::stage::{Prim, Stage};

use super::resolve::{nearest_existing_ancestor, prim_at_path_with_forwarding, ForwardingError};
use super::types::ScenePath;

/// Make `path` directly resolvable by uninstancing its ancestors, and
/// return the resulting prim.
///
/// When a prim already composes at `path`, returns it unchanged (repeated
/// calls are no-ops). When forwarding resolution finds nothing for `path`,
/// returns `Ok(None)` without mutating anything. Otherwise clears the
/// instanceable flag on one ancestor per iteration until `path` composes
/// directly.
///
/// The flag changes are authored, persistent state; from the caller's
/// perspective they are not reversible by this crate.
///
/// # Errors
///
/// Returns a [`ForwardingError`] for internal-consistency failures: an
/// anchor that resolution proved instanceable but is not
/// ([`ForwardingError::AnchorNotInstance`]), or a stage that rejects the
/// flag mutation.
///
/// # Example
///
/// ```
/// use stagewalk::core::uninstance::uninstance_prim_at_path;
/// use stagewalk::core::types::ScenePath;
/// use stagewalk::stage::{MemoryStage, Prim, Specifier};
///
/// let mut stage = MemoryStage::new();
/// stage.define_prototype("/__Prototype_1").unwrap();
/// stage.define_prim("/__Prototype_1/Table", Specifier::Def).unwrap();
/// stage.make_instance("/World/Set", "/__Prototype_1").unwrap();
///
/// let table = ScenePath::new("/World/Set/Table").unwrap();
/// let prim = uninstance_prim_at_path(&mut stage, &table).unwrap().unwrap();
/// assert_eq!(prim.path().as_str(), "/World/Set/Table");
/// ```
pub fn uninstance_prim_at_path<S: Stage>(
    stage: &mut S,
    path: &ScenePath,
) -> Result<Option<S::Prim>, ForwardingError> {
    // One instanced ancestor is cleared per iteration, so the path's depth
    // bounds the loop; running past it means the stage is not honoring the
    // flag mutation.
    let max_steps = path.depth() + 1;
    for _ in 0..max_steps {
        if let Some(prim) = stage.prim_at_path(path) {
            return Ok(Some(prim));
        }

        // Probe before mutating: when nothing anywhere answers to the path,
        // leave the graph alone.
        if prim_at_path_with_forwarding(stage, path)?.is_none() {
            return Ok(None);
        }

        let Some((anchor_path, anchor)) = nearest_existing_ancestor(stage, path) else {
            return Ok(None);
        };
        if !anchor_path.is_prim_path() {
            return Ok(None);
        }
        // The successful probe above guarantees the anchor is an instance;
        // anything else is corrupted state, reported distinctly.
        if !anchor.is_instance() {
            return Err(ForwardingError::AnchorNotInstance { path: anchor_path });
        }

        tracing::debug!(anchor = %anchor_path, target = %path, "clearing instanceable flag");
        stage.set_instanceable(&anchor_path, false)?;
    }
    Err(ForwardingError::DepthExceeded {
        path: path.clone(),
        depth: max_steps,
    })
}
