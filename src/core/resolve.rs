//! core::resolve
//!
//! Forwarding resolution through instance prototypes.
//!
//! # Algorithm
//!
//! A path that lives "inside" an instance has no directly composed prim.
//! Resolution walks upward to the nearest existing ancestor (the *anchor*),
//! and when that anchor is an instance, rebases the requested path onto the
//! anchor's prototype root and tries again. The loop handles arbitrarily
//! nested instancing: a prototype may itself contain instances.
//!
//! # Invariants
//!
//! - Pure read: no graph state changes, no reference retained past the call
//! - Ordinary absence is `Ok(None)`; engine corruption (an instance without
//!   a prototype root, or an apparent prototype cycle) is a typed error and
//!   is never folded into absence
//! - The prototype graph is assumed acyclic; [`MAX_FORWARDING_DEPTH`] turns
//!   a violated assumption into [`ForwardingError::DepthExceeded`] instead
//!   of an unbounded walk

use thiserror::Error;

use crate::stage::{Prim, Stage, StageError};

use super::types::ScenePath;

/// Forwarding gives up after this many hops through prototypes.
///
/// The hop count is bounded by the authored instancing nesting depth, so any
/// real scene sits far below this; reaching it means the acyclicity
/// invariant on prototype graphs does not hold.
pub const MAX_FORWARDING_DEPTH: usize = 64;

/// Internal-consistency failures from resolution and uninstancing.
///
/// None of these represent ordinary absence (that is `Ok(None)`); they
/// signal a defect in the scene-graph engine or violated invariants, and
/// must not be retried.
#[derive(Debug, Error)]
pub enum ForwardingError {
    /// An instance prim reported no prototype root.
    #[error("instance at {path} has no prototype root")]
    MissingPrototype {
        /// The instance prim's path
        path: ScenePath,
    },

    /// The anchor stopped prefixing the requested path.
    ///
    /// The anchor is derived from the requested path by parent steps, so a
    /// mismatch can only mean corrupted state.
    #[error("anchor {anchor} is not a prefix of {path}")]
    AnchorMismatch {
        /// The path being resolved
        path: ScenePath,
        /// The anchor that failed to prefix it
        anchor: ScenePath,
    },

    /// An anchor that resolution proved instanceable no longer is.
    #[error("expected an instance at {path}")]
    AnchorNotInstance {
        /// The anchor prim's path
        path: ScenePath,
    },

    /// The walk exceeded its depth cap; the prototype graph is probably
    /// cyclic.
    #[error("forwarding for {path} exceeded {depth} hops; cyclic prototype graph?")]
    DepthExceeded {
        /// The path that was being resolved
        path: ScenePath,
        /// The cap that was hit
        depth: usize,
    },

    /// The stage rejected an operation.
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Find the nearest ancestor of `path` at which a prim currently exists.
///
/// Returns the anchor path and its prim, or `None` when the walk reaches
/// the root without a hit. The pseudo-root counts as a hit; callers filter
/// it out with [`ScenePath::is_prim_path`].
pub(crate) fn nearest_existing_ancestor<S: Stage>(
    stage: &S,
    path: &ScenePath,
) -> Option<(ScenePath, S::Prim)> {
    let mut anchor = path.clone();
    loop {
        anchor = anchor.parent()?;
        if let Some(prim) = stage.prim_at_path(&anchor) {
            return Some((anchor, prim));
        }
        if anchor.is_absolute_root() {
            return None;
        }
    }
}

/// Resolve `path` to a prim, forwarding through instancing as needed.
///
/// Returns the prim composed directly at `path` when one exists. Otherwise,
/// if `path` lives inside an instance, returns the prim at the equivalent
/// path inside the shared prototype, recursing through nested instancing.
///
/// `Ok(None)` means nothing anywhere, including inside any reachable
/// prototype, answers to `path`.
///
/// # Errors
///
/// Returns a [`ForwardingError`] only for internal-consistency failures;
/// see the error type for the taxonomy.
///
/// # Example
///
/// ```
/// use stagewalk::core::resolve::prim_at_path_with_forwarding;
/// use stagewalk::core::types::ScenePath;
/// use stagewalk::stage::{MemoryStage, Prim, Specifier};
///
/// let mut stage = MemoryStage::new();
/// stage.define_prototype("/__Prototype_1").unwrap();
/// stage.define_prim("/__Prototype_1/Table", Specifier::Def).unwrap();
/// stage.make_instance("/World/Set", "/__Prototype_1").unwrap();
///
/// let table = ScenePath::new("/World/Set/Table").unwrap();
/// let prim = prim_at_path_with_forwarding(&stage, &table).unwrap().unwrap();
/// assert_eq!(prim.path().as_str(), "/__Prototype_1/Table");
/// ```
pub fn prim_at_path_with_forwarding<S: Stage>(
    stage: &S,
    path: &ScenePath,
) -> Result<Option<S::Prim>, ForwardingError> {
    let mut current = path.clone();
    for _ in 0..MAX_FORWARDING_DEPTH {
        if let Some(prim) = stage.prim_at_path(&current) {
            return Ok(Some(prim));
        }

        let Some((anchor_path, anchor)) = nearest_existing_ancestor(stage, &current) else {
            return Ok(None);
        };
        if !anchor_path.is_prim_path() {
            // The walk degenerated to the pseudo-root.
            return Ok(None);
        }
        if !anchor.is_instance() {
            // Nothing to forward through.
            return Ok(None);
        }

        let Some(prototype) = anchor.prototype_root() else {
            return Err(ForwardingError::MissingPrototype { path: anchor_path });
        };
        let Some(candidate) = current.replace_prefix(&anchor_path, &prototype) else {
            return Err(ForwardingError::AnchorMismatch {
                path: current,
                anchor: anchor_path,
            });
        };
        tracing::debug!(from = %current, to = %candidate, "forwarding through instance");
        current = candidate;
    }
    Err(ForwardingError::DepthExceeded {
        path: path.clone(),
        depth: MAX_FORWARDING_DEPTH,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::stage::{MemoryStage, Specifier};

    fn p(s: &str) -> ScenePath {
        ScenePath::new(s).unwrap()
    }

    fn fixture() -> MemoryStage {
        let mut stage = MemoryStage::new();
        stage.define_prototype("/__Prototype_1").unwrap();
        stage
            .define_prim("/__Prototype_1/Table", Specifier::Def)
            .unwrap();
        stage.make_instance("/World/Set", "/__Prototype_1").unwrap();
        stage
    }

    #[test]
    fn direct_prims_resolve_without_forwarding() {
        let stage = fixture();
        let prim = prim_at_path_with_forwarding(&stage, &p("/World/Set"))
            .unwrap()
            .unwrap();
        assert_eq!(prim.path(), &p("/World/Set"));
    }

    #[test]
    fn forwards_into_prototype() {
        let stage = fixture();
        let prim = prim_at_path_with_forwarding(&stage, &p("/World/Set/Table"))
            .unwrap()
            .unwrap();
        assert_eq!(prim.path(), &p("/__Prototype_1/Table"));
    }

    #[test]
    fn absent_everywhere_is_none() {
        let stage = fixture();
        assert!(prim_at_path_with_forwarding(&stage, &p("/World/Missing"))
            .unwrap()
            .is_none());
        // Present anchor, missing inside the prototype.
        assert!(prim_at_path_with_forwarding(&stage, &p("/World/Set/Chair"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn non_instance_anchor_is_none() {
        let mut stage = fixture();
        stage.define_prim("/World/Props", Specifier::Def).unwrap();
        assert!(prim_at_path_with_forwarding(&stage, &p("/World/Props/Cup"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn cyclic_prototypes_hit_the_depth_cap() {
        let mut stage = MemoryStage::new();
        stage.define_prototype("/__Prototype_1").unwrap();
        stage.define_prototype("/__Prototype_2").unwrap();
        stage
            .make_instance("/__Prototype_1", "/__Prototype_2")
            .unwrap();
        stage
            .make_instance("/__Prototype_2", "/__Prototype_1")
            .unwrap();

        let err = prim_at_path_with_forwarding(&stage, &p("/__Prototype_1/X")).unwrap_err();
        assert!(matches!(err, ForwardingError::DepthExceeded { .. }));
    }

    /// A stage whose single prim claims to be an instance but carries no
    /// prototype binding: the corruption case the resolver must report.
    struct CorruptStage {
        prim_path: ScenePath,
        custom_data: Map<String, serde_json::Value>,
    }

    #[derive(Debug)]
    struct CorruptPrim {
        path: ScenePath,
        custom_data: Map<String, serde_json::Value>,
    }

    impl Prim for CorruptPrim {
        fn path(&self) -> &ScenePath {
            &self.path
        }
        fn specifier(&self) -> Specifier {
            Specifier::Def
        }
        fn is_instance(&self) -> bool {
            true
        }
        fn prototype_root(&self) -> Option<ScenePath> {
            None
        }
        fn custom_data(&self) -> &Map<String, serde_json::Value> {
            &self.custom_data
        }
    }

    impl Stage for CorruptStage {
        type Prim = CorruptPrim;

        fn prim_at_path(&self, path: &ScenePath) -> Option<CorruptPrim> {
            (path == &self.prim_path).then(|| CorruptPrim {
                path: path.clone(),
                custom_data: self.custom_data.clone(),
            })
        }

        fn root_prims(&self) -> Vec<CorruptPrim> {
            Vec::new()
        }

        fn default_prim_name(&self) -> Option<String> {
            None
        }

        fn identifier(&self) -> Option<String> {
            None
        }

        fn set_instanceable(&mut self, path: &ScenePath, _: bool) -> Result<(), StageError> {
            Err(StageError::PrimNotFound { path: path.clone() })
        }
    }

    #[test]
    fn instance_without_prototype_is_an_error_not_absence() {
        let stage = CorruptStage {
            prim_path: p("/World"),
            custom_data: Map::new(),
        };
        let err = prim_at_path_with_forwarding(&stage, &p("/World/Child")).unwrap_err();
        assert!(matches!(err, ForwardingError::MissingPrototype { .. }));
    }
}
