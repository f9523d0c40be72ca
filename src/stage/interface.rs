//! stage::interface
//!
//! The scene-graph access traits and their error taxonomy.
//!
//! # Error Handling
//!
//! Stage errors are categorized into typed variants:
//! - [`StageError::PrimNotFound`]: mutation targeted a path with no prim
//! - [`StageError::UnknownPrototype`]: an instance binding names a prototype
//!   the stage does not carry
//! - [`StageError::InvalidPath`]: a path failed validation at the boundary
//!
//! Absence during *lookup* is not an error; `prim_at_path` returns `Option`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{PathError, ScenePath};

/// Errors from stage operations.
#[derive(Debug, Error)]
pub enum StageError {
    /// Mutation targeted a path with no prim.
    #[error("no prim at path: {path}")]
    PrimNotFound {
        /// The path that was targeted
        path: ScenePath,
    },

    /// An instance binding names a prototype the stage does not carry.
    #[error("unknown prototype root: {path}")]
    UnknownPrototype {
        /// The prototype root that was named
        path: ScenePath,
    },

    /// A path failed validation at the stage boundary.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
}

/// How a prim was declared.
///
/// Mirrors the authoring specifiers of the composition engine: `Def` is a
/// concrete definition, `Over` a sparse override, `Class` an abstract
/// template that tooling generally skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specifier {
    Def,
    Over,
    Class,
}

/// A prim handle: one addressable element of the scene graph.
///
/// Handles are snapshots taken at lookup time. After a mutation, stale
/// handles must not be trusted; look the prim up again.
pub trait Prim {
    /// The path this handle was resolved at.
    fn path(&self) -> &ScenePath;

    /// The authoring specifier.
    fn specifier(&self) -> Specifier;

    /// Whether this prim is an active instance.
    ///
    /// An instance does not own its descendants; their content lives in the
    /// prototype subtree named by [`Prim::prototype_root`].
    fn is_instance(&self) -> bool;

    /// The prototype root this prim instances, when bound.
    ///
    /// Must be `Some` whenever [`Prim::is_instance`] is true; the resolver
    /// reports a violation as an internal-consistency failure.
    fn prototype_root(&self) -> Option<ScenePath>;

    /// Free-form custom data authored on the prim.
    fn custom_data(&self) -> &serde_json::Map<String, serde_json::Value>;
}

/// The scene-graph engine interface.
///
/// The graph is owned by the caller; operations borrow it for the duration
/// of a call and never retain it. Read-only resolution takes `&self` and may
/// run concurrently against an unchanging graph; `set_instanceable` takes
/// `&mut self` and therefore holds exclusive access for its duration.
pub trait Stage {
    /// The prim handle type this stage produces.
    type Prim: Prim;

    /// Direct, non-forwarding lookup.
    ///
    /// Returns `None` for paths with no composed prim, including paths that
    /// only exist "inside" an instance. The absolute root answers with the
    /// pseudo-root prim.
    fn prim_at_path(&self, path: &ScenePath) -> Option<Self::Prim>;

    /// The prims composed directly under the pseudo-root, in path order.
    ///
    /// Prototype subtrees are internal to the engine and are not listed.
    fn root_prims(&self) -> Vec<Self::Prim>;

    /// The stage's default prim name, when authored.
    fn default_prim_name(&self) -> Option<String>;

    /// The stage's identifier (typically the root document's file path).
    fn identifier(&self) -> Option<String>;

    /// Set the instanceable flag on the prim at `path`.
    ///
    /// This is authored state: the change persists and is visible to the
    /// very next lookup. It affects only this prim, never the shared
    /// prototype content.
    ///
    /// # Errors
    ///
    /// Returns `StageError::PrimNotFound` if no prim is composed at `path`.
    fn set_instanceable(&mut self, path: &ScenePath, instanceable: bool)
        -> Result<(), StageError>;
}
