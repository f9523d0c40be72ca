//! stage
//!
//! Single interface to the scene-graph engine.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to the scene graph. All lookups and
//! the one mutation this crate performs (the instanceable flag) flow through
//! the [`Stage`] trait. Composition, layer storage, and prototype
//! construction belong to the engine behind the trait and are never
//! reimplemented elsewhere in the crate.
//!
//! # Responsibilities
//!
//! - Direct (non-forwarding) prim lookup by path
//! - Instance queries: instanceable flag, prototype root
//! - The instanceable-flag mutator
//! - Stage-level accessors: root prims, default prim, identifier
//!
//! # Invariants
//!
//! - `set_instanceable` takes `&mut self`: mutation demands exclusive access
//!   to the graph, while read-only resolution can share it
//! - An instance prim must report a valid prototype root; the resolver
//!   treats a violation as engine corruption, never as absence
//!
//! # Example
//!
//! ```
//! use stagewalk::stage::{MemoryStage, Prim, Specifier, Stage};
//! use stagewalk::core::types::ScenePath;
//!
//! let mut stage = MemoryStage::new();
//! stage.define_prim("/World", Specifier::Def).unwrap();
//! stage.define_prototype("/__Prototype_1").unwrap();
//! stage.make_instance("/World/Set", "/__Prototype_1").unwrap();
//!
//! let set = stage.prim_at_path(&ScenePath::new("/World/Set").unwrap()).unwrap();
//! assert!(set.is_instance());
//! ```

mod interface;
mod memory;

pub use interface::{Prim, Specifier, Stage, StageError};
pub use memory::{MemoryPrim, MemoryStage};
