//! Stagewalk - instance-aware path resolution for scene graphs
//!
//! Stagewalk resolves addressable locations inside a hierarchical scene graph
//! that supports instancing: a prim flagged instanceable does not own its
//! descendants directly but shares a single prototype subtree with every other
//! instance of that prototype. The crate makes that sharing transparent to
//! path-based tooling:
//!
//! - Forwarding resolution maps a path with no directly authored prim to the
//!   equivalent path inside the shared prototype, through arbitrarily nested
//!   instancing.
//! - Uninstancing disables instancing on the minimal chain of ancestors so a
//!   forwarded path becomes directly editable.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`core`] - Domain types and operations: paths, resolution, uninstancing,
//!   pipeline conventions
//! - [`stage`] - Single interface to the scene-graph engine, plus an
//!   in-memory implementation
//! - [`plugin`] - Declarative plugin metadata and the registered variant-set
//!   registry
//!
//! # Correctness Invariants
//!
//! Stagewalk maintains the following invariants:
//!
//! 1. Ordinary absence is `Ok(None)`; internal-consistency failures are
//!    typed errors and are never folded into absence
//! 2. Resolution is a pure read; the only graph state this crate mutates is
//!    the instanceable flag, and only through the uninstance operator
//! 3. All walks are explicit loops with depth caps, so a violated acyclicity
//!    invariant surfaces as a diagnosable error instead of unbounded growth

pub mod core;
pub mod plugin;
pub mod stage;
