//! core
//!
//! Core domain types and operations for Stagewalk.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ScenePath
//! - [`resolve`] - Forwarding resolution through instance prototypes
//! - [`uninstance`] - Making forwarded paths directly editable
//! - [`naming`] - Pipeline naming conventions
//! - [`metrics`] - Stage-level orientation heuristics
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Absence and internal-consistency failure are disjoint results
//! - All traversal is deterministic and bounded by graph depth

pub mod metrics;
pub mod naming;
pub mod resolve;
pub mod types;
pub mod uninstance;
