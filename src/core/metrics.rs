//! core::metrics
//!
//! Stage-level orientation heuristics.

use serde_json::Value;

use crate::stage::{Prim, Specifier, Stage};

/// Custom-data key marking a camera hierarchy as Z-up.
pub const Z_UP_KEY: &str = "zUp";

/// Whether the stage's cameras are authored Z-up.
///
/// Scans the defined, non-abstract root prims for a boolean `zUp`
/// custom-data entry. Any explicit `false` wins immediately (one Y-up prim
/// trumps everything); otherwise any explicit `true` makes the stage Z-up.
/// Non-boolean entries are logged and skipped. With no entries at all, the
/// convention is Y-up.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagewalk::core::metrics::cameras_are_z_up;
/// use stagewalk::stage::{MemoryStage, Specifier};
///
/// let mut stage = MemoryStage::new();
/// let world = stage.define_prim("/World", Specifier::Def).unwrap();
/// stage.set_custom_data(&world, "zUp", json!(true)).unwrap();
///
/// assert!(cameras_are_z_up(&stage));
/// ```
pub fn cameras_are_z_up<S: Stage>(stage: &S) -> bool {
    let mut has_z_up = false;
    for prim in stage.root_prims() {
        if prim.specifier() != Specifier::Def {
            continue;
        }
        match prim.custom_data().get(Z_UP_KEY) {
            None => {}
            Some(Value::Bool(true)) => has_z_up = true,
            Some(Value::Bool(false)) => return false,
            Some(other) => {
                tracing::warn!(
                    path = %prim.path(),
                    value = %other,
                    "non-boolean 'zUp' custom data; skipping"
                );
            }
        }
    }
    has_z_up
}
