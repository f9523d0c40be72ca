//! core::naming
//!
//! Pipeline naming conventions.
//!
//! # Features
//!
//! - Derive the companion alpha attribute name for a color attribute
//! - Name the primary UV set geometry tooling reads and writes
//! - Choose a model name for a stage through layered fallbacks

use std::path::Path;

use crate::stage::{Prim, Specifier, Stage};

use super::types::ScenePath;

/// Derive the companion alpha attribute name for a color attribute.
///
/// The pipeline convention pairs `<name>` with `<name>_A`.
///
/// # Example
///
/// ```
/// use stagewalk::core::naming::alpha_attribute_name_for_color;
///
/// assert_eq!(alpha_attribute_name_for_color("displayColor"), "displayColor_A");
/// ```
pub fn alpha_attribute_name_for_color(color_attr_name: &str) -> String {
    format!("{color_attr_name}_A")
}

/// The name of the primary UV set.
///
/// Geometry tooling reads and writes texture coordinates under this name
/// unless told otherwise.
///
/// # Example
///
/// ```
/// use stagewalk::core::naming::primary_uv_set_name;
///
/// assert_eq!(primary_uv_set_name(), "st");
/// ```
pub fn primary_uv_set_name() -> &'static str {
    "st"
}

/// Choose a model name for a stage.
///
/// Fallback chain:
/// 1. The stage's default prim name, when authored
/// 2. The stem of the stage identifier (the part of the file name before
///    the first `.`), when a root prim of that name exists
/// 3. The name of the first non-class root prim, in path order
/// 4. The identifier stem again, matching root prim or not
///
/// Returns `None` only when the stage has neither a usable identifier nor
/// any of the above.
///
/// # Example
///
/// ```
/// use stagewalk::core::naming::model_name;
/// use stagewalk::stage::{MemoryStage, Specifier};
///
/// let mut stage = MemoryStage::new();
/// stage.set_identifier("/shows/demo/Teapot.scene.json");
/// stage.define_prim("/Teapot", Specifier::Def).unwrap();
///
/// assert_eq!(model_name(&stage), Some("Teapot".to_string()));
/// ```
pub fn model_name<S: Stage>(stage: &S) -> Option<String> {
    if let Some(name) = stage.default_prim_name() {
        if !name.is_empty() {
            return Some(name);
        }
    }

    let stem = stage
        .identifier()
        .and_then(|identifier| identifier_stem(&identifier).map(str::to_owned));

    if let Some(stem) = &stem {
        // Prefer the file name when the stage actually has a root prim by
        // that name.
        if let Ok(path) = ScenePath::absolute_root().append_child(stem) {
            if stage.prim_at_path(&path).is_some() {
                return Some(stem.clone());
            }
        }
    }

    if let Some(name) = stage
        .root_prims()
        .into_iter()
        .find(|prim| prim.specifier() != Specifier::Class)
        .and_then(|prim| prim.path().name().map(str::to_owned))
    {
        return Some(name);
    }

    stem
}

/// The base name of an identifier up to its first `.`.
fn identifier_stem(identifier: &str) -> Option<&str> {
    let base = Path::new(identifier).file_name()?.to_str()?;
    let stem = base.split('.').next().unwrap_or(base);
    (!stem.is_empty()).then_some(stem)
}
