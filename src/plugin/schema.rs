//! plugin::schema
//!
//! Plugin descriptor schema (v1).
//!
//! # Schema Design
//!
//! Descriptors are self-describing with `kind` and `schema_version`, and
//! strictly parsed at the document level (unknown fields rejected). The
//! variant-set entries inside a descriptor are parsed leniently: a
//! malformed entry is reported and skipped so one bad plugin cannot poison
//! the rest.
//!
//! # Example
//!
//! ```
//! use stagewalk::plugin::schema::{parse_descriptor, SelectionExportPolicy};
//!
//! let json = r#"{
//!     "kind": "stagewalk.plugin",
//!     "schema_version": 1,
//!     "name": "shotPipeline",
//!     "registered_variant_sets": {
//!         "standin": { "selection_export_policy": "never" },
//!         "modelingVariant": { "selection_export_policy": "ifAuthored" }
//!     }
//! }"#;
//!
//! let descriptor = parse_descriptor(json).unwrap();
//! let sets = descriptor.variant_sets();
//! assert_eq!(sets.len(), 2);
//! assert_eq!(sets[0].name, "modelingVariant");
//! assert_eq!(sets[0].selection_export_policy, SelectionExportPolicy::IfAuthored);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind identifier for plugin descriptors.
pub const DESCRIPTOR_KIND: &str = "stagewalk.plugin";

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from descriptor parsing.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to parse descriptor: {0}")]
    ParseError(String),

    #[error("invalid kind '{found}', expected '{}'", DESCRIPTOR_KIND)]
    InvalidKind { found: String },

    #[error("unsupported schema version {0}, supported: {SCHEMA_VERSION}")]
    UnsupportedVersion(u32),

    #[error("failed to read descriptor file: {0}")]
    Io(#[from] std::io::Error),
}

/// When a registered variant set's selection participates in export.
///
/// Serialized in lowerCamelCase: `never`, `ifAuthored`, `always`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionExportPolicy {
    /// The selection never participates in export.
    Never,
    /// The selection participates only when explicitly authored.
    IfAuthored,
    /// The selection always participates.
    Always,
}

/// A variant set a pipeline has registered interest in.
///
/// Ordered by name, so registries and sets of these stay deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RegisteredVariantSet {
    /// The variant-set name, e.g. `modelingVariant`.
    pub name: String,
    /// The export policy for selections on this set.
    pub selection_export_policy: SelectionExportPolicy,
}

/// The strictly-parsed body of a single variant-set entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VariantSetEntry {
    selection_export_policy: SelectionExportPolicy,
}

/// Envelope for version dispatch before full parsing.
#[derive(Debug, Deserialize)]
struct DescriptorEnvelope {
    kind: String,
    schema_version: u32,
}

/// A plugin descriptor document (v1).
///
/// Entry values are held as raw JSON so that one malformed entry degrades
/// to a warning instead of failing the whole document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginDescriptorV1 {
    /// Always [`DESCRIPTOR_KIND`].
    pub kind: String,

    /// Always [`SCHEMA_VERSION`].
    pub schema_version: u32,

    /// The plugin's name, used in diagnostics.
    pub name: String,

    /// Variant-set entries, keyed by variant-set name.
    #[serde(default)]
    pub registered_variant_sets: BTreeMap<String, serde_json::Value>,
}

impl PluginDescriptorV1 {
    /// The well-formed variant sets this descriptor registers.
    ///
    /// Malformed entries are logged (warn) and skipped, matching the
    /// pipeline convention that a bad plugin entry is a coding error in
    /// that plugin, not a reason to fail every caller.
    pub fn variant_sets(&self) -> Vec<RegisteredVariantSet> {
        let mut sets = Vec::new();
        for (name, value) in &self.registered_variant_sets {
            match serde_json::from_value::<VariantSetEntry>(value.clone()) {
                Ok(entry) => sets.push(RegisteredVariantSet {
                    name: name.clone(),
                    selection_export_policy: entry.selection_export_policy,
                }),
                Err(err) => {
                    tracing::warn!(
                        plugin = %self.name,
                        variant_set = %name,
                        error = %err,
                        "malformed variant-set entry; skipping"
                    );
                }
            }
        }
        sets
    }
}

/// Parse a descriptor document with version dispatch.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, the `kind` does not match
/// [`DESCRIPTOR_KIND`], or the `schema_version` is unsupported.
pub fn parse_descriptor(json: &str) -> Result<PluginDescriptorV1, PluginError> {
    let envelope: DescriptorEnvelope =
        serde_json::from_str(json).map_err(|e| PluginError::ParseError(e.to_string()))?;

    if envelope.kind != DESCRIPTOR_KIND {
        return Err(PluginError::InvalidKind {
            found: envelope.kind,
        });
    }

    match envelope.schema_version {
        1 => serde_json::from_str(json).map_err(|e| PluginError::ParseError(e.to_string())),
        other => Err(PluginError::UnsupportedVersion(other)),
    }
}
