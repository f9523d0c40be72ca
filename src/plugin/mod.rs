//! plugin
//!
//! Declarative plugin metadata and the registered variant-set registry.
//!
//! # Architecture
//!
//! Pipelines declare variant sets of interest in plugin descriptor
//! documents (JSON). Stagewalk parses those documents into
//! [`RegisteredVariantSet`] entries and aggregates them into a
//! [`VariantSetRegistry`], ordered by name. A process-wide registry can be
//! populated once from descriptor files discovered on a search path.
//!
//! # Schema Design
//!
//! - Self-describing: descriptors carry `kind` and `schema_version`
//! - Strict at the document level: unknown descriptor fields are rejected
//! - Lenient at the entry level: a malformed variant-set entry is reported
//!   and skipped, never fatal, so one bad plugin cannot take down the
//!   pipeline
//!
//! # Example
//!
//! ```
//! use stagewalk::plugin::{parse_descriptor, SelectionExportPolicy, VariantSetRegistry};
//!
//! let json = r#"{
//!     "kind": "stagewalk.plugin",
//!     "schema_version": 1,
//!     "name": "shotPipeline",
//!     "registered_variant_sets": {
//!         "modelingVariant": { "selection_export_policy": "always" }
//!     }
//! }"#;
//!
//! let descriptor = parse_descriptor(json).unwrap();
//! let registry = VariantSetRegistry::from_descriptors([&descriptor]);
//! let entry = registry.get("modelingVariant").unwrap();
//! assert_eq!(entry.selection_export_policy, SelectionExportPolicy::Always);
//! ```

pub mod registry;
pub mod schema;

pub use registry::{
    discover_descriptors, registered_variant_sets, search_dirs, VariantSetRegistry,
    PLUGIN_PATH_ENV,
};
pub use schema::{
    parse_descriptor, PluginDescriptorV1, PluginError, RegisteredVariantSet,
    SelectionExportPolicy, DESCRIPTOR_KIND, SCHEMA_VERSION,
};
