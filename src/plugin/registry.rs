//! plugin::registry
//!
//! The registered variant-set registry and descriptor discovery.
//!
//! # Discovery
//!
//! Descriptor files (`*.json`) are read from a list of directories, in
//! order, files sorted by name within each directory. The process-wide
//! registry discovers from the directories named by
//! [`PLUGIN_PATH_ENV`], populated once on first access.
//!
//! # Error Handling
//!
//! Environment problems (unreadable directories or files) propagate as
//! [`PluginError::Io`]. Bad *content* does not: a descriptor that fails to
//! parse is reported and skipped, so one broken plugin never disables the
//! pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::schema::{parse_descriptor, PluginDescriptorV1, PluginError, RegisteredVariantSet};

/// Environment variable naming the descriptor search path.
///
/// Uses the platform's path-list separator (`:` on Unix).
pub const PLUGIN_PATH_ENV: &str = "STAGEWALK_PLUGIN_PATH";

/// The variant sets registered by a set of plugins, ordered by name.
///
/// When two plugins register the same variant-set name, the first
/// registration wins; later ones are reported and ignored.
#[derive(Debug, Default)]
pub struct VariantSetRegistry {
    sets: BTreeMap<String, RegisteredVariantSet>,
}

impl VariantSetRegistry {
    /// Build a registry from parsed descriptors.
    pub fn from_descriptors<'a, I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = &'a PluginDescriptorV1>,
    {
        let mut sets: BTreeMap<String, RegisteredVariantSet> = BTreeMap::new();
        for descriptor in descriptors {
            for set in descriptor.variant_sets() {
                if let Some(existing) = sets.get(&set.name) {
                    if *existing != set {
                        tracing::warn!(
                            plugin = %descriptor.name,
                            variant_set = %set.name,
                            "conflicting registration for variant set; keeping the first"
                        );
                    }
                    continue;
                }
                sets.insert(set.name.clone(), set);
            }
        }
        Self { sets }
    }

    /// Look up a registered variant set by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredVariantSet> {
        self.sets.get(name)
    }

    /// Iterate the registered variant sets in name order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredVariantSet> {
        self.sets.values()
    }

    /// Number of registered variant sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no variant sets are registered.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Read and parse every `*.json` descriptor under `dirs`.
///
/// Directories that do not exist are skipped. Descriptors that fail to
/// parse are reported and skipped.
///
/// # Errors
///
/// Returns `PluginError::Io` when an existing directory or file cannot be
/// read.
pub fn discover_descriptors(dirs: &[PathBuf]) -> Result<Vec<PluginDescriptorV1>, PluginError> {
    let mut descriptors = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "plugin directory absent; skipping");
            continue;
        }
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        for file in files {
            let json = std::fs::read_to_string(&file)?;
            match parse_descriptor(&json) {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(err) => {
                    tracing::warn!(
                        file = %file.display(),
                        error = %err,
                        "unparseable plugin descriptor; skipping"
                    );
                }
            }
        }
    }
    Ok(descriptors)
}

/// The descriptor search path from [`PLUGIN_PATH_ENV`].
pub fn search_dirs() -> Vec<PathBuf> {
    match std::env::var_os(PLUGIN_PATH_ENV) {
        Some(value) => std::env::split_paths(&value)
            .filter(|p| p != Path::new(""))
            .collect(),
        None => Vec::new(),
    }
}

/// The process-wide variant-set registry.
///
/// Populated once, on first access, from the descriptors discovered on
/// [`search_dirs`]. Discovery failures degrade to an empty registry with a
/// warning; callers needing stricter behavior should run
/// [`discover_descriptors`] themselves and build a
/// [`VariantSetRegistry`] directly.
pub fn registered_variant_sets() -> &'static VariantSetRegistry {
    static REGISTRY: OnceLock<VariantSetRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let dirs = search_dirs();
        match discover_descriptors(&dirs) {
            Ok(descriptors) => VariantSetRegistry::from_descriptors(descriptors.iter()),
            Err(err) => {
                tracing::warn!(error = %err, "plugin discovery failed; registry is empty");
                VariantSetRegistry::default()
            }
        }
    })
}
