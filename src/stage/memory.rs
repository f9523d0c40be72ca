//! stage::memory
//!
//! An in-memory scene graph implementing the [`Stage`] interface.
//!
//! # Scope
//!
//! `MemoryStage` is a deliberately small composition engine: prims are
//! authored flat, keyed by path, and prototype subtrees are authored
//! directly under their synthetic roots (e.g. `/__Prototype_1/Table`).
//! It supports exactly the semantics the resolver depends on:
//!
//! - Descendants of an *active* instance are hidden from direct lookup
//! - Once a prim's instanceable flag is cleared, its subtree composes from
//!   the bound prototype and becomes directly addressable
//! - Clearing the flag on a prim that itself composes from a prototype
//!   (nested instancing) authors an override for that location only; the
//!   shared prototype content is never modified
//!
//! It is suitable for embedding and tests, not a replacement for a full
//! composition engine: there are no layers, no variants, no payloads.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::core::types::{PathError, ScenePath};

use super::interface::{Prim, Specifier, Stage, StageError};

/// Composition gives up past this many hops; a stage authored with cyclic
/// prototype bindings would otherwise recurse forever.
const MAX_COMPOSE_DEPTH: usize = 128;

#[derive(Debug, Clone)]
struct PrimData {
    specifier: Specifier,
    instanceable: bool,
    prototype_root: Option<ScenePath>,
    custom_data: Map<String, Value>,
}

impl PrimData {
    fn new(specifier: Specifier) -> Self {
        Self {
            specifier,
            instanceable: false,
            prototype_root: None,
            custom_data: Map::new(),
        }
    }
}

/// A prim handle produced by [`MemoryStage`].
///
/// A snapshot of the composed prim at lookup time.
#[derive(Debug, Clone)]
pub struct MemoryPrim {
    path: ScenePath,
    specifier: Specifier,
    instanceable: bool,
    prototype_root: Option<ScenePath>,
    custom_data: Map<String, Value>,
}

impl Prim for MemoryPrim {
    fn path(&self) -> &ScenePath {
        &self.path
    }

    fn specifier(&self) -> Specifier {
        self.specifier
    }

    fn is_instance(&self) -> bool {
        self.instanceable
    }

    fn prototype_root(&self) -> Option<ScenePath> {
        self.prototype_root.clone()
    }

    fn custom_data(&self) -> &Map<String, Value> {
        &self.custom_data
    }
}

/// An in-memory scene graph.
///
/// # Example
///
/// ```
/// use stagewalk::core::types::ScenePath;
/// use stagewalk::stage::{MemoryStage, Specifier, Stage};
///
/// let mut stage = MemoryStage::new();
/// stage.define_prototype("/__Prototype_1").unwrap();
/// stage.define_prim("/__Prototype_1/Table", Specifier::Def).unwrap();
/// stage.make_instance("/World/Set", "/__Prototype_1").unwrap();
///
/// // The instance hides its descendants from direct lookup.
/// let table = ScenePath::new("/World/Set/Table").unwrap();
/// assert!(stage.prim_at_path(&table).is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStage {
    identifier: Option<String>,
    default_prim: Option<String>,
    prims: BTreeMap<ScenePath, PrimData>,
    prototypes: BTreeSet<ScenePath>,
    /// Instanceable opinions authored at composed (non-authored) locations,
    /// e.g. a nested instance exposed by uninstancing its outer instance.
    instanceable_overrides: BTreeMap<ScenePath, bool>,
}

impl MemoryStage {
    /// Create an empty stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stage identifier (typically a file path).
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = Some(identifier.into());
    }

    /// Set the default prim name.
    pub fn set_default_prim(&mut self, name: impl Into<String>) {
        self.default_prim = Some(name.into());
    }

    /// Author a prim at `path`, creating missing ancestors as `Def` prims.
    ///
    /// # Errors
    ///
    /// Returns `StageError::InvalidPath` for malformed paths or the
    /// absolute root.
    pub fn define_prim(
        &mut self,
        path: &str,
        specifier: Specifier,
    ) -> Result<ScenePath, StageError> {
        let path = ScenePath::new(path)?;
        if !path.is_prim_path() {
            return Err(StageError::InvalidPath(PathError::InvalidPath {
                path: path.as_str().to_string(),
                reason: "the absolute root cannot be authored".to_string(),
            }));
        }
        let mut ancestor = ScenePath::absolute_root();
        for component in path.components() {
            ancestor = ancestor.append_child(component)?;
            self.prims
                .entry(ancestor.clone())
                .or_insert_with(|| PrimData::new(Specifier::Def));
        }
        // The target prim takes the requested specifier even when an
        // ancestor-filling pass already created it.
        if let Some(data) = self.prims.get_mut(&path) {
            data.specifier = specifier;
        }
        Ok(path)
    }

    /// Author a prototype subtree root.
    ///
    /// Prototype roots live outside the scene namespace: they never show up
    /// in [`Stage::root_prims`] and are only reachable through instances or
    /// by explicit path.
    pub fn define_prototype(&mut self, path: &str) -> Result<ScenePath, StageError> {
        let path = self.define_prim(path, Specifier::Def)?;
        self.prototypes.insert(path.clone());
        Ok(path)
    }

    /// Author `path` as an instance of the prototype rooted at `prototype`.
    ///
    /// Defines the prim when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StageError::UnknownPrototype` when `prototype` has not been
    /// defined with [`MemoryStage::define_prototype`].
    pub fn make_instance(&mut self, path: &str, prototype: &str) -> Result<ScenePath, StageError> {
        let prototype = ScenePath::new(prototype)?;
        if !self.prototypes.contains(&prototype) {
            return Err(StageError::UnknownPrototype { path: prototype });
        }
        let path = self.define_prim(path, Specifier::Def)?;
        if let Some(data) = self.prims.get_mut(&path) {
            data.instanceable = true;
            data.prototype_root = Some(prototype);
        }
        Ok(path)
    }

    /// Author a custom-data entry on the prim at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StageError::PrimNotFound` when `path` has no authored prim.
    pub fn set_custom_data(
        &mut self,
        path: &ScenePath,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), StageError> {
        match self.prims.get_mut(path) {
            Some(data) => {
                data.custom_data.insert(key.into(), value);
                Ok(())
            }
            None => Err(StageError::PrimNotFound { path: path.clone() }),
        }
    }

    /// Number of authored prims (prototype content included).
    pub fn authored_prim_count(&self) -> usize {
        self.prims.len()
    }

    /// The effective instanceable opinion at a composed location.
    fn effective_instanceable(&self, path: &ScenePath, data: &PrimData) -> bool {
        self.instanceable_overrides
            .get(path)
            .copied()
            .unwrap_or(data.instanceable)
    }

    /// Compose the prim at `path`, following expanded prototype bindings.
    ///
    /// Returns the authored source record the location composes from. A
    /// location below an *active* instance does not compose; that is what
    /// forwarding is for.
    fn compose(&self, path: &ScenePath, depth: usize) -> Option<(ScenePath, &PrimData)> {
        if depth > MAX_COMPOSE_DEPTH {
            tracing::warn!(path = %path, "composition depth exceeded; cyclic prototype bindings?");
            return None;
        }
        if let Some(data) = self.prims.get(path) {
            return Some((path.clone(), data));
        }
        let parent = path.parent()?;
        if parent.is_absolute_root() {
            // Root-level prims are always authored directly.
            return None;
        }
        let (parent_source, parent_data) = self.compose(&parent, depth + 1)?;
        if self.effective_instanceable(&parent, parent_data) {
            // Active instances hide their descendants.
            return None;
        }
        let name = path.name()?;
        // An uninstanced prototype binding expands the bound subtree here;
        // otherwise a parent that itself composes from elsewhere carries its
        // whole subtree from that source.
        let candidate = if let Some(prototype) = parent_data.prototype_root.clone() {
            prototype.append_child(name).ok()?
        } else if parent_source != parent {
            parent_source.append_child(name).ok()?
        } else {
            return None;
        };
        self.compose(&candidate, depth + 1)
    }

    fn pseudo_root() -> MemoryPrim {
        MemoryPrim {
            path: ScenePath::absolute_root(),
            specifier: Specifier::Def,
            instanceable: false,
            prototype_root: None,
            custom_data: Map::new(),
        }
    }

    fn snapshot(&self, path: &ScenePath, data: &PrimData) -> MemoryPrim {
        MemoryPrim {
            path: path.clone(),
            specifier: data.specifier,
            instanceable: self.effective_instanceable(path, data),
            prototype_root: data.prototype_root.clone(),
            custom_data: data.custom_data.clone(),
        }
    }
}

impl Stage for MemoryStage {
    type Prim = MemoryPrim;

    fn prim_at_path(&self, path: &ScenePath) -> Option<MemoryPrim> {
        if path.is_absolute_root() {
            return Some(Self::pseudo_root());
        }
        let (_, data) = self.compose(path, 0)?;
        Some(self.snapshot(path, data))
    }

    fn root_prims(&self) -> Vec<MemoryPrim> {
        self.prims
            .iter()
            .filter(|(path, _)| path.depth() == 1 && !self.prototypes.contains(*path))
            .map(|(path, data)| self.snapshot(path, data))
            .collect()
    }

    fn default_prim_name(&self) -> Option<String> {
        self.default_prim.clone()
    }

    fn identifier(&self) -> Option<String> {
        self.identifier.clone()
    }

    fn set_instanceable(
        &mut self,
        path: &ScenePath,
        instanceable: bool,
    ) -> Result<(), StageError> {
        if self.prims.contains_key(path) {
            if let Some(data) = self.prims.get_mut(path) {
                data.instanceable = instanceable;
            }
            return Ok(());
        }
        // A composed-but-unauthored location (a nested instance exposed by
        // uninstancing) takes a local override; the prototype record that
        // backs it stays untouched.
        if self.compose(path, 0).is_some() {
            self.instanceable_overrides.insert(path.clone(), instanceable);
            return Ok(());
        }
        Err(StageError::PrimNotFound { path: path.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> ScenePath {
        ScenePath::new(s).unwrap()
    }

    fn instanced_stage() -> MemoryStage {
        let mut stage = MemoryStage::new();
        stage.define_prototype("/__Prototype_1").unwrap();
        stage
            .define_prim("/__Prototype_1/Table", Specifier::Def)
            .unwrap();
        stage.make_instance("/World/Set", "/__Prototype_1").unwrap();
        stage
    }

    #[test]
    fn direct_lookup_finds_authored_prims() {
        let stage = instanced_stage();
        assert!(stage.prim_at_path(&p("/World")).is_some());
        assert!(stage.prim_at_path(&p("/World/Set")).is_some());
        assert!(stage.prim_at_path(&p("/__Prototype_1/Table")).is_some());
    }

    #[test]
    fn root_lookup_yields_pseudo_root() {
        let stage = instanced_stage();
        let root = stage.prim_at_path(&ScenePath::absolute_root()).unwrap();
        assert!(!root.is_instance());
        assert!(!root.path().is_prim_path());
    }

    #[test]
    fn active_instance_hides_descendants() {
        let stage = instanced_stage();
        assert!(stage.prim_at_path(&p("/World/Set/Table")).is_none());
    }

    #[test]
    fn cleared_flag_exposes_prototype_content() {
        let mut stage = instanced_stage();
        stage.set_instanceable(&p("/World/Set"), false).unwrap();
        let table = stage.prim_at_path(&p("/World/Set/Table")).unwrap();
        assert_eq!(table.path(), &p("/World/Set/Table"));
        assert!(!table.is_instance());
    }

    #[test]
    fn cleared_flag_exposes_deep_prototype_content() {
        let mut stage = MemoryStage::new();
        stage.define_prototype("/__Prototype_1").unwrap();
        stage
            .define_prim("/__Prototype_1/Table/Leg", Specifier::Def)
            .unwrap();
        stage.make_instance("/World/Set", "/__Prototype_1").unwrap();
        stage.set_instanceable(&p("/World/Set"), false).unwrap();

        // Every level of the expanded subtree is directly addressable, not
        // just the immediate children of the binding.
        let table = stage.prim_at_path(&p("/World/Set/Table")).unwrap();
        assert_eq!(table.path(), &p("/World/Set/Table"));
        let leg = stage.prim_at_path(&p("/World/Set/Table/Leg")).unwrap();
        assert_eq!(leg.path(), &p("/World/Set/Table/Leg"));
        assert!(!leg.is_instance());
    }

    #[test]
    fn override_on_composed_location_leaves_prototype_alone() {
        let mut stage = MemoryStage::new();
        stage.define_prototype("/__Prototype_2").unwrap();
        stage
            .define_prim("/__Prototype_2/Leaf", Specifier::Def)
            .unwrap();
        stage.define_prototype("/__Prototype_1").unwrap();
        stage
            .make_instance("/__Prototype_1/Inner", "/__Prototype_2")
            .unwrap();
        stage.make_instance("/World/Set", "/__Prototype_1").unwrap();

        stage.set_instanceable(&p("/World/Set"), false).unwrap();
        stage.set_instanceable(&p("/World/Set/Inner"), false).unwrap();

        // The exposed copy is uninstanced...
        let inner = stage.prim_at_path(&p("/World/Set/Inner")).unwrap();
        assert!(!inner.is_instance());
        // ...while the authored prototype record still is an instance.
        let authored = stage.prim_at_path(&p("/__Prototype_1/Inner")).unwrap();
        assert!(authored.is_instance());
    }

    #[test]
    fn set_instanceable_rejects_missing_paths() {
        let mut stage = instanced_stage();
        let err = stage.set_instanceable(&p("/Nowhere"), false).unwrap_err();
        assert!(matches!(err, StageError::PrimNotFound { .. }));
    }

    #[test]
    fn make_instance_requires_known_prototype() {
        let mut stage = MemoryStage::new();
        let err = stage
            .make_instance("/World/Set", "/__Prototype_9")
            .unwrap_err();
        assert!(matches!(err, StageError::UnknownPrototype { .. }));
    }

    #[test]
    fn root_prims_skip_prototypes() {
        let stage = instanced_stage();
        let roots: Vec<_> = stage
            .root_prims()
            .into_iter()
            .map(|prim| prim.path().as_str().to_string())
            .collect();
        assert_eq!(roots, vec!["/World"]);
    }

    #[test]
    fn define_prim_fills_ancestors() {
        let mut stage = MemoryStage::new();
        stage.define_prim("/A/B/C", Specifier::Over).unwrap();
        assert!(stage.prim_at_path(&p("/A")).is_some());
        assert!(stage.prim_at_path(&p("/A/B")).is_some());
        let leaf = stage.prim_at_path(&p("/A/B/C")).unwrap();
        assert_eq!(leaf.specifier(), Specifier::Over);
    }
}
