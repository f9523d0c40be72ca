//! Integration tests for forwarding resolution.
//!
//! These tests exercise the resolver against in-memory stages built with
//! nested and sibling instancing, covering the behaviors path-based tooling
//! depends on.

use stagewalk::core::resolve::{prim_at_path_with_forwarding, ForwardingError};
use stagewalk::core::types::ScenePath;
use stagewalk::stage::{MemoryStage, Prim, Specifier, Stage};

// =============================================================================
// Test Helpers
// =============================================================================

fn p(s: &str) -> ScenePath {
    ScenePath::new(s).expect("valid path")
}

/// `/World/Set` instances `/__Prototype_1`, which holds `Table/Leg`.
fn single_level_stage() -> MemoryStage {
    let mut stage = MemoryStage::new();
    stage.define_prototype("/__Prototype_1").unwrap();
    stage
        .define_prim("/__Prototype_1/Table/Leg", Specifier::Def)
        .unwrap();
    stage.make_instance("/World/Set", "/__Prototype_1").unwrap();
    stage
}

/// Nested instancing: `/World/Set` instances `/__Prototype_1`, whose `Inner`
/// child instances `/__Prototype_2`, which holds `Leaf`.
fn nested_stage() -> MemoryStage {
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
    stage
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn non_instanced_paths_match_direct_lookup() {
    let mut stage = MemoryStage::new();
    stage
        .define_prim("/World/Props/Cup", Specifier::Def)
        .unwrap();

    for path in ["/World", "/World/Props", "/World/Props/Cup"] {
        let direct = stage.prim_at_path(&p(path)).unwrap();
        let resolved = prim_at_path_with_forwarding(&stage, &p(path))
            .unwrap()
            .unwrap();
        assert_eq!(direct.path(), resolved.path());
    }
}

#[test]
fn forwards_into_the_shared_prototype() {
    // /World/Set instanceable with prototype /__Prototype_1;
    // /__Prototype_1/Table exists directly.
    let stage = single_level_stage();
    let prim = prim_at_path_with_forwarding(&stage, &p("/World/Set/Table"))
        .unwrap()
        .unwrap();
    assert_eq!(prim.path(), &p("/__Prototype_1/Table"));
}

#[test]
fn forwards_deep_paths_below_the_instance() {
    let stage = single_level_stage();
    let prim = prim_at_path_with_forwarding(&stage, &p("/World/Set/Table/Leg"))
        .unwrap()
        .unwrap();
    assert_eq!(prim.path(), &p("/__Prototype_1/Table/Leg"));
}

#[test]
fn nested_instancing_forwards_twice() {
    let stage = nested_stage();
    let prim = prim_at_path_with_forwarding(&stage, &p("/World/Set/Inner/Leaf"))
        .unwrap()
        .unwrap();
    // Two hops: /World/Set -> /__Prototype_1, then its Inner instance ->
    // /__Prototype_2.
    assert_eq!(prim.path(), &p("/__Prototype_2/Leaf"));
}

#[test]
fn sibling_instances_share_one_prototype() {
    let mut stage = single_level_stage();
    stage
        .make_instance("/World/SetB", "/__Prototype_1")
        .unwrap();

    let a = prim_at_path_with_forwarding(&stage, &p("/World/Set/Table"))
        .unwrap()
        .unwrap();
    let b = prim_at_path_with_forwarding(&stage, &p("/World/SetB/Table"))
        .unwrap()
        .unwrap();
    assert_eq!(a.path(), b.path());
}

// =============================================================================
// Absence
// =============================================================================

#[test]
fn missing_paths_resolve_to_none() {
    let stage = single_level_stage();
    // No prim, no instanced ancestor.
    assert!(prim_at_path_with_forwarding(&stage, &p("/World/Missing"))
        .unwrap()
        .is_none());
    // Instanced ancestor, but the prototype has no such child.
    assert!(prim_at_path_with_forwarding(&stage, &p("/World/Set/Chair"))
        .unwrap()
        .is_none());
    // Missing below a path that itself only exists through forwarding.
    assert!(
        prim_at_path_with_forwarding(&stage, &p("/World/Set/Table/Seat"))
            .unwrap()
            .is_none()
    );
}

#[test]
fn root_level_missing_paths_resolve_to_none() {
    let stage = single_level_stage();
    assert!(prim_at_path_with_forwarding(&stage, &p("/Elsewhere"))
        .unwrap()
        .is_none());
    assert!(
        prim_at_path_with_forwarding(&stage, &p("/Elsewhere/Deep/Down"))
            .unwrap()
            .is_none()
    );
}

#[test]
fn resolution_does_not_mutate() {
    let stage = single_level_stage();
    let before = stage.authored_prim_count();
    let _ = prim_at_path_with_forwarding(&stage, &p("/World/Set/Table")).unwrap();
    let _ = prim_at_path_with_forwarding(&stage, &p("/World/Missing")).unwrap();
    assert_eq!(stage.authored_prim_count(), before);
    assert!(stage.prim_at_path(&p("/World/Set")).unwrap().is_instance());
}

// =============================================================================
// Consistency failures
// =============================================================================

#[test]
fn prototype_cycles_are_reported_not_looped() {
    let mut stage = MemoryStage::new();
    stage.define_prototype("/__Prototype_1").unwrap();
    stage.define_prototype("/__Prototype_2").unwrap();
    stage
        .make_instance("/__Prototype_1", "/__Prototype_2")
        .unwrap();
    stage
        .make_instance("/__Prototype_2", "/__Prototype_1")
        .unwrap();
    stage.make_instance("/World/Rig", "/__Prototype_1").unwrap();

    let err = prim_at_path_with_forwarding(&stage, &p("/World/Rig/Arm")).unwrap_err();
    match err {
        ForwardingError::DepthExceeded { path, .. } => assert_eq!(path, p("/World/Rig/Arm")),
        other => panic!("expected DepthExceeded, got {other}"),
    }
}
