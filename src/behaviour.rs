//! Frame-tick component classification.
//!
//! A class participates in per-frame execution in one of two ways: by
//! deriving (possibly through several in-file bases) from
//! `UnityEngine.MonoBehaviour`, whose engine-driven callbacks run every
//! frame, or by implementing the `IMoreLoopBehaviour` marker interface, whose
//! custom-loop callbacks are driven by a script-side scheduler. The two kinds
//! are independent: a class can qualify for both, and each kind carries its
//! own fixed catalog of frame-tick method names.
//!
//! One-shot setup callbacks (`Awake`, `Start`, `OnEnable`, ...) are
//! deliberately absent from both catalogs; allocation inside them is not
//! per-frame waste.

use std::collections::HashSet;

use crate::semantic::{ClassDecl, MethodDecl, ScriptModel, MAX_ANCESTOR_DEPTH};
use crate::type_classifier::simple_type_name;

pub const ROOT_COMPONENT_NAMESPACE: &str = "UnityEngine";
pub const ROOT_COMPONENT_NAME: &str = "MonoBehaviour";

/// Marker interface tagging custom-loop components. Matched by name only;
/// it has no members to resolve.
pub const CUSTOM_LOOP_MARKER_INTERFACE: &str = "IMoreLoopBehaviour";

/// Engine-driven per-frame callbacks. Sorted for binary search.
pub const ENGINE_FRAME_METHODS: &[&str] = &["FixedUpdate", "LateUpdate", "OnGUI", "Update"];

/// Custom-loop per-frame callbacks. Sorted for binary search.
pub const CUSTOM_LOOP_FRAME_METHODS: &[&str] = &[
    "MoreFixedUpdate",
    "MoreLateUpdate",
    "MoreLateUpdate2",
    "MoreSlowFixedUpdate",
    "MoreUpdate",
    "MoreUpdate2",
    "MoreUpdate3",
];

/// Classification of one class declaration against the frame-tick catalogs.
pub struct BehaviourInfo<'m, 'a> {
    model: &'m ScriptModel<'a>,
    class_idx: usize,
    is_engine_behaviour: bool,
    is_custom_loop: bool,
}

impl<'m, 'a> BehaviourInfo<'m, 'a> {
    pub fn new(model: &'m ScriptModel<'a>, class_idx: usize) -> Self {
        Self {
            model,
            class_idx,
            is_engine_behaviour: derives_from_root(model, class_idx),
            is_custom_loop: implements_marker(model, class_idx),
        }
    }

    pub fn class(&self) -> &'m ClassDecl<'a> {
        self.model.class(self.class_idx)
    }

    /// Whether the ancestor chain reaches `UnityEngine.MonoBehaviour`.
    pub fn is_engine_behaviour(&self) -> bool {
        self.is_engine_behaviour
    }

    /// Whether the transitive interface set contains the custom-loop marker.
    pub fn is_custom_loop_behaviour(&self) -> bool {
        self.is_custom_loop
    }

    /// Methods declared directly on the class whose names fall in a catalog
    /// applicable to its kind(s), in declaration order. Each method appears
    /// at most once even if the catalogs were ever to overlap.
    pub fn frame_tick_methods(&self) -> Vec<&'m MethodDecl<'a>> {
        self.class()
            .methods
            .iter()
            .filter(|m| {
                (self.is_engine_behaviour
                    && ENGINE_FRAME_METHODS.binary_search(&m.name.as_str()).is_ok())
                    || (self.is_custom_loop
                        && CUSTOM_LOOP_FRAME_METHODS
                            .binary_search(&m.name.as_str())
                            .is_ok())
            })
            .collect()
    }
}

/// Whether a base-list entry names the well-known root component type.
///
/// The qualified form `UnityEngine.MonoBehaviour` always matches; the bare
/// name only counts when the file imports the `UnityEngine` namespace, which
/// is the namespace test the resolver can perform within a single unit.
fn is_root_type_entry(model: &ScriptModel<'_>, entry: &str) -> bool {
    let trimmed = entry.trim();
    if trimmed == format!("{ROOT_COMPONENT_NAMESPACE}.{ROOT_COMPONENT_NAME}") {
        return true;
    }
    trimmed == ROOT_COMPONENT_NAME && model.has_using(ROOT_COMPONENT_NAMESPACE)
}

/// Iterative ancestor-chain walk: true if any link's base list names the
/// root component type. The chain follows in-unit base classes only; an
/// unresolvable base ends the walk (fail-open false).
fn derives_from_root(model: &ScriptModel<'_>, class_idx: usize) -> bool {
    let mut seen = HashSet::from([class_idx]);
    let mut cur = class_idx;

    for _ in 0..MAX_ANCESTOR_DEPTH {
        let class = model.class(cur);
        if class
            .base_types
            .iter()
            .any(|entry| is_root_type_entry(model, entry))
        {
            return true;
        }
        match model.in_unit_base(cur) {
            Some(next) if seen.insert(next) => cur = next,
            _ => return false,
        }
    }

    false
}

/// Transitively collected interface names: direct base-list entries of the
/// class and its in-unit ancestors, expanded through in-unit interface
/// inheritance. External entries that are really base classes can land in
/// this set; that is harmless because membership is only ever tested against
/// the marker interface name.
fn transitive_interfaces(model: &ScriptModel<'_>, class_idx: usize) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut pending: Vec<String> = Vec::new();

    for idx in std::iter::once(class_idx).chain(model.ancestor_chain(class_idx)) {
        let class = model.class(idx);
        let in_unit_base = model.in_unit_base(idx);
        for entry in &class.base_types {
            let name = simple_type_name(entry);
            if is_root_type_entry(model, entry) {
                continue;
            }
            if in_unit_base.is_some_and(|b| model.class(b).name == name) {
                continue;
            }
            pending.push(name.to_string());
        }
    }

    while let Some(name) = pending.pop() {
        if !out.insert(name.clone()) {
            continue;
        }
        if let Some(interface) = model.interface_named(&name) {
            for base in &interface.bases {
                pending.push(simple_type_name(base).to_string());
            }
        }
    }

    out
}

fn implements_marker(model: &ScriptModel<'_>, class_idx: usize) -> bool {
    transitive_interfaces(model, class_idx).contains(CUSTOM_LOOP_MARKER_INTERFACE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::semantic::ScriptModel;

    fn with_info<R>(source: &str, class: &str, f: impl FnOnce(&BehaviourInfo<'_, '_>) -> R) -> R {
        let tree = parse_source(source).expect("parse should succeed");
        let model = ScriptModel::build(tree.root_node(), source);
        let idx = model.class_named(class).expect("class under test");
        f(&BehaviourInfo::new(&model, idx))
    }

    #[test]
    fn direct_monobehaviour_is_engine_driven() {
        let src = r#"
using UnityEngine;

class C : MonoBehaviour
{
    void Update() { }
    void Awake() { }
}
"#;
        with_info(src, "C", |info| {
            assert!(info.is_engine_behaviour());
            assert!(!info.is_custom_loop_behaviour());
            let names: Vec<&str> = info
                .frame_tick_methods()
                .iter()
                .map(|m| m.name.as_str())
                .collect();
            assert_eq!(names, vec!["Update"]);
        });
    }

    #[test]
    fn multi_level_inheritance_reaches_root() {
        let src = r#"
using UnityEngine;

class Base : MonoBehaviour { }
class Mid : Base { }
class Leaf : Mid
{
    void LateUpdate() { }
}
"#;
        with_info(src, "Leaf", |info| {
            assert!(info.is_engine_behaviour());
            assert_eq!(info.frame_tick_methods().len(), 1);
        });
    }

    #[test]
    fn qualified_root_matches_without_using() {
        let src = r#"
class C : UnityEngine.MonoBehaviour
{
    void Update() { }
}
"#;
        with_info(src, "C", |info| {
            assert!(info.is_engine_behaviour());
        });
    }

    #[test]
    fn bare_root_without_using_is_not_engine_driven() {
        let src = r#"
class C : MonoBehaviour
{
    void Update() { }
}
"#;
        with_info(src, "C", |info| {
            assert!(!info.is_engine_behaviour());
            assert!(info.frame_tick_methods().is_empty());
        });
    }

    #[test]
    fn marker_interface_makes_custom_loop() {
        let src = r#"
interface IMoreLoopBehaviour { }

class C : IMoreLoopBehaviour
{
    void MoreUpdate() { }
    void Update() { }
}
"#;
        with_info(src, "C", |info| {
            assert!(!info.is_engine_behaviour());
            assert!(info.is_custom_loop_behaviour());
            let names: Vec<&str> = info
                .frame_tick_methods()
                .iter()
                .map(|m| m.name.as_str())
                .collect();
            // Update belongs to the engine catalog only; this class is not
            // engine-driven, so it must not be yielded.
            assert_eq!(names, vec!["MoreUpdate"]);
        });
    }

    #[test]
    fn marker_inherited_through_base_class_counts() {
        let src = r#"
using UnityEngine;

class Base : MonoBehaviour, IMoreLoopBehaviour { }
class C : Base
{
    void Update() { }
    void MoreLateUpdate() { }
}
"#;
        with_info(src, "C", |info| {
            assert!(info.is_engine_behaviour());
            assert!(info.is_custom_loop_behaviour());
            let names: Vec<&str> = info
                .frame_tick_methods()
                .iter()
                .map(|m| m.name.as_str())
                .collect();
            assert_eq!(names, vec!["Update", "MoreLateUpdate"]);
        });
    }

    #[test]
    fn marker_inherited_through_interface_inheritance_counts() {
        let src = r#"
interface IMoreLoopBehaviour { }
interface IFancyLoop : IMoreLoopBehaviour { }

class C : IFancyLoop
{
    void MoreUpdate2() { }
}
"#;
        with_info(src, "C", |info| {
            assert!(info.is_custom_loop_behaviour());
            assert_eq!(info.frame_tick_methods().len(), 1);
        });
    }

    #[test]
    fn unrelated_class_yields_no_frame_tick_methods() {
        let src = r#"
class Plain
{
    void Update() { }
    void MoreUpdate() { }
}
"#;
        with_info(src, "Plain", |info| {
            assert!(!info.is_engine_behaviour());
            assert!(!info.is_custom_loop_behaviour());
            assert!(info.frame_tick_methods().is_empty());
        });
    }

    #[test]
    fn catalogs_are_sorted_and_disjoint() {
        let mut engine = ENGINE_FRAME_METHODS.to_vec();
        engine.sort_unstable();
        assert_eq!(engine, ENGINE_FRAME_METHODS);

        let mut custom = CUSTOM_LOOP_FRAME_METHODS.to_vec();
        custom.sort_unstable();
        assert_eq!(custom, CUSTOM_LOOP_FRAME_METHODS);

        assert!(
            ENGINE_FRAME_METHODS
                .iter()
                .all(|m| !CUSTOM_LOOP_FRAME_METHODS.contains(m))
        );
    }
}
