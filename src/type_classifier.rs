//! Delegate-type classification for C# type references.
//!
//! The analyzer only cares about one question per type reference: does this
//! name denote a delegate (callable) type? The answer combines the BCL and
//! UnityEngine delegate families, which are recognized by name, with
//! `delegate` declarations found in the linted file itself. Anything else,
//! including names we cannot resolve at all, is treated as not-a-delegate so
//! that analysis fails open.

use crate::semantic::ScriptModel;

/// Delegate families from the BCL and UnityEngine, matched on the simple
/// (unqualified, non-generic) type name. Sorted for binary search.
const WELL_KNOWN_DELEGATES: &[&str] = &[
    "Action",
    "Comparison",
    "Converter",
    "Delegate",
    "EventHandler",
    "Func",
    "MulticastDelegate",
    "Predicate",
    "UnityAction",
];

/// Reduce a type reference to its simple name: strip generic arguments,
/// namespace qualifiers, and nullable suffixes.
///
/// `System.EventHandler<MyArgs>?` becomes `EventHandler`.
pub fn simple_type_name(type_ref: &str) -> &str {
    let trimmed = type_ref.trim().trim_end_matches('?');
    let without_generics = match trimmed.find('<') {
        Some(pos) => &trimmed[..pos],
        None => trimmed,
    };
    match without_generics.rfind('.') {
        Some(pos) => without_generics[pos + 1..].trim(),
        None => without_generics.trim(),
    }
}

/// Whether a type reference denotes a delegate type, either a well-known
/// BCL/UnityEngine delegate or a `delegate` declared in the linted file.
pub fn is_delegate_type(model: &ScriptModel<'_>, type_ref: &str) -> bool {
    let name = simple_type_name(type_ref);
    if name.is_empty() {
        return false;
    }
    WELL_KNOWN_DELEGATES.binary_search(&name).is_ok() || model.is_declared_delegate(name)
}
