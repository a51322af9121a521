//! Structural diffing of normalized metadata documents.
//!
//! The differ answers two questions for the orchestrator: "is this field
//! equivalent on both sides?" and "which of the fields of interest changed?".
//! Both sides are normalized first (see [`crate::normalize`]), so key order,
//! list order and empty placeholders never register as changes. Arrays are
//! compared as sets of canonical element serializations: aggregation has
//! already deduplicated them, so multiplicity carries no meaning. Everything
//! else — scalars and objects alike — compares by JSON serialization, which
//! keeps values of different types (`"2020"` vs `2020`) distinct.

use crate::normalize::{canonical_key, normalize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// Whether two metadata values are equivalent after normalization.
///
/// A value that is present but empty on one side and entirely missing on the
/// other is equivalent: both normalize to absent.
pub fn equivalent(current: Option<&Value>, new: Option<&Value>) -> bool {
    let current = current.and_then(normalize);
    let new = new.and_then(normalize);

    match (current, new) {
        (None, None) => true,
        (None, Some(_)) | (Some(_), None) => false,
        (Some(current), Some(new)) => equivalent_normalized(&current, &new),
    }
}

fn equivalent_normalized(current: &Value, new: &Value) -> bool {
    match (current, new) {
        (Value::Array(current_items), Value::Array(new_items)) => {
            let current_set: HashSet<String> = current_items.iter().map(canonical_key).collect();
            let new_set: HashSet<String> = new_items.iter().map(canonical_key).collect();
            current_set == new_set
        }
        // Normalization already ordered object keys, so plain serialization
        // is canonical here. Serializations also carry the JSON type: a
        // string and a number with the same digits stay distinct.
        (current, new) => current.to_string() == new.to_string(),
    }
}

/// Names of the fields of interest whose values differ between the two
/// documents.
///
/// Applies [`equivalent`] independently per named top-level field. An empty
/// result means no remote write is necessary.
pub fn changed_fields(current: &Value, new: &Value, fields: &[String]) -> BTreeSet<String> {
    fields
        .iter()
        .filter(|field| !equivalent(current.get(field.as_str()), new.get(field.as_str())))
        .cloned()
        .collect()
}
