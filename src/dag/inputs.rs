// src/dag/inputs.rs

//! Input aggregation for downstream tasks.
//!
//! The shape of a task's input depends on how many dependencies it has:
//!
//! - none: an empty object `{}`
//! - exactly one: that dependency's result, passed through unchanged
//! - several: an object keyed by dependency id
//!
//! Worker prompt logic relies on this asymmetry, so a single-dependency
//! task whose parent itself merged several results still receives the
//! parent's merged object as-is, never wrapped a second time.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::engine::TaskId;

/// Build the input payload for a task from the result store.
///
/// Callers only invoke this once every dependency is `Completed`; a missing
/// entry is logged and replaced with `null`.
pub fn collect_inputs(dependencies: &[TaskId], results: &HashMap<TaskId, Value>) -> Value {
    match dependencies {
        [] => Value::Object(Map::new()),
        [only] => lookup(only, results),
        many => {
            let merged: Map<String, Value> = many
                .iter()
                .map(|dep| (dep.clone(), lookup(dep, results)))
                .collect();
            Value::Object(merged)
        }
    }
}

fn lookup(dep: &str, results: &HashMap<TaskId, Value>) -> Value {
    match results.get(dep) {
        Some(value) => value.clone(),
        None => {
            warn!(dep = %dep, "dependency result missing from result store");
            Value::Null
        }
    }
}
