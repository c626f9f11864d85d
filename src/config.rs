//! Configuration values, recursive merge, and drift detection.
//!
//! A deployment configuration is an arbitrarily nested mapping of string
//! keys to scalar or mapping values. Callers build one by merging a
//! vendor/platform default template with their own overrides, and the
//! reconciler compares the desired configuration against whatever is
//! currently deployed or cached to decide whether an update is needed.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Nested string-keyed configuration mapping.
pub type ConfigMap = Map<String, Value>;

/// Merge caller overrides into a default template.
///
/// The override wins at every leaf: nested mappings merge recursively,
/// non-mapping values replace wholesale. Neither input is mutated.
#[must_use]
pub fn merge(defaults: &ConfigMap, overrides: &ConfigMap) -> ConfigMap {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        let combined = match (merged.get(key), value) {
            (Some(Value::Object(base)), Value::Object(over)) => Value::Object(merge(base, over)),
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

/// Check whether `desired` is a recursive, value-equal subset of `baseline`.
///
/// This is the drift test: `true` means no drift. Every key in `desired`
/// must exist in `baseline` with an equal value; nested mappings recurse.
/// Keys present only in `baseline` are ignored, so vendor-side defaults
/// added to a deployed configuration never trigger an update. An empty
/// `desired` is a subset of anything.
#[must_use]
pub fn is_subset(desired: &ConfigMap, baseline: &ConfigMap) -> bool {
    desired.iter().all(|(key, value)| {
        match (value, baseline.get(key)) {
            (Value::Object(sub), Some(Value::Object(sup))) => is_subset(sub, sup),
            // A nested mapping cannot match a scalar
            (Value::Object(_), Some(_)) => false,
            (_, Some(other)) => value == other,
            (_, None) => false,
        }
    })
}

/// Interpret a JSON value as a configuration mapping.
///
/// Vendor responses carry configuration snapshots as JSON; anything other
/// than an object is a malformed configuration.
pub fn as_config(value: Value) -> Result<ConfigMap> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::config(format!(
            "expected a configuration mapping, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
