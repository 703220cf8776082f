//! Default form state: computes defaults from a schema and merges them under
//! existing form data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::*;
use crate::retrieve::retrieve_schema;
use crate::validator::SchemaValidator;

/// How deep default computation descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultsMode {
    /// Every nested object contributes its children's defaults.
    #[default]
    All,
    /// Only the top-level object's properties are filled; nested objects keep
    /// their own `default` but their children are left to descendant fields.
    ExcludeObjectChildren,
}

const MAX_DEPTH: usize = 32;

/// Computes defaults for `schema` and merges them under `form_data`.
///
/// Existing form data always wins over computed defaults.
pub fn get_default_form_state<V: SchemaValidator + ?Sized>(
    validator: &V,
    schema: &Value,
    root_schema: &Value,
    form_data: Option<&Value>,
    mode: DefaultsMode,
) -> Option<Value> {
    let mut visiting = Vec::new();
    let defaults = compute_defaults(validator, schema, root_schema, form_data, mode, 0, &mut visiting);
    match (defaults, form_data) {
        (Some(defaults), Some(data)) => Some(merge_defaults_with_form_data(&defaults, data)),
        (defaults, data) => defaults.or_else(|| data.cloned()),
    }
}

fn compute_defaults<V: SchemaValidator + ?Sized>(
    validator: &V,
    schema: &Value,
    root: &Value,
    form_data: Option<&Value>,
    mode: DefaultsMode,
    depth: usize,
    visiting: &mut Vec<String>,
) -> Option<Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    // A `$ref` already being expanded contributes no further defaults.
    let reference = schema.get(REF_KEY).and_then(Value::as_str);
    if let Some(reference) = reference
        && visiting.iter().any(|r| r == reference)
    {
        return None;
    }
    let schema = match retrieve_schema(validator, schema, root, form_data) {
        Ok(schema) => schema,
        Err(error) => {
            debug!(%error, "skipping defaults for unresolvable schema");
            return None;
        }
    };
    let own = schema
        .get(DEFAULT_KEY)
        .or_else(|| schema.get(CONST_KEY))
        .cloned();

    let Some(Value::Object(properties)) = schema.get(PROPERTIES_KEY) else {
        return own;
    };
    if depth > 0 && mode == DefaultsMode::ExcludeObjectChildren {
        return own;
    }

    let mut result = match own {
        Some(Value::Object(map)) => map,
        Some(other) => return Some(other),
        None => Map::new(),
    };
    if let Some(reference) = reference {
        visiting.push(reference.to_string());
    }
    for (name, property) in properties {
        let child_data = form_data.and_then(|data| data.get(name));
        let base = result.get(name).cloned();
        let computed = compute_defaults(validator, property, root, child_data, mode, depth + 1, visiting);
        let value = match (base, computed) {
            (Some(base), Some(computed)) => Some(merge_defaults_with_form_data(&computed, &base)),
            (base, computed) => base.or(computed),
        };
        if let Some(value) = value {
            result.insert(name.clone(), value);
        }
    }
    if reference.is_some() {
        visiting.pop();
    }
    if result.is_empty() {
        None
    } else {
        Some(Value::Object(result))
    }
}

/// Overlays `form_data` on `defaults`: objects merge per key, arrays merge per
/// index (form data length wins), anything else takes the form data.
pub fn merge_defaults_with_form_data(defaults: &Value, form_data: &Value) -> Value {
    match (defaults, form_data) {
        (Value::Object(defaults), Value::Object(data)) => {
            let mut merged = defaults.clone();
            for (key, value) in data {
                let value = match defaults.get(key) {
                    Some(default) => merge_defaults_with_form_data(default, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (Value::Array(defaults), Value::Array(data)) => Value::Array(
            data.iter()
                .enumerate()
                .map(|(i, value)| match defaults.get(i) {
                    Some(default) => merge_defaults_with_form_data(default, value),
                    None => value.clone(),
                })
                .collect(),
        ),
        (_, data) => data.clone(),
    }
}
