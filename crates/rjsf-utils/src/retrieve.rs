//! Schema retrieval: resolves `$ref`, folds `allOf` and picks the active
//! `if`/`then`/`else` branch for the given form data.
//!
//! Input schemas are never mutated; every call yields a fresh value.

use serde_json::{Map, Value};

use crate::constants::*;
use crate::error::UtilsError;
use crate::validator::SchemaValidator;

/// Looks up a local JSON pointer reference (`#/definitions/Name`).
pub fn find_ref<'a>(reference: &str, root_schema: &'a Value) -> Result<&'a Value, UtilsError> {
    let Some(pointer) = reference.strip_prefix('#') else {
        return Err(UtilsError::UnsupportedReference {
            reference: reference.to_string(),
        });
    };
    let mut current = root_schema;
    for raw in pointer.split('/').skip(1) {
        let token = raw.replace("~1", "/").replace("~0", "~");
        let next = match current {
            Value::Object(map) => map.get(&token),
            Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| UtilsError::UnresolvedReference {
            reference: reference.to_string(),
        })?;
    }
    Ok(current)
}

/// Resolves the top-level composition keywords of `schema` against `root_schema`.
pub fn retrieve_schema<V: SchemaValidator + ?Sized>(
    validator: &V,
    schema: &Value,
    root_schema: &Value,
    form_data: Option<&Value>,
) -> Result<Value, UtilsError> {
    let mut visiting = Vec::new();
    retrieve_inner(validator, schema, root_schema, form_data, &mut visiting)
}

fn retrieve_inner<V: SchemaValidator + ?Sized>(
    validator: &V,
    schema: &Value,
    root: &Value,
    form_data: Option<&Value>,
    visiting: &mut Vec<String>,
) -> Result<Value, UtilsError> {
    let Value::Object(map) = schema else {
        return Ok(schema.clone());
    };
    let mut resolved = map.clone();

    if let Some(Value::String(reference)) = resolved.shift_remove(REF_KEY) {
        if visiting.contains(&reference) {
            return Err(UtilsError::CircularReference { reference });
        }
        let target = find_ref(&reference, root)?;
        visiting.push(reference);
        let target = retrieve_inner(validator, target, root, form_data, visiting)?;
        visiting.pop();
        // Sibling keywords of `$ref` override the referenced schema.
        let mut merged = match target {
            Value::Object(target) => target,
            _ => Map::new(),
        };
        for (key, value) in resolved {
            merged.insert(key, value);
        }
        resolved = merged;
    }

    if let Some(Value::Array(all_of)) = resolved.shift_remove(ALL_OF_KEY) {
        for sub in &all_of {
            if let Value::Object(sub) = retrieve_inner(validator, sub, root, form_data, visiting)? {
                merge_schemas(&mut resolved, sub);
            }
        }
    }

    if let Some(condition) = resolved.shift_remove(IF_KEY) {
        let then_branch = resolved.shift_remove(THEN_KEY);
        let else_branch = resolved.shift_remove(ELSE_KEY);
        let data = form_data.cloned().unwrap_or(Value::Null);
        let branch = if validator.is_valid(&condition, &data, root) {
            then_branch
        } else {
            else_branch
        };
        if let Some(branch) = branch
            && let Value::Object(branch) =
                retrieve_inner(validator, &branch, root, form_data, visiting)?
        {
            merge_schemas(&mut resolved, branch);
        }
    }

    Ok(Value::Object(resolved))
}

/// Merges `source` into `target`.
///
/// `properties` merge per property, `required` is a union, nested objects
/// merge recursively, and scalar keywords already on `target` are kept.
pub fn merge_schemas(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (None, value) => {
                target.insert(key, value);
            }
            (Some(Value::Array(existing)), Value::Array(extra)) if key == REQUIRED_KEY => {
                for item in extra {
                    if !existing.contains(&item) {
                        existing.push(item);
                    }
                }
            }
            (Some(Value::Object(existing)), Value::Object(extra)) => merge_schemas(existing, extra),
            (Some(_), _) => {}
        }
    }
}
