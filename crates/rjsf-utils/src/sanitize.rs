//! Branch sanitization: strips form data that only made sense under the
//! previously selected `oneOf`/`anyOf` branch.

use serde_json::{Map, Value};

use crate::constants::*;
use crate::retrieve::retrieve_schema;
use crate::validator::SchemaValidator;
use crate::value::values_equal;

/// What happens to a key of the old data once the new branch applies.
enum KeyAction {
    Remove,
    Replace(Value),
}

/// Returns `data` cleaned for `new_schema`, given it was entered under
/// `old_schema`.
///
/// Object handling:
/// - keys described by the old branch but not the new one are removed;
/// - keys whose `type` changed are removed;
/// - a value equal to the old branch's `default` is replaced by the new
///   `default`; a value that differs from a readonly new `default` is removed;
/// - a `const` mismatch is replaced by the new `const` when the value equals
///   the old `const`, removed otherwise;
/// - nested objects and arrays are sanitized recursively.
///
/// Keys the old branch never described are kept untouched.
///
/// Returns `None` when `new_schema` describes neither object properties nor
/// an array matching the old branch; there is nothing to carry over then.
pub fn sanitize_data_for_new_schema<V: SchemaValidator + ?Sized>(
    validator: &V,
    root_schema: &Value,
    new_schema: Option<&Value>,
    old_schema: Option<&Value>,
    data: Option<&Value>,
) -> Option<Value> {
    let empty = Value::Object(Map::new());
    let new_schema = new_schema.unwrap_or(&empty);
    let old_schema = old_schema.unwrap_or(&empty);

    if let Some(Value::Object(new_properties)) = new_schema.get(PROPERTIES_KEY) {
        let mut actions: Vec<(String, KeyAction)> = Vec::new();
        if let Some(Value::Object(old_properties)) = old_schema.get(PROPERTIES_KEY)
            && let Some(Value::Object(object)) = data
        {
            for key in old_properties.keys() {
                if object.contains_key(key) {
                    actions.push((key.clone(), KeyAction::Remove));
                }
            }
        }
        let mut nested: Vec<(String, Option<Value>)> = Vec::new();

        for (key, new_keyed) in new_properties {
            let form_value = data.and_then(|d| d.get(key));
            let old_keyed = old_schema
                .get(PROPERTIES_KEY)
                .and_then(|p| p.get(key))
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            let old_keyed = resolve(validator, &old_keyed, root_schema, form_value);
            let new_keyed = resolve(validator, new_keyed, root_schema, form_value);
            let old_type = old_keyed.get(TYPE_KEY);
            let new_type = new_keyed.get(TYPE_KEY);

            if old_type.is_some() && old_type != new_type {
                continue;
            }
            actions.retain(|(name, _)| name != key);

            let new_type_str = new_type.and_then(Value::as_str);
            if new_type_str == Some("object")
                || (new_type_str == Some("array") && form_value.is_some_and(Value::is_array))
            {
                let item = sanitize_data_for_new_schema(
                    validator,
                    root_schema,
                    Some(&new_keyed),
                    Some(&old_keyed),
                    form_value,
                );
                if item.is_some() || new_type_str == Some("array") {
                    nested.push((key.clone(), item));
                }
                continue;
            }

            if let Some(new_default) = new_keyed.get(DEFAULT_KEY)
                && !form_value.is_some_and(|v| values_equal(v, new_default))
            {
                let old_default = old_keyed.get(DEFAULT_KEY);
                if equal_opt(old_default, form_value) {
                    actions.push((key.clone(), KeyAction::Replace(new_default.clone())));
                } else if new_keyed.get(READONLY_KEY) == Some(&Value::Bool(true)) {
                    actions.push((key.clone(), KeyAction::Remove));
                }
            }
            if let Some(new_const) = new_keyed.get(CONST_KEY)
                && !form_value.is_some_and(|v| values_equal(v, new_const))
            {
                let old_const = old_keyed.get(CONST_KEY);
                actions.retain(|(name, _)| name != key);
                if equal_opt(old_const, form_value) {
                    actions.push((key.clone(), KeyAction::Replace(new_const.clone())));
                } else {
                    actions.push((key.clone(), KeyAction::Remove));
                }
            }
        }

        let mut result = match data {
            Some(Value::Object(object)) => object.clone(),
            _ => Map::new(),
        };
        for (key, action) in actions {
            match action {
                KeyAction::Remove => {
                    result.shift_remove(&key);
                }
                KeyAction::Replace(value) => {
                    result.insert(key, value);
                }
            }
        }
        for (key, value) in nested {
            match value {
                Some(value) => {
                    result.insert(key, value);
                }
                None => {
                    result.shift_remove(&key);
                }
            }
        }
        return Some(Value::Object(result));
    }

    if new_schema.get(TYPE_KEY).and_then(Value::as_str) == Some("array")
        && old_schema.get(TYPE_KEY).and_then(Value::as_str) == Some("array")
        && let Some(Value::Array(items)) = data
    {
        return sanitize_array(validator, root_schema, new_schema, old_schema, items);
    }

    None
}

fn sanitize_array<V: SchemaValidator + ?Sized>(
    validator: &V,
    root_schema: &Value,
    new_schema: &Value,
    old_schema: &Value,
    items: &[Value],
) -> Option<Value> {
    let new_items = new_schema.get(ITEMS_KEY).filter(|i| i.is_object());
    let old_items = old_schema.get(ITEMS_KEY).filter(|i| i.is_object());
    let max_items = new_schema.get(MAX_ITEMS_KEY).and_then(Value::as_u64);
    let truncate = |mut values: Vec<Value>| {
        if let Some(max) = max_items {
            values.truncate(max as usize);
        }
        values
    };

    let (Some(new_items), Some(old_items)) = (new_items, old_items) else {
        return Some(Value::Array(truncate(items.to_vec())));
    };
    let new_items = resolve(validator, new_items, root_schema, None);
    let old_items = resolve(validator, old_items, root_schema, None);
    let old_type = old_items.get(TYPE_KEY);
    let new_type = new_items.get(TYPE_KEY);
    if old_type.is_some() && old_type != new_type {
        return None;
    }
    if new_type.and_then(Value::as_str) == Some("object") {
        let sanitized = items
            .iter()
            .filter_map(|item| {
                sanitize_data_for_new_schema(
                    validator,
                    root_schema,
                    Some(&new_items),
                    Some(&old_items),
                    Some(item),
                )
            })
            .collect();
        return Some(Value::Array(truncate(sanitized)));
    }
    Some(Value::Array(truncate(items.to_vec())))
}

fn resolve<V: SchemaValidator + ?Sized>(
    validator: &V,
    schema: &Value,
    root_schema: &Value,
    data: Option<&Value>,
) -> Value {
    retrieve_schema(validator, schema, root_schema, data).unwrap_or_else(|_| schema.clone())
}

fn equal_opt(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => values_equal(a, b),
        (None, None) => true,
        _ => false,
    }
}
