//! Structural validator used to evaluate `if` conditions during retrieval.
//!
//! Full JSON Schema validation is the host's concern; the trait is the seam
//! where a complete validator plugs in. [`BasicValidator`] understands the
//! keywords that conditional layouts use in practice.

use serde_json::Value;

use crate::constants::*;
use crate::retrieve::find_ref;
use crate::value::values_equal;

/// Decides whether data satisfies a schema.
pub trait SchemaValidator {
    fn is_valid(&self, schema: &Value, data: &Value, root_schema: &Value) -> bool;
}

/// Checks `type`, `const`, `enum`, `required`, `properties`, `items`,
/// `allOf`/`anyOf`/`oneOf`/`not`, numeric bounds and string lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicValidator;

const MAX_DEPTH: usize = 64;

impl SchemaValidator for BasicValidator {
    fn is_valid(&self, schema: &Value, data: &Value, root_schema: &Value) -> bool {
        check(schema, data, root_schema, 0)
    }
}

fn check(schema: &Value, data: &Value, root: &Value, depth: usize) -> bool {
    if depth > MAX_DEPTH {
        return false;
    }
    let map = match schema {
        Value::Bool(b) => return *b,
        Value::Object(map) => map,
        _ => return true,
    };
    if let Some(Value::String(reference)) = map.get(REF_KEY) {
        match find_ref(reference, root) {
            Ok(target) => {
                if !check(target, data, root, depth + 1) {
                    return false;
                }
            }
            Err(_) => return false,
        }
    }
    if let Some(ty) = map.get(TYPE_KEY)
        && !matches_type(ty, data)
    {
        return false;
    }
    if let Some(expected) = map.get(CONST_KEY)
        && !values_equal(expected, data)
    {
        return false;
    }
    if let Some(Value::Array(options)) = map.get(ENUM_KEY)
        && !options.iter().any(|option| values_equal(option, data))
    {
        return false;
    }
    if let Value::Object(object) = data {
        if let Some(Value::Array(required)) = map.get(REQUIRED_KEY) {
            let missing = required
                .iter()
                .filter_map(Value::as_str)
                .any(|name| !object.contains_key(name));
            if missing {
                return false;
            }
        }
        if let Some(Value::Object(properties)) = map.get(PROPERTIES_KEY) {
            for (name, sub) in properties {
                if let Some(value) = object.get(name)
                    && !check(sub, value, root, depth + 1)
                {
                    return false;
                }
            }
        }
    }
    if let (Value::Array(items), Some(item_schema @ Value::Object(_))) = (data, map.get(ITEMS_KEY))
        && !items.iter().all(|item| check(item_schema, item, root, depth + 1))
    {
        return false;
    }
    if let Value::Number(n) = data
        && let Some(n) = n.as_f64()
    {
        let bound = |key: &str| map.get(key).and_then(Value::as_f64);
        if bound("minimum").is_some_and(|min| n < min)
            || bound("maximum").is_some_and(|max| n > max)
            || bound("exclusiveMinimum").is_some_and(|min| n <= min)
            || bound("exclusiveMaximum").is_some_and(|max| n >= max)
        {
            return false;
        }
    }
    if let Value::String(s) = data {
        let len = s.chars().count() as u64;
        if map.get("minLength").and_then(Value::as_u64).is_some_and(|min| len < min)
            || map.get("maxLength").and_then(Value::as_u64).is_some_and(|max| len > max)
        {
            return false;
        }
    }
    if let Some(Value::Array(all)) = map.get(ALL_OF_KEY)
        && !all.iter().all(|sub| check(sub, data, root, depth + 1))
    {
        return false;
    }
    if let Some(Value::Array(any)) = map.get(ANY_OF_KEY)
        && !any.iter().any(|sub| check(sub, data, root, depth + 1))
    {
        return false;
    }
    if let Some(Value::Array(one)) = map.get(ONE_OF_KEY)
        && one.iter().filter(|sub| check(sub, data, root, depth + 1)).count() != 1
    {
        return false;
    }
    if let Some(not) = map.get("not")
        && check(not, data, root, depth + 1)
    {
        return false;
    }
    true
}

fn matches_type(ty: &Value, data: &Value) -> bool {
    match ty {
        Value::String(name) => matches_type_name(name, data),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| matches_type_name(name, data)),
        _ => true,
    }
}

fn matches_type_name(name: &str, data: &Value) -> bool {
    match name {
        "null" => data.is_null(),
        "boolean" => data.is_boolean(),
        "string" => data.is_string(),
        "number" => data.is_number(),
        "integer" => match data {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        "array" => data.is_array(),
        "object" => data.is_object(),
        _ => true,
    }
}
