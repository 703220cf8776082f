//! Helpers over `serde_json::Value`: numeric-aware equality, a total order,
//! and dotted-path access in the style of `lodash.get` / `lodash.set`.

use core::cmp::Ordering;

use serde_json::{Map, Value};

/// Equality that treats `1` and `1.0` as the same number.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values.
///
/// Values of different JSON types order by type (`null < bool < number <
/// string < array < object`); values of the same type order naturally.
/// Consistent with [`values_equal`].
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(xs), Value::Array(ys)) => {
            for (x, y) in xs.iter().zip(ys) {
                let ord = compare_values(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            xs.len().cmp(&ys.len())
        }
        (Value::Object(xs), Value::Object(ys)) => {
            let mut xk: Vec<_> = xs.iter().collect();
            let mut yk: Vec<_> = ys.iter().collect();
            xk.sort_by(|a, b| a.0.cmp(b.0));
            yk.sort_by(|a, b| a.0.cmp(b.0));
            for ((ka, va), (kb, vb)) in xk.iter().zip(&yk) {
                let ord = ka.cmp(kb).then_with(|| compare_values(va, vb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            xk.len().cmp(&yk.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Splits a dotted path, ignoring empty segments.
pub fn split_path(dotted: &str) -> Vec<&str> {
    dotted.split('.').filter(|s| !s.is_empty()).collect()
}

/// Reads the value at a single key; numeric keys index into arrays.
pub fn get_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Reads the value at a dotted path. An empty path yields the value itself.
pub fn get_path<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    split_path(dotted)
        .into_iter()
        .try_fold(value, |current, key| get_key(current, key))
}

/// Same as [`get_path`] starting from optional data.
pub fn get_path_opt<'a>(value: Option<&'a Value>, dotted: &str) -> Option<&'a Value> {
    value.and_then(|v| get_path(v, dotted))
}

/// Writes `new_value` at a dotted path, creating intermediate containers.
///
/// A missing intermediate container becomes an array when the following key
/// is an index and an object otherwise. Non-container intermediates are
/// replaced. An empty path replaces the whole value.
///
/// Returns `false` when an array index lies more than [`MAX_ARRAY_GROWTH`]
/// slots past the end of its array; `value` may then hold newly created
/// intermediate containers but `new_value` is not written.
pub fn set_path(value: &mut Value, dotted: &str, new_value: Value) -> bool {
    let keys = split_path(dotted);
    let Some((last, parents)) = keys.split_last() else {
        *value = new_value;
        return true;
    };
    let mut current = value;
    for (i, key) in parents.iter().enumerate() {
        let next_is_index = keys[i + 1].parse::<usize>().is_ok();
        match child_slot(current, key, next_is_index) {
            Some(slot) => current = slot,
            None => return false,
        }
    }
    match child_slot(current, last, false) {
        Some(slot) => {
            *slot = new_value;
            true
        }
        None => false,
    }
}

/// Removes the object entry at a dotted path, returning it.
///
/// Missing paths and array elements are left untouched.
pub fn unset_path(value: &mut Value, dotted: &str) -> Option<Value> {
    let keys = split_path(dotted);
    let (last, parents) = keys.split_last()?;
    let parent = parents
        .iter()
        .try_fold(value, |current, key| get_key_mut(current, key))?;
    match parent {
        Value::Object(map) => map.shift_remove(*last),
        _ => None,
    }
}

fn get_key_mut<'a>(value: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// How far past the end of an array [`set_path`] may write.
pub const MAX_ARRAY_GROWTH: usize = 1 << 16;

fn child_slot<'a>(value: &'a mut Value, key: &str, next_is_index: bool) -> Option<&'a mut Value> {
    let array_index = key.parse::<usize>().ok();
    let indexable = value.is_array() && array_index.is_some();
    if !indexable && !value.is_object() {
        *value = Value::Object(Map::new());
    }
    let empty = || {
        if next_is_index {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        }
    };
    match value {
        Value::Array(items) => {
            let index = array_index?;
            if index >= items.len() {
                if index - items.len() > MAX_ARRAY_GROWTH {
                    return None;
                }
                items.resize(index.checked_add(1)?, Value::Null);
            }
            let slot = &mut items[index];
            if slot.is_null() {
                *slot = empty();
            }
            Some(slot)
        }
        Value::Object(map) => Some(map.entry(key.to_string()).or_insert_with(empty)),
        _ => None,
    }
}

/// `true` for `None`, `null` and `{}`.
pub fn is_empty_schema(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        _ => false,
    }
}
