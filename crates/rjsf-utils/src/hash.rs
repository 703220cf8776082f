//! Deterministic content hashing for JSON values.
//!
//! Object keys are hashed in sorted order so two structurally equal values
//! hash the same regardless of key insertion order.

use core::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;
use serde_json::Value;

const SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

fn build_state() -> RandomState {
    RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3])
}

fn hash_into<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Null => 0u8.hash(state),
        Value::Bool(b) => {
            1u8.hash(state);
            b.hash(state);
        }
        Value::Number(n) => {
            2u8.hash(state);
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).hash(state),
                Some(f) => f.to_bits().hash(state),
                None => n.to_string().hash(state),
            }
        }
        Value::String(s) => {
            3u8.hash(state);
            s.hash(state);
        }
        Value::Array(items) => {
            4u8.hash(state);
            items.len().hash(state);
            for item in items {
                hash_into(item, state);
            }
        }
        Value::Object(map) => {
            5u8.hash(state);
            map.len().hash(state);
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, item) in entries {
                key.hash(state);
                hash_into(item, state);
            }
        }
    }
}

/// Hashes a JSON value to a stable 64-bit fingerprint.
pub fn hash_value(value: &Value) -> u64 {
    let mut hasher = build_state().build_hasher();
    hash_into(value, &mut hasher);
    hasher.finish()
}

/// Hashes an optional value; `None` is distinct from `null`.
pub fn hash_optional(value: Option<&Value>) -> u64 {
    let mut hasher = build_state().build_hasher();
    match value {
        Some(value) => {
            1u8.hash(&mut hasher);
            hash_into(value, &mut hasher);
        }
        None => 0u8.hash(&mut hasher),
    }
    hasher.finish()
}

/// Hex form of [`hash_value`], used for stable keys.
pub fn hash_object(value: &Value) -> String {
    format!("{:016x}", hash_value(value))
}
