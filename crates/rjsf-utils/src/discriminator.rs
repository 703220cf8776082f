//! `oneOf` / `anyOf` helpers: union detection, discriminator lookup and
//! branch selection by the value of a selector property.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::constants::*;
use crate::value::{get_path_opt, values_equal};

/// Which union keyword a schema uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnionKey {
    #[serde(rename = "oneOf")]
    OneOf,
    #[serde(rename = "anyOf")]
    AnyOf,
}

impl UnionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            UnionKey::OneOf => ONE_OF_KEY,
            UnionKey::AnyOf => ANY_OF_KEY,
        }
    }

    /// `oneOf` takes precedence when a schema carries both keywords.
    pub fn of(schema: &Value) -> Option<UnionKey> {
        let map = schema.as_object()?;
        if map.contains_key(ONE_OF_KEY) {
            Some(UnionKey::OneOf)
        } else if map.contains_key(ANY_OF_KEY) {
            Some(UnionKey::AnyOf)
        } else {
            None
        }
    }

    /// The branch list under this keyword, if it is an array.
    pub fn branches(self, schema: &Value) -> Option<&Vec<Value>> {
        schema.get(self.as_str()).and_then(Value::as_array)
    }
}

/// Returns `discriminator.propertyName` when it is a string.
pub fn get_discriminator_field(schema: &Value) -> Option<&str> {
    let discriminator = schema.get(DISCRIMINATOR_KEY)?;
    match discriminator.get(PROPERTY_NAME_KEY) {
        Some(Value::String(name)) => Some(name.as_str()),
        Some(other) => {
            warn!(property_name = %other, "discriminator propertyName is not a string, ignoring it");
            None
        }
        None => None,
    }
}

/// The value a branch assigns to its selector property: `default`, else `const`.
pub fn branch_selector_value<'a>(branch: &'a Value, selector_field: &str) -> Option<&'a Value> {
    let property = branch.get(PROPERTIES_KEY)?.get(selector_field)?;
    property.get(DEFAULT_KEY).or_else(|| property.get(CONST_KEY))
}

/// Picks the branch whose selector property matches the form data.
///
/// The selector is the schema's discriminator, falling back to
/// `fallback_field`. Branches are already retrieved by the caller.
pub fn find_selected_branch<'a>(
    schema: &Value,
    branches: &'a [Value],
    fallback_field: &str,
    form_data: Option<&Value>,
) -> Option<&'a Value> {
    let selector_field = get_discriminator_field(schema).unwrap_or(fallback_field);
    let data = get_path_opt(form_data, selector_field)?;
    branches.iter().find(|branch| {
        branch_selector_value(branch, selector_field).is_some_and(|value| values_equal(value, data))
    })
}
