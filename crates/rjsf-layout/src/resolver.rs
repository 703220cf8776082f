//! Resolves a dotted field path against a schema and live form data.
//!
//! Every step resolves `$ref`s, follows `properties`, the `oneOf`/`anyOf`
//! branch selected by the data, or array `items`, and threads readonly
//! inheritance. Paths that do not resolve yield [`ResolvedFieldInfo::missing`]
//! rather than an error: layouts routinely name fields of inactive branches.

use std::cell::RefCell;
use std::collections::HashMap;

use rjsf_utils::constants::{ITEMS_KEY, PROPERTIES_KEY, REQUIRED_KEY, TYPE_KEY};
use rjsf_utils::value::{get_key, is_empty_schema, split_path};
use rjsf_utils::{
    FieldPathId, IdOptions, SchemaUtils, UnionKey, get_discriminator_field, hash_optional,
    hash_value,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::readonly::TriState;

/// Branches of a `oneOf`/`anyOf` leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsInfo {
    pub options: Vec<Value>,
    pub has_discriminator: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFieldInfo {
    pub schema: Option<Value>,
    pub is_required: bool,
    pub is_readonly: TriState,
    pub options_info: Option<OptionsInfo>,
    pub field_path_id: FieldPathId,
}

impl ResolvedFieldInfo {
    /// The "nothing found" result.
    pub fn missing(field_path_id: FieldPathId) -> Self {
        Self {
            schema: None,
            is_required: false,
            is_readonly: TriState::Unset,
            options_info: None,
            field_path_id,
        }
    }
}

/// Memoizes schema retrieval for one render pass, keyed by the content
/// hashes of the schema and the data it was retrieved against.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RefCell<HashMap<(u64, u64), Option<Value>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves `schema` through `utils`; failures count as a miss.
    pub fn retrieve(
        &self,
        utils: &dyn SchemaUtils,
        schema: &Value,
        data: Option<&Value>,
    ) -> Option<Value> {
        let key = (hash_value(schema), hash_optional(data));
        if let Some(cached) = self.entries.borrow().get(&key) {
            return cached.clone();
        }
        let retrieved = match utils.retrieve_schema(schema, data) {
            Ok(retrieved) => Some(retrieved),
            Err(error) => {
                debug!(%error, "schema retrieval failed, treating as unresolved");
                None
            }
        };
        self.entries.borrow_mut().insert(key, retrieved.clone());
        retrieved
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Result of descending one path segment.
struct Step {
    raw_schema: Option<Value>,
    field_path_id: FieldPathId,
    selected_branch: Option<Value>,
}

pub struct SchemaPathResolver<'a> {
    utils: &'a dyn SchemaUtils,
    cache: &'a SchemaCache,
    ids: &'a IdOptions,
}

impl<'a> SchemaPathResolver<'a> {
    pub fn new(utils: &'a dyn SchemaUtils, cache: &'a SchemaCache, ids: &'a IdOptions) -> Self {
        Self { utils, cache, ids }
    }

    /// Resolves `dotted_path` inside `schema` for the given form data.
    pub fn resolve(
        &self,
        schema: &Value,
        dotted_path: &str,
        form_data: Option<&Value>,
        initial_id: &FieldPathId,
    ) -> ResolvedFieldInfo {
        let mut segments = split_path(dotted_path);
        let full_id = segments
            .iter()
            .fold(initial_id.clone(), |id, part| id.child_name(part, self.ids));
        let Some(leaf) = segments.pop() else {
            return ResolvedFieldInfo::missing(initial_id.clone());
        };
        let Some(mut current) = self.cache.retrieve(self.utils, schema, form_data) else {
            return ResolvedFieldInfo::missing(full_id);
        };

        let empty = Value::Object(Map::new());
        let mut is_readonly = TriState::from_schema(&current);
        let mut field_path_id = initial_id.clone();
        let mut inner_data = form_data.unwrap_or(&empty);

        for part in segments {
            let step = self.step(&current, part, inner_data, &field_path_id);
            field_path_id = step.field_path_id;
            inner_data = get_key(inner_data, part).unwrap_or(&empty);
            let Some(raw) = step.raw_schema.filter(|raw| !is_empty_schema(Some(raw))) else {
                trace!(path = dotted_path, segment = part, "path segment not found in schema");
                return ResolvedFieldInfo::missing(full_id);
            };
            let Some(next) = self.cache.retrieve(self.utils, &raw, Some(inner_data)) else {
                return ResolvedFieldInfo::missing(full_id);
            };
            current = next;
            is_readonly = TriState::from_schema(&current).inherit(is_readonly);
        }

        let step = self.step(&current, leaf, inner_data, &field_path_id);
        let required_in = step.selected_branch.as_ref().unwrap_or(&current);
        let is_required = current.get(PROPERTIES_KEY).is_some() || step.selected_branch.is_some();
        let is_required = is_required
            && required_in
                .get(REQUIRED_KEY)
                .and_then(Value::as_array)
                .is_some_and(|required| required.iter().any(|name| name.as_str() == Some(leaf)));

        let Some(raw) = step.raw_schema.filter(|raw| !is_empty_schema(Some(raw))) else {
            trace!(path = dotted_path, "leaf not found in schema");
            return ResolvedFieldInfo::missing(step.field_path_id);
        };
        let leaf_data = get_key(inner_data, leaf);
        let Some(resolved) = self.cache.retrieve(self.utils, &raw, leaf_data) else {
            return ResolvedFieldInfo::missing(step.field_path_id);
        };
        is_readonly = TriState::from_schema(&resolved).inherit(is_readonly);

        let options_info = UnionKey::of(&resolved).map(|key| OptionsInfo {
            options: key.branches(&resolved).cloned().unwrap_or_default(),
            has_discriminator: get_discriminator_field(&resolved).is_some(),
        });

        ResolvedFieldInfo {
            schema: Some(resolved),
            is_required,
            is_readonly,
            options_info,
            field_path_id: step.field_path_id,
        }
    }

    fn step(&self, schema: &Value, part: &str, inner_data: &Value, id: &FieldPathId) -> Step {
        let named_id = id.child_name(part, self.ids);
        if let Some(properties) = schema.get(PROPERTIES_KEY) {
            return Step {
                raw_schema: properties.get(part).cloned(),
                field_path_id: named_id,
                selected_branch: None,
            };
        }
        if let Some(key) = UnionKey::of(schema) {
            let selected = self
                .utils
                .find_selected_branch(schema, part, key, Some(inner_data));
            let raw_schema = selected
                .as_ref()
                .and_then(|branch| branch.get(PROPERTIES_KEY))
                .and_then(|properties| properties.get(part))
                .cloned();
            return Step {
                raw_schema,
                field_path_id: named_id,
                selected_branch: selected,
            };
        }
        match array_item_schema(schema, part) {
            Some((raw_schema, index)) => Step {
                raw_schema,
                field_path_id: named_id.with_last_index(index, self.ids),
                selected_branch: None,
            },
            None => Step {
                raw_schema: None,
                field_path_id: named_id,
                selected_branch: None,
            },
        }
    }
}

/// Item schema for a numeric segment of an array schema.
///
/// Tuple `items` past their end fall back to the last entry.
fn array_item_schema(schema: &Value, part: &str) -> Option<(Option<Value>, usize)> {
    let index = part.parse::<usize>().ok()?;
    if schema.get(TYPE_KEY).and_then(Value::as_str) != Some("array") {
        return None;
    }
    let raw = match schema.get(ITEMS_KEY)? {
        Value::Array(items) => items.get(index).or_else(|| items.last()).cloned(),
        single => Some(single.clone()),
    };
    Some((raw, index))
}
