//! Form-context lookups: plain values for `className` tokens and `$lookup=`
//! props, and named custom renderers for leaf nodes.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use rjsf_utils::FieldPathId;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::LayoutConfig;

/// Prefix marking a grid prop whose value is fetched from the form context.
pub const LOOKUP_PREFIX: &str = "$lookup=";

/// Everything a custom renderer is handed for one leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRenderProps {
    pub name: Option<String>,
    pub ui_props: Map<String, Value>,
    pub schema: Value,
    pub ui_schema: Option<Value>,
    pub form_data: Option<Value>,
    pub field_path_id: FieldPathId,
    pub required: bool,
    pub readonly: bool,
}

/// A caller-provided component that renders a leaf in place of a field.
pub trait CustomRenderer: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Produces the opaque output stored on the rendered node.
    fn render(&self, props: &CustomRenderProps) -> Value;
}

/// Source of lookup values and named renderers.
pub trait FormContext {
    fn lookup_value(&self, key: &str) -> Option<&Value>;

    fn lookup_renderer(&self, name: &str) -> Option<Arc<dyn CustomRenderer>>;
}

/// In-memory [`FormContext`].
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    values: Map<String, Value>,
    renderers: IndexMap<String, Arc<dyn CustomRenderer>>,
}

impl LookupTable {
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
            renderers: IndexMap::new(),
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.lookup_map.clone())
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn CustomRenderer>) -> Self {
        self.renderers.insert(renderer.name().to_string(), renderer);
        self
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }
}

impl FormContext for LookupTable {
    fn lookup_value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn lookup_renderer(&self, name: &str) -> Option<Arc<dyn CustomRenderer>> {
        self.renderers.get(name).cloned()
    }
}

/// Replaces each `$lookup=<key>` string prop with the looked-up value, or
/// with the bare key when the context has no entry for it.
pub fn resolve_lookup_props(props: &Map<String, Value>, context: &dyn FormContext) -> Map<String, Value> {
    props
        .iter()
        .map(|(key, value)| {
            let resolved = match value.as_str().and_then(|s| s.strip_prefix(LOOKUP_PREFIX)) {
                Some(lookup_key) => context
                    .lookup_value(lookup_key)
                    .cloned()
                    .unwrap_or_else(|| Value::String(lookup_key.to_string())),
                None => value.clone(),
            };
            (key.clone(), resolved)
        })
        .collect()
}

/// Maps each whitespace-separated `className` token through the lookup
/// values, keeping tokens that have no string entry.
pub fn resolve_class_names(class_name: &str, context: &dyn FormContext) -> String {
    class_name
        .split_whitespace()
        .map(|token| {
            context
                .lookup_value(token)
                .and_then(Value::as_str)
                .unwrap_or(token)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
