//! Builds the UI schema fragment handed to a leaf field.

use rjsf_utils::constants::{UI_GLOBAL_OPTIONS_KEY, UI_OPTIONS_KEY, UI_READONLY_KEY};
use rjsf_utils::get_ui_options;
use rjsf_utils::value::get_path_opt;
use serde_json::{Map, Value};

use crate::readonly::TriState;

const READONLY_OPTION: &str = "readonly";

/// A leaf's UI schema plus the readonly state it ends up with.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedUiSchema {
    pub field_ui_schema: Map<String, Value>,
    /// `None` when neither the UI schema nor any readonly signal decided it.
    pub readonly: Option<bool>,
}

/// Composes the UI schema of `field` (a dotted path into `ui_schema`).
///
/// Options merge in increasing precedence: the field's own `ui:options`,
/// `ui_props` from the grid node, then the inherited `ui:globalOptions`,
/// which are also copied back so descendants keep inheriting them.
///
/// Readonly is forced when `force_readonly` is set, or when the schema is
/// readonly and the UI schema has no readonly of its own. The forced value
/// goes to `ui:options.readonly` if the field already uses that slot,
/// `ui:readonly` otherwise. An explicit UI readonly (including `false`)
/// beats a readonly schema.
pub fn compute_field_ui_schema(
    field: &str,
    ui_props: &Map<String, Value>,
    ui_schema: Option<&Value>,
    schema_readonly: TriState,
    force_readonly: bool,
) -> ComposedUiSchema {
    let global_options = ui_schema
        .and_then(|ui| ui.get(UI_GLOBAL_OPTIONS_KEY))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let local_ui_schema = get_path_opt(ui_schema, field).and_then(Value::as_object);

    let mut local_options = local_ui_schema
        .and_then(|local| local.get(UI_OPTIONS_KEY))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for (key, value) in ui_props.iter().chain(global_options.iter()) {
        local_options.insert(key.clone(), value.clone());
    }

    let mut field_ui_schema = local_ui_schema.cloned().unwrap_or_default();
    let uses_options_slot = local_options.contains_key(READONLY_OPTION);
    if !local_options.is_empty() {
        field_ui_schema.insert(UI_OPTIONS_KEY.to_string(), Value::Object(local_options));
    }
    if !global_options.is_empty() {
        field_ui_schema.insert(
            UI_GLOBAL_OPTIONS_KEY.to_string(),
            Value::Object(global_options),
        );
    }

    let ui_readonly = get_ui_options(Some(&Value::Object(field_ui_schema.clone())), None)
        .get(READONLY_OPTION)
        .cloned();
    let mut readonly = ui_readonly.as_ref().map(is_truthy);

    if force_readonly || (ui_readonly.is_none() && schema_readonly.is_true()) {
        readonly = Some(true);
        if uses_options_slot
            && let Some(Value::Object(options)) = field_ui_schema.get_mut(UI_OPTIONS_KEY)
        {
            options.insert(READONLY_OPTION.to_string(), Value::Bool(true));
        } else {
            field_ui_schema.insert(UI_READONLY_KEY.to_string(), Value::Bool(true));
        }
    }

    ComposedUiSchema {
        field_ui_schema,
        readonly,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_global_options_beat_local_props() {
        let ui = json!({
            "ui:globalOptions": {"label": false},
            "name": {"ui:options": {"label": true, "rows": 2}, "ui:widget": "textarea"}
        });
        let composed = compute_field_ui_schema(
            "name",
            &props(json!({"label": true, "width": 6})),
            Some(&ui),
            TriState::Unset,
            false,
        );
        assert_eq!(
            Value::Object(composed.field_ui_schema),
            json!({
                "ui:widget": "textarea",
                "ui:options": {"label": false, "rows": 2, "width": 6},
                "ui:globalOptions": {"label": false}
            })
        );
        assert_eq!(composed.readonly, None);
    }

    #[test]
    fn test_local_props_beat_existing_options() {
        let ui = json!({"name": {"ui:options": {"width": 3}}});
        let composed =
            compute_field_ui_schema("name", &props(json!({"width": 6})), Some(&ui), TriState::Unset, false);
        assert_eq!(composed.field_ui_schema[UI_OPTIONS_KEY], json!({"width": 6}));
    }

    #[test]
    fn test_nested_field_paths_read_nested_ui_schema() {
        let ui = json!({"person": {"name": {"ui:widget": "text"}}});
        let composed =
            compute_field_ui_schema("person.name", &Map::new(), Some(&ui), TriState::Unset, false);
        assert_eq!(Value::Object(composed.field_ui_schema), json!({"ui:widget": "text"}));
    }

    #[test]
    fn test_schema_readonly_writes_ui_readonly() {
        let composed = compute_field_ui_schema("a", &Map::new(), None, TriState::True, false);
        assert_eq!(composed.readonly, Some(true));
        assert_eq!(Value::Object(composed.field_ui_schema), json!({"ui:readonly": true}));
    }

    #[test]
    fn test_explicit_false_beats_schema_readonly() {
        let ui = json!({"a": {"ui:readonly": false}});
        let composed = compute_field_ui_schema("a", &Map::new(), Some(&ui), TriState::True, false);
        assert_eq!(composed.readonly, Some(false));
        assert_eq!(composed.field_ui_schema[UI_READONLY_KEY], json!(false));
    }

    #[test]
    fn test_force_readonly_prefers_existing_options_slot() {
        let ui = json!({"a": {"ui:options": {"readonly": false}}});
        let composed = compute_field_ui_schema("a", &Map::new(), Some(&ui), TriState::Unset, true);
        assert_eq!(composed.readonly, Some(true));
        assert_eq!(composed.field_ui_schema[UI_OPTIONS_KEY], json!({"readonly": true}));
        assert!(!composed.field_ui_schema.contains_key(UI_READONLY_KEY));
    }

    #[test]
    fn test_force_readonly_overrides_explicit_false() {
        let ui = json!({"a": {"ui:readonly": false}});
        let composed = compute_field_ui_schema("a", &Map::new(), Some(&ui), TriState::False, true);
        assert_eq!(composed.readonly, Some(true));
        assert_eq!(composed.field_ui_schema[UI_READONLY_KEY], json!(true));
    }
}
