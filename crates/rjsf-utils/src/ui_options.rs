use serde_json::{Map, Value};
use tracing::warn;

use crate::constants::*;

/// Flattens the `ui:` keys of a UI schema fragment into one option bag.
///
/// `global_options` form the base; `ui:options` entries are spread in and
/// every other `ui:<name>` key becomes option `<name>`. Later keys win, in
/// the fragment's key order. An object-valued `ui:widget` is rejected.
pub fn get_ui_options(ui_schema: Option<&Value>, global_options: Option<&Map<String, Value>>) -> Map<String, Value> {
    let mut options = global_options.cloned().unwrap_or_default();
    let Some(Value::Object(ui_schema)) = ui_schema else {
        return options;
    };
    for (key, value) in ui_schema {
        let Some(name) = key.strip_prefix(UI_PREFIX) else {
            continue;
        };
        if key == UI_WIDGET_KEY && value.is_object() {
            warn!("setting options via ui:widget object is no longer supported, use ui:options instead");
            continue;
        }
        match (key.as_str(), value) {
            (UI_OPTIONS_KEY, Value::Object(inner)) => {
                for (k, v) in inner {
                    options.insert(k.clone(), v.clone());
                }
            }
            _ => {
                options.insert(name.to_string(), value.clone());
            }
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefixed_keys_and_options_merge() {
        let ui = json!({
            "ui:widget": "radio",
            "ui:options": {"label": false, "rows": 3},
            "ui:readonly": true,
            "nested": {"ui:widget": "ignored"}
        });
        let options = get_ui_options(Some(&ui), None);
        assert_eq!(
            Value::Object(options),
            json!({"widget": "radio", "label": false, "rows": 3, "readonly": true})
        );
    }

    #[test]
    fn test_global_options_are_the_base() {
        let global = json!({"label": false, "size": "small"});
        let ui = json!({"ui:options": {"size": "large"}});
        let options = get_ui_options(Some(&ui), global.as_object());
        assert_eq!(Value::Object(options), json!({"label": false, "size": "large"}));
    }

    #[test]
    fn test_object_widget_is_skipped() {
        let ui = json!({"ui:widget": {"component": "x"}});
        assert!(get_ui_options(Some(&ui), None).is_empty());
    }
}
