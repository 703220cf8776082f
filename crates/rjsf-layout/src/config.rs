use rjsf_utils::IdOptions;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Form-wide layout settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Field id prefix and separator.
    #[serde(flatten)]
    pub ids: IdOptions,
    /// Options every field inherits underneath its own UI options.
    pub global_ui_options: Map<String, Value>,
    /// Values substituted for `className` tokens and `$lookup=` props.
    pub lookup_map: Map<String, Value>,
}
