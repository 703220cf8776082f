//! The discriminated union field: a chooser over `oneOf`/`anyOf` branches
//! and the data rewrite performed when the user picks another branch.

use std::cell::RefCell;

use rjsf_utils::constants::{ERRORS_KEY, PROPERTIES_KEY, TITLE_KEY, UI_PREFIX};
use rjsf_utils::value::{get_path_opt, set_path, values_equal};
use rjsf_utils::{
    DefaultsMode, FieldPath, FieldPathId, SchemaUtils, UnionKey, branch_selector_value,
    get_discriminator_field, get_ui_options, hash_optional, hash_value,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::LayoutError;

/// UI option naming the selector property when the schema has no discriminator.
pub const OPTIONS_SCHEMA_SELECTOR: &str = "optionsSchemaSelector";

/// One entry of the chooser widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumOption {
    pub label: String,
    pub value: Value,
    pub schema: Value,
}

/// Props of the chooser widget, fully resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chooser {
    pub id: String,
    /// The selector property the chooser writes.
    pub name: String,
    pub widget: String,
    pub label: String,
    /// Current selector value in the form data.
    pub value: Option<Value>,
    pub enum_options: Vec<EnumOption>,
    /// Schema of the selector property under the selected (else first) branch.
    pub option_schema: Value,
    pub ui_options: Map<String, Value>,
    pub disabled: bool,
    pub readonly: bool,
    pub required: bool,
    pub raw_errors: Vec<Value>,
}

/// Inputs of a [`LayoutMultiSchemaField`] render.
#[derive(Debug, Clone, Copy)]
pub struct MultiSchemaProps<'a> {
    pub name: &'a str,
    pub schema: &'a Value,
    pub options: &'a [Value],
    pub has_discriminator: bool,
    pub ui_schema: Option<&'a Value>,
    pub form_data: Option<&'a Value>,
    pub error_schema: Option<&'a Value>,
    pub field_path_id: &'a FieldPathId,
    pub global_ui_options: Option<&'a Map<String, Value>>,
    pub required: bool,
    pub readonly: bool,
    pub disabled: bool,
}

/// A change to propagate to the parent form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    /// New value for the field; `None` clears it.
    pub value: Option<Value>,
    pub path: FieldPath,
    pub id: String,
}

/// Labels and values for each branch of a union schema.
///
/// Branches are retrieved against `form_data` first. With a selector, an
/// option's value is the selector property's `default` (else `const`);
/// without one it is the branch's own constant. Labels come from the
/// branch's `ui:title` in `ui:oneOf`/`ui:anyOf`, then the selector
/// property's title, then the branch title, then the value.
pub fn compute_enum_options(
    utils: &dyn SchemaUtils,
    schema: &Value,
    options: &[Value],
    ui_schema: Option<&Value>,
    selector_field: Option<&str>,
    form_data: Option<&Value>,
) -> Result<Vec<EnumOption>, LayoutError> {
    let Some(union_key) = UnionKey::of(schema) else {
        return Err(LayoutError::NoEnumOptions {
            schema: schema.to_string(),
        });
    };
    let branch_ui_schemas = ui_schema.and_then(|ui| {
        ui.get(format!("{UI_PREFIX}{}", union_key.as_str()))
            .or_else(|| ui.get(union_key.as_str()))
            .and_then(Value::as_array)
    });
    let enum_options = options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let branch = utils
                .retrieve_schema(option, form_data)
                .unwrap_or_else(|_| option.clone());
            let ui_title = get_ui_options(branch_ui_schemas.and_then(|ui| ui.get(index)), None)
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string);
            let (value, selector_title) = match selector_field {
                Some(selector) => {
                    let property = branch.get(PROPERTIES_KEY).and_then(|p| p.get(selector));
                    (
                        branch_selector_value(&branch, selector).cloned(),
                        property.and_then(|p| p.get(TITLE_KEY)).and_then(Value::as_str),
                    )
                }
                None => (to_constant(&branch), None),
            };
            let value = value.unwrap_or(Value::Null);
            let label = ui_title
                .or_else(|| selector_title.map(str::to_string))
                .or_else(|| branch.get(TITLE_KEY).and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| display_value(&value));
            EnumOption {
                label,
                value,
                schema: branch,
            }
        })
        .collect();
    Ok(enum_options)
}

/// `const`, or the only member of a single-element `enum`.
fn to_constant(schema: &Value) -> Option<Value> {
    if let Some(constant) = schema.get("const") {
        return Some(constant.clone());
    }
    match schema.get("enum").and_then(Value::as_array) {
        Some(values) if values.len() == 1 => values.first().cloned(),
        _ => None,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The option whose selector `default`/`const` equals `value`.
pub fn get_selected_option<'a>(
    enum_options: &'a [EnumOption],
    selector_field: &str,
    value: Option<&Value>,
) -> Option<&'a EnumOption> {
    let value = value?;
    enum_options.iter().find(|option| {
        branch_selector_value(&option.schema, selector_field)
            .is_some_and(|candidate| values_equal(candidate, value))
    })
}

type EnumOptionsKey = (u64, u64, u64, u64);

/// Remembers the last computed options, keyed by the content hashes of
/// schema, branch list, UI schema and form data.
#[derive(Debug, Default)]
pub struct EnumOptionsCache {
    entry: RefCell<Option<(EnumOptionsKey, Vec<EnumOption>)>>,
}

impl EnumOptionsCache {
    fn get_or_compute(
        &self,
        key: EnumOptionsKey,
        compute: impl FnOnce() -> Result<Vec<EnumOption>, LayoutError>,
    ) -> Result<Vec<EnumOption>, LayoutError> {
        if let Some((cached_key, options)) = self.entry.borrow().as_ref()
            && *cached_key == key
        {
            trace!("reusing memoized enum options");
            return Ok(options.clone());
        }
        let options = compute()?;
        *self.entry.borrow_mut() = Some((key, options.clone()));
        Ok(options)
    }
}

#[derive(Debug, Default)]
pub struct LayoutMultiSchemaField {
    cache: EnumOptionsCache,
}

impl LayoutMultiSchemaField {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selector property: `optionsSchemaSelector`, then the discriminator.
    pub fn selector_field<'a>(
        schema: &'a Value,
        ui_options: &'a Map<String, Value>,
    ) -> Option<&'a str> {
        ui_options
            .get(OPTIONS_SCHEMA_SELECTOR)
            .and_then(Value::as_str)
            .or_else(|| get_discriminator_field(schema))
    }

    fn enum_options(
        &self,
        utils: &dyn SchemaUtils,
        props: &MultiSchemaProps<'_>,
        selector_field: &str,
    ) -> Result<Vec<EnumOption>, LayoutError> {
        let options_hash = props
            .options
            .iter()
            .fold(hash_value(&Value::Null), |acc, option| {
                acc.rotate_left(5) ^ hash_value(option)
            });
        let key = (
            hash_value(props.schema),
            options_hash,
            hash_optional(props.ui_schema),
            hash_optional(props.form_data),
        );
        self.cache.get_or_compute(key, || {
            compute_enum_options(
                utils,
                props.schema,
                props.options,
                props.ui_schema,
                Some(selector_field),
                props.form_data,
            )
        })
    }

    /// Resolves the chooser widget for the current data.
    pub fn render(
        &self,
        utils: &dyn SchemaUtils,
        props: &MultiSchemaProps<'_>,
    ) -> Result<Chooser, LayoutError> {
        let ui_options = get_ui_options(props.ui_schema, props.global_ui_options);
        let Some(selector_field) = Self::selector_field(props.schema, &ui_options) else {
            return Err(LayoutError::NoSelectorField);
        };
        let enum_options = self.enum_options(utils, props, selector_field)?;

        let value = get_path_opt(props.form_data, selector_field).cloned();
        let selector_schema = |option: &EnumOption| {
            option
                .schema
                .get(PROPERTIES_KEY)
                .and_then(|properties| properties.get(selector_field))
                .cloned()
        };
        let option_schema = get_selected_option(&enum_options, selector_field, value.as_ref())
            .and_then(selector_schema)
            .or_else(|| enum_options.first().and_then(selector_schema))
            .unwrap_or_else(|| Value::Object(Map::new()));

        let mut widget_options = ui_options.clone();
        let widget = match widget_options.shift_remove("widget") {
            Some(Value::String(widget)) => widget,
            _ if props.has_discriminator => "radio".to_string(),
            _ => "select".to_string(),
        };
        let label = ui_options
            .get("title")
            .and_then(Value::as_str)
            .or_else(|| props.schema.get(TITLE_KEY).and_then(Value::as_str))
            .unwrap_or(props.name)
            .to_string();
        let raw_errors = props
            .error_schema
            .and_then(|errors| errors.get(ERRORS_KEY))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(Chooser {
            id: props.field_path_id.id.clone(),
            name: selector_field.to_string(),
            widget,
            label,
            value,
            disabled: props.disabled || props.options.is_empty(),
            enum_options,
            option_schema,
            ui_options: widget_options,
            readonly: props.readonly,
            required: props.required,
            raw_errors,
        })
    }

    /// Rewrites the form data for a newly selected branch.
    ///
    /// Data is sanitized from the old branch to the new one, the new
    /// branch's top-level defaults are merged in, and finally the selector
    /// property is set to `selected`.
    pub fn on_option_change(
        &self,
        utils: &dyn SchemaUtils,
        props: &MultiSchemaProps<'_>,
        selected: Option<&Value>,
    ) -> Result<FieldChange, LayoutError> {
        let ui_options = get_ui_options(props.ui_schema, props.global_ui_options);
        let Some(selector_field) = Self::selector_field(props.schema, &ui_options) else {
            return Err(LayoutError::NoSelectorField);
        };
        let enum_options = self.enum_options(utils, props, selector_field)?;
        let current = get_path_opt(props.form_data, selector_field);
        let new_option = get_selected_option(&enum_options, selector_field, selected);
        let old_option = get_selected_option(&enum_options, selector_field, current);
        debug!(
            selector = selector_field,
            from = old_option.map(|o| o.label.as_str()),
            to = new_option.map(|o| o.label.as_str()),
            "switching union branch"
        );

        let mut new_data = utils.sanitize_data_for_new_schema(
            new_option.map(|o| &o.schema),
            old_option.map(|o| &o.schema),
            props.form_data,
        );
        if let (Some(data), Some(option)) = (&new_data, new_option) {
            new_data =
                utils.get_default_form_state(&option.schema, Some(data), DefaultsMode::ExcludeObjectChildren);
        }
        if let Some(data) = new_data.as_mut() {
            set_path(data, selector_field, selected.cloned().unwrap_or(Value::Null));
        }
        Ok(FieldChange {
            value: new_data,
            path: props.field_path_id.path.clone(),
            id: props.field_path_id.id.clone(),
        })
    }
}
