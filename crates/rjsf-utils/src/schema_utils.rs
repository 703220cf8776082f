//! The schema-utility collaborator consumed by the layout interpreter.

use serde_json::Value;
use tracing::trace;

use crate::defaults::{DefaultsMode, get_default_form_state};
use crate::discriminator::{UnionKey, find_selected_branch};
use crate::error::UtilsError;
use crate::retrieve::retrieve_schema;
use crate::sanitize::sanitize_data_for_new_schema;
use crate::validator::{BasicValidator, SchemaValidator};

/// Schema operations bound to one root schema.
///
/// `None` stands for absent (`undefined`) data, distinct from JSON `null`.
pub trait SchemaUtils {
    fn root_schema(&self) -> &Value;

    /// Resolves `$ref`, `allOf` and `if`/`then`/`else` at the top of `schema`.
    fn retrieve_schema(&self, schema: &Value, form_data: Option<&Value>) -> Result<Value, UtilsError>;

    /// Finds the branch of `schema[union_key]` selected by the form data,
    /// using the discriminator or `fallback_field` as the selector.
    fn find_selected_branch(
        &self,
        schema: &Value,
        fallback_field: &str,
        union_key: UnionKey,
        form_data: Option<&Value>,
    ) -> Option<Value>;

    fn sanitize_data_for_new_schema(
        &self,
        new_schema: Option<&Value>,
        old_schema: Option<&Value>,
        data: Option<&Value>,
    ) -> Option<Value>;

    fn get_default_form_state(
        &self,
        schema: &Value,
        form_data: Option<&Value>,
        mode: DefaultsMode,
    ) -> Option<Value>;
}

/// [`SchemaUtils`] backed by the functions of this crate.
#[derive(Debug, Clone)]
pub struct DefaultSchemaUtils<V = BasicValidator> {
    root_schema: Value,
    validator: V,
}

impl DefaultSchemaUtils<BasicValidator> {
    pub fn new(root_schema: Value) -> Self {
        Self::with_validator(root_schema, BasicValidator)
    }
}

impl<V: SchemaValidator> DefaultSchemaUtils<V> {
    pub fn with_validator(root_schema: Value, validator: V) -> Self {
        Self {
            root_schema,
            validator,
        }
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }
}

impl<V: SchemaValidator> SchemaUtils for DefaultSchemaUtils<V> {
    fn root_schema(&self) -> &Value {
        &self.root_schema
    }

    fn retrieve_schema(&self, schema: &Value, form_data: Option<&Value>) -> Result<Value, UtilsError> {
        retrieve_schema(&self.validator, schema, &self.root_schema, form_data)
    }

    fn find_selected_branch(
        &self,
        schema: &Value,
        fallback_field: &str,
        union_key: UnionKey,
        form_data: Option<&Value>,
    ) -> Option<Value> {
        let branches = union_key.branches(schema)?;
        let retrieved: Vec<Value> = branches
            .iter()
            .map(|branch| {
                self.retrieve_schema(branch, form_data)
                    .unwrap_or_else(|_| branch.clone())
            })
            .collect();
        let selected = find_selected_branch(schema, &retrieved, fallback_field, form_data).cloned();
        trace!(
            union = union_key.as_str(),
            fallback_field,
            found = selected.is_some(),
            "selected union branch"
        );
        selected
    }

    fn sanitize_data_for_new_schema(
        &self,
        new_schema: Option<&Value>,
        old_schema: Option<&Value>,
        data: Option<&Value>,
    ) -> Option<Value> {
        sanitize_data_for_new_schema(&self.validator, &self.root_schema, new_schema, old_schema, data)
    }

    fn get_default_form_state(
        &self,
        schema: &Value,
        form_data: Option<&Value>,
        mode: DefaultsMode,
    ) -> Option<Value> {
        get_default_form_state(&self.validator, schema, &self.root_schema, form_data, mode)
    }
}
