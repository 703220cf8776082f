//! JSON Schema utilities for schema-driven forms.
//!
//! This crate provides the schema operations a form layout needs: `$ref`
//! retrieval, `oneOf`/`anyOf` discriminator handling, default form state,
//! branch sanitization, UI option flattening and field path identifiers.

pub mod constants;
mod defaults;
mod discriminator;
mod error;
mod hash;
mod path;
mod retrieve;
mod sanitize;
mod schema_utils;
mod ui_options;
mod validator;
pub mod value;

pub use defaults::{DefaultsMode, get_default_form_state, merge_defaults_with_form_data};
pub use discriminator::{
    UnionKey, branch_selector_value, find_selected_branch, get_discriminator_field,
};
pub use error::UtilsError;
pub use hash::{hash_object, hash_optional, hash_value};
pub use path::{FieldPath, FieldPathId, IdOptions, PathSegment};
pub use retrieve::{find_ref, merge_schemas, retrieve_schema};
pub use sanitize::sanitize_data_for_new_schema;
pub use schema_utils::{DefaultSchemaUtils, SchemaUtils};
pub use ui_options::get_ui_options;
pub use validator::{BasicValidator, SchemaValidator};
