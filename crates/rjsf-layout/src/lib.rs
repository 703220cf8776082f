//! Headless layout grid interpreter for JSON Schema driven forms.
//!
//! A grid description arranges the fields of an object schema into rows,
//! columns and conditional sections:
//!
//! ```json
//! {"ui:row": {"children": [
//!     {"ui:col": {"className": "half", "children": ["name"]}},
//!     {"ui:condition": {"field": "kind", "value": "dog", "operator": "all",
//!                       "children": ["breed"]}}
//! ]}}
//! ```
//!
//! [`LayoutGridField`] evaluates such a description against a schema, UI
//! schema and form data and returns a tree of [`LayoutNode`]s: grid
//! containers, resolved leaf fields, union choosers and custom renderer
//! output. Leaves are located with [`SchemaPathResolver`], which follows
//! `$ref`s, array items and the `oneOf`/`anyOf` branch selected by the data.

mod compose;
mod condition;
mod config;
mod error;
mod grid;
mod layout_grid;
mod lookup;
mod multi_schema;
mod node;
mod readonly;
mod resolver;

pub use compose::{ComposedUiSchema, compute_field_ui_schema};
pub use condition::{Operator, condition_matches};
pub use config::LayoutConfig;
pub use error::{GridSchemaError, LayoutError};
pub use grid::{
    ChildrenAndProps, GridCondition, GridContainer, GridKind, GridLeaf, GridNode, RenderRef,
    find_children_and_props,
};
pub use layout_grid::{
    LAYOUT_GRID_OPTION, LAYOUT_MULTI_SCHEMA_FIELD, LayoutGridField, LayoutGridProps,
};
pub use lookup::{
    CustomRenderProps, CustomRenderer, FormContext, LOOKUP_PREFIX, LookupTable,
    resolve_class_names, resolve_lookup_props,
};
pub use multi_schema::{
    Chooser, EnumOption, EnumOptionsCache, FieldChange, LayoutMultiSchemaField, MultiSchemaProps,
    OPTIONS_SCHEMA_SELECTOR, compute_enum_options, get_selected_option,
};
pub use node::{CustomElement, FieldElement, GridElement, LayoutNode, MultiSchemaElement};
pub use readonly::TriState;
pub use resolver::{OptionsInfo, ResolvedFieldInfo, SchemaCache, SchemaPathResolver};
