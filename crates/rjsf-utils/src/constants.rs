//! Keyword constants shared by the schema utilities and the layout interpreter.

pub const REF_KEY: &str = "$ref";
pub const DEFINITIONS_KEY: &str = "definitions";
pub const DEFS_KEY: &str = "$defs";
pub const PROPERTIES_KEY: &str = "properties";
pub const ITEMS_KEY: &str = "items";
pub const REQUIRED_KEY: &str = "required";
pub const READONLY_KEY: &str = "readOnly";
pub const ONE_OF_KEY: &str = "oneOf";
pub const ANY_OF_KEY: &str = "anyOf";
pub const ALL_OF_KEY: &str = "allOf";
pub const IF_KEY: &str = "if";
pub const THEN_KEY: &str = "then";
pub const ELSE_KEY: &str = "else";
pub const TYPE_KEY: &str = "type";
pub const DEFAULT_KEY: &str = "default";
pub const CONST_KEY: &str = "const";
pub const ENUM_KEY: &str = "enum";
pub const TITLE_KEY: &str = "title";
pub const MAX_ITEMS_KEY: &str = "maxItems";
pub const DISCRIMINATOR_KEY: &str = "discriminator";
pub const PROPERTY_NAME_KEY: &str = "propertyName";

pub const UI_OPTIONS_KEY: &str = "ui:options";
pub const UI_WIDGET_KEY: &str = "ui:widget";
pub const UI_FIELD_KEY: &str = "ui:field";
pub const UI_READONLY_KEY: &str = "ui:readonly";
pub const UI_GLOBAL_OPTIONS_KEY: &str = "ui:globalOptions";
pub const UI_PREFIX: &str = "ui:";

/// Key under which a field's error messages live inside an error schema.
pub const ERRORS_KEY: &str = "__errors";
