use thiserror::Error;

/// Malformed grid descriptions, detected while parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GridSchemaError {
    #[error("Expected array for \"{key}\" in {node}")]
    ChildrenNotArray { key: String, node: String },

    #[error("grid node declares more than one layout kind: {}", keys.join(", "))]
    MultipleKinds { keys: Vec<String> },

    #[error("invalid grid node: {node}")]
    InvalidNode { node: String },

    #[error("invalid condition: {reason}")]
    InvalidCondition { reason: String },
}

/// Configuration errors that abort a render pass.
///
/// Resolution misses never show up here; they render nothing instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error(transparent)]
    Grid(#[from] GridSchemaError),

    #[error("No selector field provided for the LayoutMultiSchemaField")]
    NoSelectorField,

    #[error("No enumOptions were computed from the schema {schema}")]
    NoEnumOptions { schema: String },
}
