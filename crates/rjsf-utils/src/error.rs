use thiserror::Error;

/// Errors raised by the schema utilities.
///
/// Callers that walk layout paths treat these as resolution misses; they only
/// surface from direct retrieval calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UtilsError {
    #[error("could not find a definition for {reference}")]
    UnresolvedReference { reference: String },

    #[error("unsupported reference {reference}: only local `#/...` pointers are resolved")]
    UnsupportedReference { reference: String },

    #[error("circular reference detected while resolving {reference}")]
    CircularReference { reference: String },
}
