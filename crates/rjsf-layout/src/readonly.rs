use rjsf_utils::constants::READONLY_KEY;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A boolean that may be unset, used for readonly inheritance.
///
/// A set value always wins over an inherited one; `Unset` defers to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriState {
    #[default]
    Unset,
    True,
    False,
}

impl TriState {
    /// Reads `readOnly` from a schema; non-boolean values count as unset.
    pub fn from_schema(schema: &Value) -> TriState {
        schema
            .get(READONLY_KEY)
            .and_then(Value::as_bool)
            .into()
    }

    /// `self` if set, otherwise `parent`.
    pub fn inherit(self, parent: TriState) -> TriState {
        match self {
            TriState::Unset => parent,
            set => set,
        }
    }

    pub fn is_true(self) -> bool {
        self == TriState::True
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            TriState::Unset => None,
            TriState::True => Some(true),
            TriState::False => Some(false),
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => TriState::Unset,
            Some(true) => TriState::True,
            Some(false) => TriState::False,
        }
    }
}

impl Serialize for TriState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}
