//! Set comparison operators for conditional grid nodes.

use core::fmt::Display;

use rjsf_utils::value::{compare_values, values_equal};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Data and value hold exactly the same elements.
    All,
    /// Data and value share at least one element.
    Some,
    /// Data and value share no element.
    None,
}

impl Operator {
    /// Parses `all` / `some` / `none`, ignoring case.
    pub fn parse(name: &str) -> Option<Operator> {
        match name.to_ascii_lowercase().as_str() {
            "all" => Some(Operator::All),
            "some" => Some(Operator::Some),
            "none" => Some(Operator::None),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::All => "all",
            Operator::Some => "some",
            Operator::None => "none",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps scalars in a one-element list, flattens one level of arrays and sorts.
fn as_sorted_list(value: &Value) -> Vec<&Value> {
    let mut items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items.sort_by(|a, b| compare_values(a, b));
    items
}

fn contains(list: &[&Value], needle: &Value) -> bool {
    list.iter().any(|item| values_equal(item, needle))
}

/// Compares `datum` with `value` as sets under `operator`.
///
/// A missing operator never matches.
pub fn condition_matches(operator: Option<Operator>, datum: &Value, value: &Value) -> bool {
    let data = as_sorted_list(datum);
    let values = as_sorted_list(value);
    match operator {
        Some(Operator::All) => {
            data.len() == values.len() && data.iter().zip(&values).all(|(a, b)| values_equal(a, b))
        }
        Some(Operator::Some) => data.iter().any(|d| contains(&values, d)),
        Some(Operator::None) => data.iter().all(|d| !contains(&values, d)),
        None => false,
    }
}
