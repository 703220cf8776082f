//! Typed grid descriptions.
//!
//! A grid description is plain JSON. Objects carrying one of the reserved
//! keys below are containers or conditions; strings and all other objects
//! are leaves.
//!
//! ```json
//! {"ui:row": {"className": "g-2", "children": [
//!     {"ui:col": ["name"]},
//!     {"ui:condition": {"field": "kind", "value": "dog", "operator": "all",
//!                       "children": [{"name": "breed", "label": false}]}}
//! ]}}
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::condition::Operator;
use crate::error::GridSchemaError;
use crate::lookup::CustomRenderer;

pub const CHILDREN_KEY: &str = "children";
pub const CLASS_NAME_KEY: &str = "className";
pub const NAME_KEY: &str = "name";
pub const RENDER_KEY: &str = "render";
pub const FIELD_KEY: &str = "field";
pub const VALUE_KEY: &str = "value";
pub const OPERATOR_KEY: &str = "operator";

/// The node kinds a reserved key can introduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridKind {
    Row,
    Column,
    Columns,
    Condition,
}

impl GridKind {
    const ALL: [GridKind; 4] = [
        GridKind::Row,
        GridKind::Column,
        GridKind::Columns,
        GridKind::Condition,
    ];

    /// The canonical reserved key.
    pub fn key(self) -> &'static str {
        match self {
            GridKind::Row => "ui:row",
            GridKind::Column => "ui:col",
            GridKind::Columns => "ui:columns",
            GridKind::Condition => "ui:condition",
        }
    }

    /// Accepts both the `ui:`-prefixed and the bare spelling.
    pub fn from_key(key: &str) -> Option<GridKind> {
        let bare = key.strip_prefix("ui:").unwrap_or(key);
        GridKind::ALL
            .into_iter()
            .find(|kind| &kind.key()[3..] == bare)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridNode {
    Row(GridContainer),
    Column(GridContainer),
    Columns(GridContainer),
    Condition(GridCondition),
    Leaf(GridLeaf),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridContainer {
    pub class_name: Option<String>,
    pub props: Map<String, Value>,
    pub children: Vec<GridNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCondition {
    pub field: String,
    pub value: Value,
    /// `None` when absent or unrecognized; such conditions never match.
    pub operator: Option<Operator>,
    pub props: Map<String, Value>,
    pub children: Vec<GridNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLeaf {
    pub name: Option<String>,
    pub render: Option<RenderRef>,
    pub props: Map<String, Value>,
}

impl GridLeaf {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// A custom renderer, either registered by name in the form context or
/// supplied directly.
#[derive(Debug, Clone)]
pub enum RenderRef {
    Named(String),
    Component(Arc<dyn CustomRenderer>),
}

impl RenderRef {
    pub fn name(&self) -> &str {
        match self {
            RenderRef::Named(name) => name,
            RenderRef::Component(component) => component.name(),
        }
    }
}

impl PartialEq for RenderRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RenderRef::Named(a), RenderRef::Named(b)) => a == b,
            (RenderRef::Component(a), RenderRef::Component(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Children and remaining props of a container value.
pub struct ChildrenAndProps<'a> {
    pub children: &'a [Value],
    pub props: Map<String, Value>,
}

/// Splits a container value into its `children` array and the other props.
///
/// An array value is taken as the children with no props.
pub fn find_children_and_props<'a>(
    key: &str,
    value: &'a Value,
) -> Result<ChildrenAndProps<'a>, GridSchemaError> {
    let object = match value {
        Value::Array(children) => {
            return Ok(ChildrenAndProps {
                children,
                props: Map::new(),
            });
        }
        Value::Object(object) => object,
        other => {
            return Err(GridSchemaError::ChildrenNotArray {
                key: key.to_string(),
                node: other.to_string(),
            });
        }
    };
    let Some(Value::Array(children)) = object.get(CHILDREN_KEY) else {
        return Err(GridSchemaError::ChildrenNotArray {
            key: key.to_string(),
            node: value.to_string(),
        });
    };
    let props = object
        .iter()
        .filter(|(k, _)| k.as_str() != CHILDREN_KEY)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok(ChildrenAndProps { children, props })
}

impl GridNode {
    /// Parses one grid description node.
    pub fn parse(value: &Value) -> Result<GridNode, GridSchemaError> {
        match value {
            Value::String(name) => Ok(GridNode::Leaf(GridLeaf::named(name.clone()))),
            Value::Object(object) => {
                let mut kinds = object
                    .iter()
                    .filter_map(|(key, inner)| GridKind::from_key(key).map(|kind| (key, kind, inner)));
                match (kinds.next(), kinds.next()) {
                    (None, _) => Ok(GridNode::Leaf(parse_leaf(object))),
                    (Some((key, kind, inner)), None) => parse_kind(key, kind, inner),
                    (Some(_), Some(_)) => Err(GridSchemaError::MultipleKinds {
                        keys: object
                            .keys()
                            .filter(|key| GridKind::from_key(key).is_some())
                            .cloned()
                            .collect(),
                    }),
                }
            }
            other => Err(GridSchemaError::InvalidNode {
                node: other.to_string(),
            }),
        }
    }

    /// Canonical JSON form, with `ui:`-prefixed reserved keys.
    ///
    /// Directly supplied renderers are written by name.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        match self {
            GridNode::Row(container) => {
                object.insert(GridKind::Row.key().to_string(), container.to_value());
            }
            GridNode::Column(container) => {
                object.insert(GridKind::Column.key().to_string(), container.to_value());
            }
            GridNode::Columns(container) => {
                object.insert(GridKind::Columns.key().to_string(), container.to_value());
            }
            GridNode::Condition(condition) => {
                let mut inner = condition.props.clone();
                inner.insert(FIELD_KEY.to_string(), Value::String(condition.field.clone()));
                inner.insert(VALUE_KEY.to_string(), condition.value.clone());
                if let Some(operator) = condition.operator {
                    inner.insert(OPERATOR_KEY.to_string(), Value::String(operator.to_string()));
                }
                inner.insert(CHILDREN_KEY.to_string(), children_value(&condition.children));
                object.insert(GridKind::Condition.key().to_string(), Value::Object(inner));
            }
            GridNode::Leaf(leaf) => {
                if leaf.render.is_none() && leaf.props.is_empty()
                    && let Some(name) = &leaf.name
                {
                    return Value::String(name.clone());
                }
                object = leaf.props.clone();
                if let Some(name) = &leaf.name {
                    object.insert(NAME_KEY.to_string(), Value::String(name.clone()));
                }
                if let Some(render) = &leaf.render {
                    object.insert(RENDER_KEY.to_string(), Value::String(render.name().to_string()));
                }
            }
        }
        Value::Object(object)
    }
}

impl GridContainer {
    /// Moves a string `className` out of `props`.
    fn new(mut props: Map<String, Value>, children: Vec<GridNode>) -> Self {
        let class_name = match props.shift_remove(CLASS_NAME_KEY) {
            Some(Value::String(class_name)) => Some(class_name),
            Some(other) => {
                props.insert(CLASS_NAME_KEY.to_string(), other);
                None
            }
            None => None,
        };
        Self {
            class_name,
            props,
            children,
        }
    }

    fn to_value(&self) -> Value {
        let mut inner = self.props.clone();
        if let Some(class_name) = &self.class_name {
            inner.insert(CLASS_NAME_KEY.to_string(), Value::String(class_name.clone()));
        }
        inner.insert(CHILDREN_KEY.to_string(), children_value(&self.children));
        Value::Object(inner)
    }
}

fn children_value(children: &[GridNode]) -> Value {
    Value::Array(children.iter().map(GridNode::to_value).collect())
}

fn parse_children(children: &[Value]) -> Result<Vec<GridNode>, GridSchemaError> {
    children.iter().map(GridNode::parse).collect()
}

fn parse_kind(key: &str, kind: GridKind, inner: &Value) -> Result<GridNode, GridSchemaError> {
    let ChildrenAndProps { children, props } = find_children_and_props(key, inner)?;
    let children = parse_children(children)?;
    Ok(match kind {
        GridKind::Row => GridNode::Row(GridContainer::new(props, children)),
        GridKind::Column => GridNode::Column(GridContainer::new(props, children)),
        GridKind::Columns => GridNode::Columns(GridContainer::new(props, children)),
        GridKind::Condition => return parse_condition(props, children),
    })
}

fn parse_condition(
    mut props: Map<String, Value>,
    children: Vec<GridNode>,
) -> Result<GridNode, GridSchemaError> {
    let field = match props.shift_remove(FIELD_KEY) {
        Some(Value::String(field)) => field,
        Some(other) => {
            return Err(GridSchemaError::InvalidCondition {
                reason: format!("\"field\" must be a string, found {other}"),
            });
        }
        None => {
            return Err(GridSchemaError::InvalidCondition {
                reason: "missing \"field\"".to_string(),
            });
        }
    };
    let value = props
        .shift_remove(VALUE_KEY)
        .unwrap_or_else(|| Value::String(String::new()));
    let operator = match props.shift_remove(OPERATOR_KEY) {
        Some(Value::String(name)) => {
            let operator = Operator::parse(&name);
            if operator.is_none() {
                warn!(operator = %name, field = %field, "unknown condition operator, condition will not match");
            }
            operator
        }
        Some(other) => {
            warn!(operator = %other, field = %field, "non-string condition operator, condition will not match");
            None
        }
        None => None,
    };
    Ok(GridNode::Condition(GridCondition {
        field,
        value,
        operator,
        props,
        children,
    }))
}

fn parse_leaf(object: &Map<String, Value>) -> GridLeaf {
    let mut props = object.clone();
    let name = match props.shift_remove(NAME_KEY) {
        Some(Value::String(name)) if !name.is_empty() => Some(name),
        Some(Value::String(_)) | None => None,
        Some(other) => {
            props.insert(NAME_KEY.to_string(), other);
            None
        }
    };
    let render = match props.shift_remove(RENDER_KEY) {
        Some(Value::String(render)) => Some(RenderRef::Named(render)),
        Some(other) => {
            warn!(render = %other, "leaf render reference must be a string, ignoring it");
            None
        }
        None => None,
    };
    GridLeaf {
        name,
        render,
        props,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_is_leaf() {
        assert_eq!(
            GridNode::parse(&json!("person.name")).unwrap(),
            GridNode::Leaf(GridLeaf::named("person.name"))
        );
    }

    #[test]
    fn test_bare_and_prefixed_keys_parse_alike() {
        let bare = GridNode::parse(&json!({"row": {"children": ["a"]}})).unwrap();
        let prefixed = GridNode::parse(&json!({"ui:row": {"children": ["a"]}})).unwrap();
        assert_eq!(bare, prefixed);
    }

    #[test]
    fn test_container_props_and_class_name() {
        let node = GridNode::parse(&json!({"ui:col": {"className": "w-6", "xs": 12, "children": ["a"]}})).unwrap();
        let GridNode::Column(container) = node else {
            panic!("expected column");
        };
        assert_eq!(container.class_name.as_deref(), Some("w-6"));
        assert_eq!(Value::Object(container.props), json!({"xs": 12}));
        assert_eq!(container.children.len(), 1);
    }

    #[test]
    fn test_array_form_container() {
        let node = GridNode::parse(&json!({"columns": ["a", "b"]})).unwrap();
        let GridNode::Columns(container) = node else {
            panic!("expected columns");
        };
        assert!(container.props.is_empty());
        assert_eq!(container.children.len(), 2);
    }

    #[test]
    fn test_children_must_be_array() {
        let err = GridNode::parse(&json!({"ui:row": {"children": "a"}})).unwrap_err();
        assert!(matches!(err, GridSchemaError::ChildrenNotArray { ref key, .. } if key == "ui:row"));
        let err = GridNode::parse(&json!({"row": {"className": "x"}})).unwrap_err();
        assert!(matches!(err, GridSchemaError::ChildrenNotArray { .. }));
    }

    #[test]
    fn test_multiple_kinds_rejected() {
        let err = GridNode::parse(&json!({"row": ["a"], "ui:col": ["b"]})).unwrap_err();
        assert_eq!(
            err,
            GridSchemaError::MultipleKinds {
                keys: vec!["row".to_string(), "ui:col".to_string()]
            }
        );
    }

    #[test]
    fn test_invalid_nodes_rejected() {
        assert!(matches!(
            GridNode::parse(&json!(42)),
            Err(GridSchemaError::InvalidNode { .. })
        ));
        assert!(matches!(
            GridNode::parse(&json!({"row": ["a", null]})),
            Err(GridSchemaError::InvalidNode { .. })
        ));
    }

    #[test]
    fn test_condition_defaults() {
        let node = GridNode::parse(&json!({"condition": {"field": "kind", "children": ["x"]}})).unwrap();
        let GridNode::Condition(condition) = node else {
            panic!("expected condition");
        };
        assert_eq!(condition.value, json!(""));
        assert_eq!(condition.operator, None);
    }

    #[test]
    fn test_condition_unknown_operator_is_none() {
        let node = GridNode::parse(&json!({"condition": {
            "field": "kind", "value": ["a"], "operator": "ANY", "children": []
        }}))
        .unwrap();
        let GridNode::Condition(condition) = node else {
            panic!("expected condition");
        };
        assert_eq!(condition.operator, None);
        let node = GridNode::parse(&json!({"condition": {
            "field": "kind", "value": "a", "operator": "ALL", "children": []
        }}))
        .unwrap();
        let GridNode::Condition(condition) = node else {
            panic!("expected condition");
        };
        assert_eq!(condition.operator, Some(Operator::All));
    }

    #[test]
    fn test_condition_requires_field() {
        let err = GridNode::parse(&json!({"condition": {"value": "a", "children": []}})).unwrap_err();
        assert!(matches!(err, GridSchemaError::InvalidCondition { .. }));
    }

    #[test]
    fn test_leaf_object() {
        let node = GridNode::parse(&json!({"name": "a", "render": "Banner", "label": false})).unwrap();
        assert_eq!(
            node,
            GridNode::Leaf(GridLeaf {
                name: Some("a".to_string()),
                render: Some(RenderRef::Named("Banner".to_string())),
                props: json!({"label": false}).as_object().cloned().unwrap(),
            })
        );
    }

    #[test]
    fn test_canonical_value_normalizes_aliases() {
        let bare = GridNode::parse(&json!({"row": {"className": "g", "children": ["a", {"col": ["b"]}]}})).unwrap();
        assert_eq!(
            bare.to_value(),
            json!({"ui:row": {"className": "g", "children": ["a", {"ui:col": {"children": ["b"]}}]}})
        );
        assert_eq!(GridNode::parse(&bare.to_value()).unwrap(), bare);
    }
}
