//! The rendered layout tree.

use rjsf_utils::FieldPathId;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::multi_schema::Chooser;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayoutNode {
    Grid(GridElement),
    Field(FieldElement),
    MultiSchemaField(MultiSchemaElement),
    Custom(CustomElement),
}

/// A row (`column == false`) or column container.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridElement {
    pub key: String,
    pub column: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub props: Map<String, Value>,
    pub children: Vec<LayoutNode>,
}

/// Everything the leaf field renderer receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldElement {
    pub key: String,
    pub name: String,
    pub field_path_id: FieldPathId,
    pub schema: Value,
    pub ui_schema: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_data: Option<Value>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSchemaElement {
    #[serde(flatten)]
    pub field: FieldElement,
    pub chooser: Chooser,
}

/// Output of a custom renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomElement {
    pub key: String,
    pub renderer: String,
    pub props: Map<String, Value>,
    pub output: Value,
}

impl LayoutNode {
    pub fn key(&self) -> &str {
        match self {
            LayoutNode::Grid(grid) => &grid.key,
            LayoutNode::Field(field) => &field.key,
            LayoutNode::MultiSchemaField(multi) => &multi.field.key,
            LayoutNode::Custom(custom) => &custom.key,
        }
    }

    /// Every field element in this subtree, in render order.
    pub fn fields(&self) -> Vec<&FieldElement> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, fields: &mut Vec<&'a FieldElement>) {
        match self {
            LayoutNode::Grid(grid) => {
                for child in &grid.children {
                    child.collect_fields(fields);
                }
            }
            LayoutNode::Field(field) => fields.push(field),
            LayoutNode::MultiSchemaField(multi) => fields.push(&multi.field),
            LayoutNode::Custom(_) => {}
        }
    }
}
