use std::sync::Arc;

use rjsf_layout::{
    CustomRenderProps, CustomRenderer, GridLeaf, GridNode, LayoutConfig, LayoutError,
    LayoutGridField, LayoutGridProps, LayoutNode, LookupTable, RenderRef, SchemaCache,
};
use rjsf_utils::{DefaultSchemaUtils, FieldPathId, IdOptions};
use serde_json::{Value, json};

// =============================================================================
// Helpers
// =============================================================================

struct Form {
    schema: Value,
    ui_schema: Value,
    form_data: Value,
    error_schema: Option<Value>,
    readonly: bool,
    context: LookupTable,
    config: LayoutConfig,
}

impl Form {
    fn new(schema: Value) -> Self {
        Self {
            schema,
            ui_schema: json!({}),
            form_data: json!({}),
            error_schema: None,
            readonly: false,
            context: LookupTable::default(),
            config: LayoutConfig::default(),
        }
    }

    fn ui(mut self, ui_schema: Value) -> Self {
        self.ui_schema = ui_schema;
        self
    }

    fn data(mut self, form_data: Value) -> Self {
        self.form_data = form_data;
        self
    }

    fn render(&self, grid: Value) -> Result<Vec<LayoutNode>, LayoutError> {
        let utils = DefaultSchemaUtils::new(self.schema.clone());
        let field = LayoutGridField::new(&utils, &self.context, &self.config);
        let root = FieldPathId::root(&self.config.ids);
        field.render_grid(&grid, &self.props(&root))
    }

    fn props<'a>(&'a self, root: &'a FieldPathId) -> LayoutGridProps<'a> {
        LayoutGridProps {
            schema: &self.schema,
            ui_schema: Some(&self.ui_schema),
            form_data: Some(&self.form_data),
            error_schema: self.error_schema.as_ref(),
            field_path_id: root,
            readonly: self.readonly,
            disabled: false,
        }
    }
}

fn grid(node: &LayoutNode) -> &rjsf_layout::GridElement {
    match node {
        LayoutNode::Grid(grid) => grid,
        other => panic!("expected grid element, got {other:?}"),
    }
}

fn field(node: &LayoutNode) -> &rjsf_layout::FieldElement {
    match node {
        LayoutNode::Field(field) => field,
        other => panic!("expected field element, got {other:?}"),
    }
}

fn person_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"type": "string"},
            "age": {"type": "number"}
        }
    })
}

// =============================================================================
// Containers
// =============================================================================

#[test]
fn test_row_of_columns_renders_sibling_fields() {
    let nodes = Form::new(person_schema())
        .render(json!({"row": {"children": [
            {"col": {"children": ["name"]}},
            {"col": {"children": ["age"]}}
        ]}}))
        .unwrap();
    assert_eq!(nodes.len(), 1);
    let row = grid(&nodes[0]);
    assert!(!row.column);
    assert_eq!(row.children.len(), 2);
    let names: Vec<_> = row
        .children
        .iter()
        .map(|column| {
            let column = grid(column);
            assert!(column.column);
            assert_eq!(column.children.len(), 1);
            field(&column.children[0]).name.clone()
        })
        .collect();
    assert_eq!(names, ["name", "age"]);
}

#[test]
fn test_columns_shorthand_wraps_each_child() {
    let nodes = Form::new(json!({"properties": {"a": {"type": "string"}, "b": {"type": "string"}}}))
        .render(json!({"columns": {"className": "w-6", "children": ["a", "b"]}}))
        .unwrap();
    assert_eq!(nodes.len(), 2);
    for (node, name) in nodes.iter().zip(["a", "b"]) {
        let column = grid(node);
        assert!(column.column);
        assert_eq!(column.class_name.as_deref(), Some("w-6"));
        assert_eq!(column.children.len(), 1);
        assert_eq!(field(&column.children[0]).name, name);
    }
}

#[test]
fn test_class_name_tokens_resolved_through_context() {
    let mut form = Form::new(person_schema());
    form.context.insert_value("half", json!("col-6 col-md-3"));
    let nodes = form
        .render(json!({"ui:col": {"className": "half padded", "children": ["name"]}}))
        .unwrap();
    assert_eq!(grid(&nodes[0]).class_name.as_deref(), Some("col-6 col-md-3 padded"));
}

#[test]
fn test_container_children_must_be_array() {
    let err = Form::new(person_schema())
        .render(json!({"row": {"children": "name"}}))
        .unwrap_err();
    assert!(matches!(err, LayoutError::Grid(_)));
    assert_eq!(
        err.to_string(),
        r#"Expected array for "row" in {"children":"name"}"#
    );
}

// =============================================================================
// Conditions
// =============================================================================

fn pet_form(kind: &str) -> Form {
    Form::new(json!({"properties": {
        "type": {"type": "string"},
        "breed": {"type": "string"}
    }}))
    .data(json!({"type": kind}))
}

#[test]
fn test_condition_renders_children_when_matched() {
    let grid_description = json!({"condition": {
        "field": "type", "value": "dog", "operator": "ALL", "children": ["breed"]
    }});
    let nodes = pet_form("dog").render(grid_description.clone()).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(field(&nodes[0]).name, "breed");

    let nodes = pet_form("cat").render(grid_description).unwrap();
    assert!(nodes.is_empty());
}

#[test]
fn test_condition_on_absent_data_never_matches_empty_value() {
    let nodes = Form::new(json!({"properties": {"x": {"type": "string"}}}))
        .render(json!({"condition": {"field": "missing", "operator": "all", "children": ["x"]}}))
        .unwrap();
    assert!(nodes.is_empty());
}

#[test]
fn test_condition_without_operator_hides_children() {
    let nodes = pet_form("dog")
        .render(json!({"condition": {"field": "type", "value": "dog", "children": ["breed"]}}))
        .unwrap();
    assert!(nodes.is_empty());
}

#[test]
fn test_condition_none_operator() {
    let nodes = pet_form("cat")
        .render(json!({"condition": {
            "field": "type", "value": ["dog", "wolf"], "operator": "NONE", "children": ["breed"]
        }}))
        .unwrap();
    assert_eq!(nodes.len(), 1);
}

// =============================================================================
// Leaves
// =============================================================================

#[test]
fn test_leaf_carries_resolved_details() {
    let mut form = Form::new(person_schema())
        .ui(json!({"name": {"ui:widget": "text"}}))
        .data(json!({"name": "Ann"}));
    form.error_schema = Some(json!({"name": {"__errors": ["too short"]}}));
    let nodes = form.render(json!({"name": "name", "label": "Full name"})).unwrap();
    let name = field(&nodes[0]);
    assert_eq!(name.field_path_id.id, "root_name");
    assert!(name.required);
    assert_eq!(name.form_data, Some(json!("Ann")));
    assert_eq!(name.error_schema, Some(json!({"__errors": ["too short"]})));
    assert_eq!(
        Value::Object(name.ui_schema.clone()),
        json!({"ui:widget": "text", "ui:options": {"label": "Full name"}})
    );
    assert!(name.key.starts_with("layoutGrid-"));
}

#[test]
fn test_lookup_props_resolved_on_leaves() {
    let mut form = Form::new(person_schema());
    form.context.insert_value("ageLabel", json!("Years"));
    let nodes = form.render(json!({"name": "age", "title": "$lookup=ageLabel"})).unwrap();
    assert_eq!(
        field(&nodes[0]).ui_schema["ui:options"],
        json!({"title": "Years"})
    );
}

#[test]
fn test_array_items_get_index_segments() {
    let nodes = Form::new(json!({"properties": {
        "pets": {"type": "array", "items": {"type": "object", "properties": {"name": {"type": "string"}}}}
    }}))
    .data(json!({"pets": [{"name": "Rex"}, {"name": "Tom"}]}))
    .render(json!({"row": ["pets.1.name"]}))
    .unwrap();
    let leaf = field(&grid(&nodes[0]).children[0]);
    assert_eq!(leaf.field_path_id.id, "root_pets_1_name");
    assert_eq!(leaf.form_data, Some(json!("Tom")));
}

#[test]
fn test_custom_id_separator() {
    let mut form = Form::new(json!({"properties": {"a": {"properties": {"b": {"type": "string"}}}}}));
    form.config.ids = IdOptions {
        id_prefix: "form".to_string(),
        id_separator: ".".to_string(),
    };
    let nodes = form.render(json!("a.b")).unwrap();
    assert_eq!(field(&nodes[0]).field_path_id.id, "form.a.b");
}

#[test]
fn test_forced_readonly_reaches_every_leaf() {
    let mut form = Form::new(person_schema()).ui(json!({"age": {"ui:readonly": false}}));
    form.readonly = true;
    let nodes = form.render(json!({"row": ["name", "age"]})).unwrap();
    for leaf in grid(&nodes[0]).children.iter().map(field) {
        assert_eq!(leaf.readonly, Some(true));
        assert_eq!(leaf.ui_schema["ui:readonly"], json!(true));
    }
}

#[test]
fn test_schema_readonly_yields_to_explicit_ui_false() {
    let form = Form::new(json!({
        "readOnly": true,
        "properties": {"a": {"type": "string"}, "b": {"type": "string"}}
    }))
    .ui(json!({"b": {"ui:readonly": false}}));
    let nodes = form.render(json!({"row": ["a", "b"]})).unwrap();
    let children = &grid(&nodes[0]).children;
    assert_eq!(field(&children[0]).readonly, Some(true));
    assert_eq!(field(&children[1]).readonly, Some(false));
}

#[test]
fn test_global_options_override_leaf_props() {
    let nodes = Form::new(person_schema())
        .ui(json!({"ui:globalOptions": {"label": false}}))
        .render(json!({"name": "name", "label": true}))
        .unwrap();
    let ui_schema = &field(&nodes[0]).ui_schema;
    assert_eq!(ui_schema["ui:options"], json!({"label": false}));
    assert_eq!(ui_schema["ui:globalOptions"], json!({"label": false}));
}

// =============================================================================
// Custom renderers
// =============================================================================

#[derive(Debug)]
struct Heading;

impl CustomRenderer for Heading {
    fn name(&self) -> &str {
        "Heading"
    }

    fn render(&self, props: &CustomRenderProps) -> Value {
        json!({
            "text": props.ui_props.get("text"),
            "for": props.name,
            "id": props.field_path_id.id,
        })
    }
}

#[test]
fn test_named_renderer_without_field() {
    let mut form = Form::new(person_schema());
    form.context = LookupTable::default().with_renderer(Arc::new(Heading));
    let nodes = form
        .render(json!({"row": [{"render": "Heading", "text": "Details"}, "name"]}))
        .unwrap();
    let children = &grid(&nodes[0]).children;
    assert_eq!(children.len(), 2);
    let LayoutNode::Custom(custom) = &children[0] else {
        panic!("expected custom element");
    };
    assert_eq!(custom.renderer, "Heading");
    assert_eq!(custom.output, json!({"text": "Details", "for": null, "id": "root"}));
}

#[test]
fn test_renderer_falls_back_when_field_missing() {
    let mut form = Form::new(person_schema());
    form.context = LookupTable::default().with_renderer(Arc::new(Heading));
    let nodes = form
        .render(json!({"name": "nickname", "render": "Heading", "text": "Later"}))
        .unwrap();
    let LayoutNode::Custom(custom) = &nodes[0] else {
        panic!("expected custom element");
    };
    assert_eq!(
        custom.output,
        json!({"text": "Later", "for": "nickname", "id": "root_nickname"})
    );
}

#[test]
fn test_resolved_field_wins_over_renderer() {
    let mut form = Form::new(person_schema());
    form.context = LookupTable::default().with_renderer(Arc::new(Heading));
    let nodes = form.render(json!({"name": "name", "render": "Heading"})).unwrap();
    assert!(matches!(nodes[0], LayoutNode::Field(_)));
}

#[test]
fn test_unknown_renderer_renders_nothing() {
    let nodes = Form::new(person_schema())
        .render(json!({"render": "Missing"}))
        .unwrap();
    assert!(nodes.is_empty());
}

#[test]
fn test_component_renderer_supplied_directly() {
    let form = Form::new(person_schema());
    let utils = DefaultSchemaUtils::new(form.schema.clone());
    let field = LayoutGridField::new(&utils, &form.context, &form.config);
    let root = FieldPathId::root(&form.config.ids);
    let node = GridNode::Leaf(GridLeaf {
        render: Some(RenderRef::Component(Arc::new(Heading))),
        ..GridLeaf::default()
    });
    let nodes = field
        .render_node(&node, &form.props(&root), &SchemaCache::new())
        .unwrap();
    assert!(matches!(&nodes[0], LayoutNode::Custom(custom) if custom.renderer == "Heading"));
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_identical_inputs_render_identical_trees() {
    let form = Form::new(json!({
        "definitions": {"pet": {"type": "object", "properties": {"kind": {"type": "string"}}}},
        "properties": {
            "name": {"type": "string"},
            "pet": {"$ref": "#/definitions/pet"}
        }
    }))
    .data(json!({"pet": {"kind": "dog"}}));
    let description = json!({"row": {"children": [
        {"columns": {"children": ["name", "pet.kind"]}},
        {"condition": {"field": "pet.kind", "value": "dog", "operator": "some", "children": ["name"]}}
    ]}});
    let first = form.render(description.clone()).unwrap();
    let second = form.render(description).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_keys_stable_across_alias_spellings() {
    let form = Form::new(person_schema());
    let bare = form.render(json!({"row": ["name"]})).unwrap();
    let prefixed = form.render(json!({"ui:row": {"children": ["name"]}})).unwrap();
    assert_eq!(bare[0].key(), prefixed[0].key());
}
