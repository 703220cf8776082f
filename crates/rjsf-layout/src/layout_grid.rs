//! The grid interpreter.
//!
//! [`LayoutGridField`] walks a grid description against the schema, UI
//! schema and form data of one object field and produces a [`LayoutNode`]
//! tree. Rendering is a pure function of its inputs; the only state kept
//! across passes is the enum option memo of each union field.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use rjsf_utils::constants::UI_FIELD_KEY;
use rjsf_utils::value::{get_path_opt, set_path, unset_path};
use rjsf_utils::{FieldPathId, SchemaUtils, get_discriminator_field, get_ui_options, hash_object};
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::compose::compute_field_ui_schema;
use crate::condition::condition_matches;
use crate::config::LayoutConfig;
use crate::error::{GridSchemaError, LayoutError};
use crate::grid::{GridCondition, GridContainer, GridLeaf, GridNode, RenderRef};
use crate::lookup::{
    CustomRenderProps, CustomRenderer, FormContext, resolve_class_names, resolve_lookup_props,
};
use crate::multi_schema::{FieldChange, LayoutMultiSchemaField, MultiSchemaProps};
use crate::node::{CustomElement, FieldElement, GridElement, LayoutNode, MultiSchemaElement};
use crate::resolver::{ResolvedFieldInfo, SchemaCache, SchemaPathResolver};

/// UI option holding the grid description.
pub const LAYOUT_GRID_OPTION: &str = "layoutGrid";

/// `ui:field` value routing a union leaf through [`LayoutMultiSchemaField`].
pub const LAYOUT_MULTI_SCHEMA_FIELD: &str = "LayoutMultiSchemaField";

/// Stands in for absent condition data so that it never equals a
/// configured value.
const UNLIKELY_VALUE: &str = "$$layout-grid-condition-unset$$";

/// Inputs of one render pass.
#[derive(Debug, Clone, Copy)]
pub struct LayoutGridProps<'a> {
    pub schema: &'a Value,
    pub ui_schema: Option<&'a Value>,
    pub form_data: Option<&'a Value>,
    pub error_schema: Option<&'a Value>,
    pub field_path_id: &'a FieldPathId,
    pub readonly: bool,
    pub disabled: bool,
}

pub struct LayoutGridField<'a> {
    utils: &'a dyn SchemaUtils,
    context: &'a dyn FormContext,
    config: &'a LayoutConfig,
    multi_schema_fields: RefCell<HashMap<String, LayoutMultiSchemaField>>,
}

impl<'a> LayoutGridField<'a> {
    pub fn new(
        utils: &'a dyn SchemaUtils,
        context: &'a dyn FormContext,
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            utils,
            context,
            config,
            multi_schema_fields: RefCell::new(HashMap::new()),
        }
    }

    /// Renders the grid stored in the UI schema's `ui:layoutGrid` option.
    pub fn render(&self, props: &LayoutGridProps<'_>) -> Result<Vec<LayoutNode>, LayoutError> {
        let options = get_ui_options(props.ui_schema, None);
        let Some(grid) = options.get(LAYOUT_GRID_OPTION) else {
            debug!(id = %props.field_path_id.id, "no layout grid in ui schema");
            return Ok(Vec::new());
        };
        self.render_grid(grid, props)
    }

    /// Parses and renders an explicit grid description.
    pub fn render_grid(
        &self,
        grid: &Value,
        props: &LayoutGridProps<'_>,
    ) -> Result<Vec<LayoutNode>, LayoutError> {
        let node = GridNode::parse(grid)?;
        let cache = SchemaCache::new();
        let rendered = self.render_node(&node, props, &cache)?;
        trace!(retrievals = cache.len(), "layout grid rendered");
        Ok(rendered)
    }

    /// Renders one parsed node. Containers yield one element, satisfied
    /// conditions their children, leaves zero or one element.
    pub fn render_node(
        &self,
        node: &GridNode,
        props: &LayoutGridProps<'_>,
        cache: &SchemaCache,
    ) -> Result<Vec<LayoutNode>, LayoutError> {
        match node {
            GridNode::Row(container) => self.render_container(node, container, false, props, cache),
            GridNode::Column(container) => self.render_container(node, container, true, props, cache),
            GridNode::Columns(container) => {
                let mut columns = Vec::with_capacity(container.children.len());
                for child in &container.children {
                    let column = GridNode::Column(GridContainer {
                        class_name: container.class_name.clone(),
                        props: container.props.clone(),
                        children: vec![child.clone()],
                    });
                    columns.extend(self.render_node(&column, props, cache)?);
                }
                Ok(columns)
            }
            GridNode::Condition(condition) => self.render_condition(condition, props, cache),
            GridNode::Leaf(leaf) => Ok(self
                .render_leaf(node, leaf, props, cache)?
                .into_iter()
                .collect()),
        }
    }

    fn render_children(
        &self,
        children: &[GridNode],
        props: &LayoutGridProps<'_>,
        cache: &SchemaCache,
    ) -> Result<Vec<LayoutNode>, LayoutError> {
        let mut rendered = Vec::new();
        for child in children {
            rendered.extend(self.render_node(child, props, cache)?);
        }
        Ok(rendered)
    }

    fn render_container(
        &self,
        node: &GridNode,
        container: &GridContainer,
        column: bool,
        props: &LayoutGridProps<'_>,
        cache: &SchemaCache,
    ) -> Result<Vec<LayoutNode>, LayoutError> {
        let children = self.render_children(&container.children, props, cache)?;
        Ok(vec![LayoutNode::Grid(GridElement {
            key: grid_key(node),
            column,
            class_name: container
                .class_name
                .as_deref()
                .map(|class_name| resolve_class_names(class_name, self.context)),
            props: container.props.clone(),
            children,
        })])
    }

    fn render_condition(
        &self,
        condition: &GridCondition,
        props: &LayoutGridProps<'_>,
        cache: &SchemaCache,
    ) -> Result<Vec<LayoutNode>, LayoutError> {
        let unset = Value::String(UNLIKELY_VALUE.to_string());
        let datum = get_path_opt(props.form_data, &condition.field).unwrap_or(&unset);
        if !condition_matches(condition.operator, datum, &condition.value) {
            trace!(field = %condition.field, "condition not met, skipping children");
            return Ok(Vec::new());
        }
        self.render_children(&condition.children, props, cache)
    }

    fn render_leaf(
        &self,
        node: &GridNode,
        leaf: &GridLeaf,
        props: &LayoutGridProps<'_>,
        cache: &SchemaCache,
    ) -> Result<Option<LayoutNode>, LayoutError> {
        let ui_props = resolve_lookup_props(&leaf.props, self.context);
        let renderer = leaf.render.as_ref().and_then(|render| self.resolve_renderer(render));

        let Some(name) = leaf.name.as_deref() else {
            return Ok(renderer.map(|renderer| {
                let render_props = CustomRenderProps {
                    name: None,
                    ui_props,
                    schema: props.schema.clone(),
                    ui_schema: props.ui_schema.cloned(),
                    form_data: props.form_data.cloned(),
                    field_path_id: props.field_path_id.clone(),
                    required: false,
                    readonly: props.readonly,
                };
                render_custom(node, renderer.as_ref(), render_props)
            }));
        };

        let resolver = SchemaPathResolver::new(self.utils, cache, &self.config.ids);
        let info = resolver.resolve(props.schema, name, props.form_data, props.field_path_id);
        if info.schema.is_none() {
            trace!(field = name, "no schema for grid leaf");
            return Ok(renderer.map(|renderer| {
                let render_props = CustomRenderProps {
                    name: Some(name.to_string()),
                    ui_props,
                    schema: props.schema.clone(),
                    ui_schema: props.ui_schema.cloned(),
                    form_data: props.form_data.cloned(),
                    field_path_id: info.field_path_id,
                    required: info.is_required,
                    readonly: info.is_readonly.is_true(),
                };
                render_custom(node, renderer.as_ref(), render_props)
            }));
        }
        self.render_field(node, name, &ui_props, info, props).map(Some)
    }

    fn render_field(
        &self,
        node: &GridNode,
        name: &str,
        ui_props: &Map<String, Value>,
        info: ResolvedFieldInfo,
        props: &LayoutGridProps<'_>,
    ) -> Result<LayoutNode, LayoutError> {
        let composed = compute_field_ui_schema(name, ui_props, props.ui_schema, info.is_readonly, props.readonly);
        let field = FieldElement {
            key: grid_key(node),
            name: name.to_string(),
            field_path_id: info.field_path_id,
            schema: info.schema.unwrap_or_default(),
            error_schema: get_path_opt(props.error_schema, name).cloned(),
            form_data: get_path_opt(props.form_data, name).cloned(),
            required: info.is_required,
            readonly: composed.readonly,
            disabled: props.disabled,
            ui_schema: composed.field_ui_schema,
        };

        let Some(options_info) = info.options_info else {
            return Ok(LayoutNode::Field(field));
        };
        let field_override = field.ui_schema.get(UI_FIELD_KEY).and_then(Value::as_str);
        if !options_info.has_discriminator && field_override != Some(LAYOUT_MULTI_SCHEMA_FIELD) {
            return Ok(LayoutNode::Field(field));
        }

        let ui_schema = Value::Object(field.ui_schema.clone());
        let multi_props = MultiSchemaProps {
            name,
            schema: &field.schema,
            options: &options_info.options,
            has_discriminator: options_info.has_discriminator,
            ui_schema: Some(&ui_schema),
            form_data: field.form_data.as_ref(),
            error_schema: field.error_schema.as_ref(),
            field_path_id: &field.field_path_id,
            global_ui_options: Some(&self.config.global_ui_options),
            required: field.required,
            readonly: field.readonly.unwrap_or(false),
            disabled: field.disabled,
        };
        let chooser = self
            .multi_schema_fields
            .borrow_mut()
            .entry(field.field_path_id.id.clone())
            .or_default()
            .render(self.utils, &multi_props)?;
        Ok(LayoutNode::MultiSchemaField(MultiSchemaElement { field, chooser }))
    }

    fn resolve_renderer(&self, render: &RenderRef) -> Option<Arc<dyn CustomRenderer>> {
        match render {
            RenderRef::Component(component) => Some(component.clone()),
            RenderRef::Named(name) => {
                let found = self.context.lookup_renderer(name);
                if found.is_none() {
                    warn!(renderer = %name, "custom renderer not found in form context");
                }
                found
            }
        }
    }

    /// Writes a leaf's new value into a copy of the form data.
    ///
    /// `None` removes the entry. Missing intermediate objects and array
    /// slots are created; an index far past the end of its array leaves the
    /// data unchanged.
    pub fn on_field_change(&self, form_data: Option<&Value>, name: &str, value: Option<Value>) -> Value {
        let mut new_data = form_data
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        match value {
            Some(value) => {
                if !set_path(&mut new_data, name, value) {
                    warn!(field = name, "array index out of reach, form data left unchanged");
                    return form_data
                        .cloned()
                        .unwrap_or_else(|| Value::Object(Map::new()));
                }
            }
            None => {
                unset_path(&mut new_data, name);
            }
        }
        trace!(field = name, "field changed");
        new_data
    }

    /// Switches the union field described by the grid leaf `leaf` to the
    /// branch whose selector value is `selected`, returning the field's
    /// change and the full new form data.
    ///
    /// `leaf` is the leaf as written in the grid (a bare name or an object
    /// with `name` and presentation props), so options given on the leaf
    /// apply the same way they do while rendering.
    pub fn on_option_change(
        &self,
        props: &LayoutGridProps<'_>,
        leaf: &Value,
        selected: Option<&Value>,
    ) -> Result<(FieldChange, Value), LayoutError> {
        let GridNode::Leaf(GridLeaf {
            name: Some(name),
            props: leaf_props,
            ..
        }) = GridNode::parse(leaf)?
        else {
            return Err(GridSchemaError::InvalidNode {
                node: leaf.to_string(),
            }
            .into());
        };
        let name = name.as_str();
        let ui_props = resolve_lookup_props(&leaf_props, self.context);
        let cache = SchemaCache::new();
        let resolver = SchemaPathResolver::new(self.utils, &cache, &self.config.ids);
        let info = resolver.resolve(props.schema, name, props.form_data, props.field_path_id);
        let leaf_schema = info.schema.unwrap_or_default();
        let options = info.options_info.map(|info| info.options).unwrap_or_default();
        let composed = compute_field_ui_schema(name, &ui_props, props.ui_schema, info.is_readonly, props.readonly);
        let ui_schema = Value::Object(composed.field_ui_schema);
        let leaf_data = get_path_opt(props.form_data, name);
        let multi_props = MultiSchemaProps {
            name,
            schema: &leaf_schema,
            options: &options,
            has_discriminator: get_discriminator_field(&leaf_schema).is_some(),
            ui_schema: Some(&ui_schema),
            form_data: leaf_data,
            error_schema: get_path_opt(props.error_schema, name),
            field_path_id: &info.field_path_id,
            global_ui_options: Some(&self.config.global_ui_options),
            required: info.is_required,
            readonly: composed.readonly.unwrap_or(false),
            disabled: props.disabled,
        };
        let change = self
            .multi_schema_fields
            .borrow_mut()
            .entry(info.field_path_id.id.clone())
            .or_default()
            .on_option_change(self.utils, &multi_props, selected)?;
        let form_data = self.on_field_change(props.form_data, name, change.value.clone());
        Ok((change, form_data))
    }
}

/// Stable key of a rendered node, derived from its canonical description.
fn grid_key(node: &GridNode) -> String {
    format!("layoutGrid-{}", hash_object(&node.to_value()))
}

fn render_custom(node: &GridNode, renderer: &dyn CustomRenderer, props: CustomRenderProps) -> LayoutNode {
    LayoutNode::Custom(CustomElement {
        key: grid_key(node),
        renderer: renderer.name().to_string(),
        output: renderer.render(&props),
        props: props.ui_props,
    })
}
