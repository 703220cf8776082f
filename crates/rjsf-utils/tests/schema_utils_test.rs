use rjsf_utils::{DefaultSchemaUtils, DefaultsMode, SchemaUtils, UnionKey, UtilsError};
use serde_json::{Value, json};

fn shop_schema() -> Value {
    json!({
        "$defs": {
            "address": {
                "type": "object",
                "required": ["city"],
                "properties": {
                    "city": {"type": "string"},
                    "zip": {"type": "string", "default": "00000"}
                }
            },
            "loop": {"$ref": "#/$defs/loop"}
        },
        "type": "object",
        "properties": {
            "shipping": {
                "$ref": "#/$defs/address",
                "title": "Shipping address"
            },
            "payment": {
                "oneOf": [
                    {"properties": {"method": {"const": "card"}, "number": {"type": "string"}}},
                    {"properties": {"method": {"const": "cash"}, "change": {"type": "boolean", "default": false}}}
                ]
            },
            "delivery": {
                "type": "object",
                "properties": {"express": {"type": "boolean"}},
                "if": {"properties": {"express": {"const": true}}, "required": ["express"]},
                "then": {"properties": {"slot": {"type": "string"}}},
                "else": {"properties": {"day": {"type": "string"}}}
            }
        }
    })
}

#[test]
fn test_retrieve_merges_ref_siblings() {
    let schema = shop_schema();
    let utils = DefaultSchemaUtils::new(schema.clone());
    let shipping = utils
        .retrieve_schema(&schema["properties"]["shipping"], None)
        .unwrap();
    assert_eq!(shipping["title"], json!("Shipping address"));
    assert_eq!(shipping["required"], json!(["city"]));
    assert!(shipping.get("$ref").is_none());
}

#[test]
fn test_retrieve_follows_if_then_else() {
    let schema = shop_schema();
    let utils = DefaultSchemaUtils::new(schema.clone());
    let delivery = &schema["properties"]["delivery"];

    let express = utils
        .retrieve_schema(delivery, Some(&json!({"express": true})))
        .unwrap();
    assert!(express["properties"].get("slot").is_some());
    assert!(express["properties"].get("day").is_none());

    let regular = utils
        .retrieve_schema(delivery, Some(&json!({"express": false})))
        .unwrap();
    assert!(regular["properties"].get("day").is_some());
}

#[test]
fn test_retrieve_reports_cycles_and_missing_refs() {
    let schema = shop_schema();
    let utils = DefaultSchemaUtils::new(schema);
    assert_eq!(
        utils.retrieve_schema(&json!({"$ref": "#/$defs/loop"}), None),
        Err(UtilsError::CircularReference {
            reference: "#/$defs/loop".to_string()
        })
    );
    assert!(matches!(
        utils.retrieve_schema(&json!({"$ref": "#/$defs/nothing"}), None),
        Err(UtilsError::UnresolvedReference { .. })
    ));
}

#[test]
fn test_branch_selected_by_fallback_field() {
    let schema = shop_schema();
    let utils = DefaultSchemaUtils::new(schema.clone());
    let payment = &schema["properties"]["payment"];
    let selected = utils
        .find_selected_branch(payment, "method", UnionKey::OneOf, Some(&json!({"method": "cash"})))
        .unwrap();
    assert!(selected["properties"].get("change").is_some());
    assert_eq!(
        utils.find_selected_branch(payment, "method", UnionKey::OneOf, Some(&json!({"method": "gold"}))),
        None
    );
}

#[test]
fn test_switch_payment_method() {
    let schema = shop_schema();
    let utils = DefaultSchemaUtils::new(schema.clone());
    let branches = schema["properties"]["payment"]["oneOf"].as_array().unwrap();
    let data = json!({"method": "card", "number": "4242"});
    let sanitized = utils
        .sanitize_data_for_new_schema(Some(&branches[1]), Some(&branches[0]), Some(&data))
        .unwrap();
    assert_eq!(sanitized, json!({"method": "cash", "change": false}));
    let filled = utils
        .get_default_form_state(&branches[1], Some(&sanitized), DefaultsMode::ExcludeObjectChildren)
        .unwrap();
    assert_eq!(filled, json!({"method": "cash", "change": false}));
}

#[test]
fn test_defaults_through_refs() {
    let schema = shop_schema();
    let utils = DefaultSchemaUtils::new(schema.clone());
    let all = utils
        .get_default_form_state(&schema, None, DefaultsMode::All)
        .unwrap();
    assert_eq!(all["shipping"], json!({"zip": "00000"}));
    let top_only = utils.get_default_form_state(&schema, None, DefaultsMode::ExcludeObjectChildren);
    assert_eq!(top_only, None);
}
