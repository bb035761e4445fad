use super::*;
use serde_json::json;

#[test]
fn missing_required_fails() {
    let schema = json!({"type": "object", "required": ["q"], "properties": {"q": {"type": "string"}}});
    let err = validate(&schema, &json!({})).unwrap_err();
    assert!(err.contains("property q"));
}

#[test]
fn required_present_passes() {
    let schema = json!({"type": "object", "required": ["q"], "properties": {"q": {"type": "string"}}});
    assert!(validate(&schema, &json!({"q": "hi"})).is_ok());
}

#[test]
fn additional_properties_false_rejects_unknown() {
    let schema = json!({"type": "object", "properties": {"q": {"type": "string"}}, "additionalProperties": false});
    let err = validate(&schema, &json!({"q": "hi", "extra": 1})).unwrap_err();
    assert!(err.contains("extra"));
}

#[test]
fn additional_properties_default_allows_unknown() {
    let schema = json!({"type": "object", "properties": {"q": {"type": "string"}}});
    assert!(validate(&schema, &json!({"q": "hi", "extra": 1})).is_ok());
}

#[test]
fn wrong_property_type_fails_with_qualified_path() {
    let schema = json!({"type": "object", "properties": {"q": {"type": "string"}}});
    let err = validate(&schema, &json!({"q": 5})).unwrap_err();
    assert_eq!(err, "property q: expected string");
}

#[test]
fn array_items_validated() {
    let schema = json!({"type": "array", "items": {"type": "integer"}});
    assert!(validate(&schema, &json!([1, 2, 3])).is_ok());
    let err = validate(&schema, &json!([1, "x"])).unwrap_err();
    assert!(err.contains("item 1"));
}

#[test]
fn integer_rejects_fractional() {
    let schema = json!({"type": "integer"});
    assert!(validate(&schema, &json!(5)).is_ok());
    assert!(validate(&schema, &json!(5.5)).is_err());
}

#[test]
fn number_accepts_integer_and_float() {
    let schema = json!({"type": "number"});
    assert!(validate(&schema, &json!(5)).is_ok());
    assert!(validate(&schema, &json!(5.5)).is_ok());
}

#[test]
fn boolean_type_check() {
    let schema = json!({"type": "boolean"});
    assert!(validate(&schema, &json!(true)).is_ok());
    assert!(validate(&schema, &json!("true")).is_err());
}

#[test]
fn unknown_type_is_accepted() {
    let schema = json!({"type": "null"});
    assert!(validate(&schema, &json!(null)).is_ok());
    assert!(validate(&schema, &json!("anything")).is_ok());
}

#[test]
fn nested_object_validated_recursively() {
    let schema = json!({
        "type": "object",
        "properties": {
            "inner": {
                "type": "object",
                "required": ["x"],
                "properties": {"x": {"type": "integer"}}
            }
        }
    });
    let err = validate(&schema, &json!({"inner": {}})).unwrap_err();
    assert!(err.contains("inner"));
    assert!(err.contains("property x"));
}
