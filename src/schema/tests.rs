//! Tests for field schemas, effective mappings and payload validation

use super::*;
use crate::error::Error;
use crate::types::JsonObject;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn violations(fields: &FieldSet, payload: Value) -> Vec<String> {
    let mut payload = object(payload);
    match validate_payload(fields, &mut payload) {
        Ok(()) => Vec::new(),
        Err(Error::PayloadValidation { violations }) => violations,
        Err(other) => panic!("unexpected error: {other}"),
    }
}

fn validated(fields: &FieldSet, payload: Value) -> Value {
    let mut payload = object(payload);
    validate_payload(fields, &mut payload).unwrap();
    Value::Object(payload)
}

// ============================================================================
// Deserialization Tests
// ============================================================================

#[test]
fn test_deserialize_field_set_keeps_order() {
    let yaml = r#"
userId:
  label: User ID
  type: string
  required: true
  default:
    "@path": "$.userId"
revenue:
  label: Revenue
  type: number
anonymousId:
  label: Anonymous ID
  type: string
  allowNull: true
"#;

    let fields: FieldSet = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(fields.names(), vec!["userId", "revenue", "anonymousId"]);

    let user_id = fields.get("userId").unwrap();
    assert!(user_id.required);
    assert_eq!(user_id.label, "User ID");
    assert_eq!(user_id.default, Some(json!({"@path": "$.userId"})));

    assert_eq!(fields.get("revenue").unwrap().field_type, FieldType::Number);
    assert!(fields.get("anonymousId").unwrap().allow_null);
}

#[test]
fn test_deserialize_nested_properties() {
    let fields: FieldSet = serde_json::from_value(json!({
        "address": {
            "label": "Address",
            "type": "object",
            "additionalProperties": true,
            "properties": {
                "city": {"label": "City", "type": "string", "required": true}
            }
        }
    }))
    .unwrap();

    let address = fields.get("address").unwrap();
    assert_eq!(address.field_type, FieldType::Object);
    assert!(address.additional_properties);
    assert!(address.properties.get("city").unwrap().required);
}

#[test]
fn test_deserialize_rejects_unknown_type() {
    let result: Result<FieldSet, _> =
        serde_json::from_value(json!({"a": {"label": "a", "type": "bogus"}}));
    let err = result.unwrap_err().to_string();
    assert!(err.contains("field 'a'"));
}

#[test]
fn test_serialize_round_trip_order() {
    let fields = FieldSet::new()
        .with("z", FieldSchema::string())
        .with("a", FieldSchema::new(FieldType::Integer));
    let value = serde_json::to_value(&fields).unwrap();
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["z", "a"]);
}

#[test]
fn test_insert_replaces_existing() {
    let mut fields = FieldSet::new().with("a", FieldSchema::string());
    fields.insert("a", FieldSchema::new(FieldType::Boolean));
    assert_eq!(fields.len(), 1);
    assert_eq!(fields.get("a").unwrap().field_type, FieldType::Boolean);
}

// ============================================================================
// Effective Mapping Tests
// ============================================================================

fn track_fields() -> FieldSet {
    FieldSet::new()
        .with(
            "event_name",
            FieldSchema::string()
                .required()
                .with_default(json!({"@path": "$.event"})),
        )
        .with(
            "user_id",
            FieldSchema::string().with_default(json!({"@path": "$.userId"})),
        )
        .with("note", FieldSchema::string())
}

#[test]
fn test_default_fallback() {
    let field = FieldSchema::string().with_default(json!({"@path": "$.event"}));
    let resolved = resolve_field(&field, None, &json!({"event": "Order Completed"})).unwrap();
    assert_eq!(resolved, Some(json!("Order Completed")));
}

#[test]
fn test_explicit_mapping_wins() {
    let field = FieldSchema::string().with_default(json!({"@path": "$.event"}));
    let explicit = json!({"@template": "Custom {{ event }}"});
    let resolved = resolve_field(&field, Some(&explicit), &json!({"event": "Signup"})).unwrap();
    assert_eq!(resolved, Some(json!("Custom Signup")));
}

#[test]
fn test_field_without_mapping_is_absent() {
    let field = FieldSchema::string();
    assert_eq!(resolve_field(&field, None, &json!({"a": 1})).unwrap(), None);
}

#[test]
fn test_effective_mapping_order_and_overrides() {
    let overrides = object(json!({
        "note": "static note",
        "user_id": {"@path": "$.anonymousId"},
        "undeclared": 1
    }));

    let mapping = effective_mapping(&track_fields(), Some(&overrides));
    assert_eq!(
        Value::Object(mapping),
        json!({
            "event_name": {"@path": "$.event"},
            "user_id": {"@path": "$.anonymousId"},
            "note": "static note"
        })
    );
}

#[test]
fn test_effective_mapping_defaults_only() {
    let mapping = effective_mapping(&track_fields(), None);
    assert_eq!(
        Value::Object(mapping),
        json!({
            "event_name": {"@path": "$.event"},
            "user_id": {"@path": "$.userId"}
        })
    );
}

#[test]
fn test_compile_fields_reports_bad_default() {
    let fields = FieldSet::new().with("a", FieldSchema::string().with_default(json!({"@path": 1})));
    let err = compile_fields(&fields, None).unwrap_err();
    assert!(err.to_string().starts_with("/a/@path"));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_required_missing() {
    let v = violations(&track_fields(), json!({"user_id": "u1"}));
    assert_eq!(v, vec!["missing required field 'event_name'"]);
}

#[test]
fn test_required_null_rejected_unless_allowed() {
    let v = violations(&track_fields(), json!({"event_name": null}));
    assert_eq!(v, vec!["the value at /event_name must not be null"]);

    let fields = FieldSet::new().with("a", FieldSchema::string().required().allow_null());
    assert_eq!(validated(&fields, json!({"a": null})), json!({"a": null}));
}

#[test]
fn test_optional_null_dropped() {
    let payload = validated(&track_fields(), json!({"event_name": "x", "user_id": null}));
    assert_eq!(payload, json!({"event_name": "x"}));
}

#[test]
fn test_empty_string_is_present() {
    let payload = validated(&track_fields(), json!({"event_name": ""}));
    assert_eq!(payload, json!({"event_name": ""}));
}

#[test]
fn test_undeclared_keys_removed() {
    let payload = validated(&track_fields(), json!({"event_name": "x", "extra": 1}));
    assert_eq!(payload, json!({"event_name": "x"}));
}

#[test]
fn test_all_violations_collected() {
    let fields = FieldSet::new()
        .with("a", FieldSchema::string().required())
        .with("b", FieldSchema::new(FieldType::Integer))
        .with("c", FieldSchema::new(FieldType::Object));
    let v = violations(&fields, json!({"b": "x", "c": [1]}));
    assert_eq!(
        v,
        vec![
            "missing required field 'a'",
            "the value at /b must be an integer but it was a string",
            "the value at /c must be an object but it was an array",
        ]
    );
}

#[test]
fn test_string_coercion() {
    let fields = FieldSet::new()
        .with("n", FieldSchema::string())
        .with("b", FieldSchema::new(FieldType::Password))
        .with("o", FieldSchema::new(FieldType::Text));
    assert_eq!(
        validated(&fields, json!({"n": 12.5, "b": true})),
        json!({"n": "12.5", "b": "true"})
    );
    assert_eq!(
        violations(&fields, json!({"o": {"x": 1}})),
        vec!["the value at /o must be a string but it was an object"]
    );
}

#[test]
fn test_number_coercion() {
    let fields = FieldSet::new()
        .with("a", FieldSchema::new(FieldType::Number))
        .with("b", FieldSchema::new(FieldType::Number))
        .with("c", FieldSchema::new(FieldType::Number));
    assert_eq!(
        validated(&fields, json!({"a": "42", "b": "0.5", "c": true})),
        json!({"a": 42, "b": 0.5, "c": 1})
    );
    assert_eq!(
        violations(&fields, json!({"a": "abc"})),
        vec!["the value at /a must be a number but it was a string"]
    );
}

#[test]
fn test_integer_coercion() {
    let fields = FieldSet::new()
        .with("a", FieldSchema::new(FieldType::Integer))
        .with("b", FieldSchema::new(FieldType::Integer))
        .with("c", FieldSchema::new(FieldType::Integer));
    assert_eq!(
        validated(&fields, json!({"a": "7", "b": 3.0, "c": 9})),
        json!({"a": 7, "b": 3, "c": 9})
    );
    assert_eq!(
        violations(&fields, json!({"a": 1.5})),
        vec!["the value at /a must be an integer but it was a number"]
    );
}

#[test]
fn test_integer_beyond_i64_is_not_saturated() {
    let fields = FieldSet::new()
        .with("a", FieldSchema::new(FieldType::Integer))
        .with("b", FieldSchema::new(FieldType::Integer))
        .with("c", FieldSchema::new(FieldType::Integer));
    assert_eq!(
        validated(&fields, json!({"a": 1e20, "b": "1e20", "c": -1e19})),
        json!({"a": 1e20, "b": 1e20, "c": -1e19})
    );
    assert_eq!(
        violations(&fields, json!({"a": "1.5e0"})),
        vec!["the value at /a must be an integer but it was a string"]
    );
}

#[test]
fn test_boolean_coercion() {
    let fields = FieldSet::new()
        .with("a", FieldSchema::new(FieldType::Boolean))
        .with("b", FieldSchema::new(FieldType::Boolean))
        .with("c", FieldSchema::new(FieldType::Boolean));
    assert_eq!(
        validated(&fields, json!({"a": "true", "b": 0, "c": false})),
        json!({"a": true, "b": false, "c": false})
    );
    assert_eq!(
        violations(&fields, json!({"a": "yes"})),
        vec!["the value at /a must be a boolean but it was a string"]
    );
}

#[test]
fn test_datetime_validation() {
    let fields = FieldSet::new().with("t", FieldSchema::new(FieldType::Datetime));
    for ok in [
        json!("2024-03-01T12:00:00Z"),
        json!("2024-03-01T12:00:00.123+02:00"),
        json!("2024-03-01"),
        json!("2024-03-01 08:30:00"),
        json!("1700000000"),
        json!("1700000000000"),
        json!(1_700_000_000),
    ] {
        assert!(violations(&fields, json!({"t": ok})).is_empty());
    }

    assert_eq!(
        violations(&fields, json!({"t": "next tuesday"})),
        vec!["the value at /t must be a valid date"]
    );
    assert!(is_date_like("2024-01-31"));
    assert!(!is_date_like("2024-13-45"));
}

#[test]
fn test_multiple_fields() {
    let fields = FieldSet::new().with("tags", FieldSchema::string().multiple());
    assert_eq!(
        validated(&fields, json!({"tags": ["a", 1, true]})),
        json!({"tags": ["a", "1", "true"]})
    );
    assert_eq!(
        violations(&fields, json!({"tags": "a"})),
        vec!["the value at /tags must be an array but it was a string"]
    );
    assert_eq!(
        violations(&fields, json!({"tags": ["a", {"b": 1}]})),
        vec!["the value at /tags/1 must be a string but it was an object"]
    );
}

#[test]
fn test_object_properties() {
    let properties = FieldSet::new()
        .with("key", FieldSchema::string().required())
        .with("count", FieldSchema::new(FieldType::Integer));
    let fields = FieldSet::new()
        .with(
            "strict",
            FieldSchema::new(FieldType::Object).with_properties(properties.clone()),
        )
        .with(
            "open",
            FieldSchema::new(FieldType::Object)
                .with_properties(properties)
                .with_additional_properties(),
        )
        .with("free", FieldSchema::new(FieldType::Object));

    let payload = validated(
        &fields,
        json!({
            "strict": {"key": "k", "count": "2", "extra": 1},
            "open": {"key": "k", "extra": 1},
            "free": {"anything": [1, 2]}
        }),
    );
    assert_eq!(
        payload,
        json!({
            "strict": {"key": "k", "count": 2},
            "open": {"key": "k", "extra": 1},
            "free": {"anything": [1, 2]}
        })
    );

    assert_eq!(
        violations(&fields, json!({"strict": {"count": 1}})),
        vec!["missing required field 'strict/key'"]
    );
}

#[test]
fn test_multiple_objects_with_properties() {
    let fields = FieldSet::new().with(
        "items",
        FieldSchema::new(FieldType::Object)
            .multiple()
            .with_properties(FieldSet::new().with("key", FieldSchema::string().required())),
    );
    assert_eq!(
        violations(&fields, json!({"items": [{"key": "a"}, {}]})),
        vec!["missing required field 'items/1/key'"]
    );
}
