//! Payload validation with type coercion
//!
//! Coercion is liberal: numbers and booleans become strings,
//! numeric strings become numbers, `"true"`/`"false"` become booleans.
//! Every violation is collected before the payload is rejected.

use super::types::{FieldSchema, FieldSet, FieldType};
use crate::error::{Error, Result};
use crate::types::{JsonObject, ValueType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};
use tracing::debug;

/// Validate and coerce a resolved payload in place
///
/// Undeclared top-level keys are removed. Optional fields holding `null`
/// without `allow_null` are dropped; required ones are violations.
pub fn validate_payload(fields: &FieldSet, payload: &mut JsonObject) -> Result<()> {
    let mut violations = Vec::new();
    validate_object(fields, payload, "", false, &mut violations);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::PayloadValidation { violations })
    }
}

fn validate_object(
    fields: &FieldSet,
    object: &mut JsonObject,
    prefix: &str,
    keep_additional: bool,
    violations: &mut Vec<String>,
) {
    if !keep_additional {
        object.retain(|key, _| fields.contains(key));
    }

    for (name, field) in fields.iter() {
        let location = format!("{prefix}/{name}");

        let Some(value) = object.get_mut(name) else {
            if field.required {
                violations.push(format!("missing required field '{}'", &location[1..]));
            }
            continue;
        };

        if value.is_null() {
            if field.allow_null {
                continue;
            }
            if field.required {
                violations.push(format!("the value at {location} must not be null"));
            } else {
                debug!("Dropping null value for optional field {}", location);
                object.retain(|key, _| key != name);
            }
            continue;
        }

        if field.multiple {
            match value {
                Value::Array(items) => {
                    for (i, item) in items.iter_mut().enumerate() {
                        coerce(field, item, &format!("{location}/{i}"), violations);
                    }
                }
                other => violations.push(type_violation(&location, "an array", other)),
            }
        } else {
            coerce(field, value, &location, violations);
        }
    }
}

/// Coerce a single value to the field type, recording a violation on failure
fn coerce(field: &FieldSchema, value: &mut Value, location: &str, violations: &mut Vec<String>) {
    match coerced(field.field_type, value, location) {
        Ok(Some(coerced)) => *value = coerced,
        Ok(None) => {}
        Err(violation) => {
            violations.push(violation);
            return;
        }
    }

    if let (FieldType::Object, Value::Object(object)) = (field.field_type, value) {
        if !field.properties.is_empty() {
            validate_object(
                &field.properties,
                object,
                location,
                field.additional_properties,
                violations,
            );
        }
    }
}

/// The coerced replacement for `value`, `None` when it already fits
fn coerced(
    field_type: FieldType,
    value: &Value,
    location: &str,
) -> std::result::Result<Option<Value>, String> {
    match field_type {
        FieldType::String | FieldType::Text | FieldType::Password => match value {
            Value::String(_) => Ok(None),
            Value::Number(n) => Ok(Some(Value::String(n.to_string()))),
            Value::Bool(b) => Ok(Some(Value::String(b.to_string()))),
            other => Err(type_violation(location, "a string", other)),
        },
        FieldType::Number => match value {
            Value::Number(_) => Ok(None),
            Value::String(s) => parse_number(s)
                .map(|n| Some(Value::Number(n)))
                .ok_or_else(|| type_violation(location, "a number", value)),
            Value::Bool(b) => Ok(Some(Value::from(u8::from(*b)))),
            other => Err(type_violation(location, "a number", other)),
        },
        FieldType::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(None),
            other => integer_of(other)
                .map(|n| (&n != other).then_some(n))
                .ok_or_else(|| type_violation(location, "an integer", other)),
        },
        FieldType::Boolean => match value {
            Value::Bool(_) => Ok(None),
            Value::String(s) if s == "true" => Ok(Some(Value::Bool(true))),
            Value::String(s) if s == "false" => Ok(Some(Value::Bool(false))),
            Value::Number(n) if n.as_f64() == Some(1.0) => Ok(Some(Value::Bool(true))),
            Value::Number(n) if n.as_f64() == Some(0.0) => Ok(Some(Value::Bool(false))),
            other => Err(type_violation(location, "a boolean", other)),
        },
        FieldType::Datetime => match value {
            Value::Number(_) => Ok(None),
            Value::String(s) if is_date_like(s) => Ok(None),
            Value::String(_) => Err(format!("the value at {location} must be a valid date")),
            other => Err(type_violation(location, "a date", other)),
        },
        FieldType::Object => match value {
            Value::Object(_) => Ok(None),
            other => Err(type_violation(location, "an object", other)),
        },
    }
}

fn type_violation(location: &str, expected: &str, actual: &Value) -> String {
    format!(
        "the value at {location} must be {expected} but it was {}",
        ValueType::of(actual).with_article()
    )
}

fn parse_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Integer value of a number, numeric string or boolean
///
/// Whole numbers beyond the `i64` range stay floats rather than saturate.
fn integer_of(value: &Value) -> Option<Value> {
    let whole = |n: Number| -> Option<Value> {
        if n.is_i64() || n.is_u64() {
            return Some(Value::Number(n));
        }
        let f = n.as_f64()?;
        if f.fract() != 0.0 || !f.is_finite() {
            return None;
        }
        if f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Some(Value::from(f as i64))
        } else {
            Some(Value::Number(n))
        }
    };
    match value {
        Value::Number(n) => whole(n.clone()),
        Value::String(s) => whole(parse_number(s)?),
        Value::Bool(b) => Some(Value::from(i64::from(*b))),
        _ => None,
    }
}

/// Whether a string parses as a date, a datetime or a unix timestamp
pub fn is_date_like(s: &str) -> bool {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        let Ok(n) = s.parse::<i64>() else {
            return false;
        };
        return if s.len() == 13 {
            DateTime::from_timestamp_millis(n).is_some()
        } else {
            DateTime::from_timestamp(n, 0).is_some()
        };
    }

    DateTime::parse_from_rfc3339(s).is_ok()
        || DateTime::parse_from_rfc2822(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
