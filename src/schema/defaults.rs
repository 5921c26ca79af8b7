//! Effective mapping computation
//!
//! An explicit mapping for a field always wins; otherwise the field's
//! declared `default` is used; otherwise the field is left out.

use super::types::{FieldSchema, FieldSet};
use crate::error::Result;
use crate::mapping::{CompileOptions, Mapping};
use crate::types::JsonObject;
use serde_json::Value;

/// Build the mapping object for a field set
///
/// Keys follow field declaration order. Explicit mappings for names the
/// field set does not declare are ignored.
pub fn effective_mapping(fields: &FieldSet, explicit: Option<&JsonObject>) -> JsonObject {
    let mut mapping = JsonObject::new();
    for (name, field) in fields.iter() {
        let chosen = field.effective_mapping(explicit.and_then(|m| m.get(name)));
        if let Some(chosen) = chosen {
            mapping.insert(name.to_string(), chosen.clone());
        }
    }
    mapping
}

/// Compile the effective mapping for a field set
pub fn compile_fields(fields: &FieldSet, explicit: Option<&JsonObject>) -> Result<Mapping> {
    compile_fields_with(fields, explicit, &CompileOptions::default())
}

/// Compile the effective mapping for a field set with explicit options
pub fn compile_fields_with(
    fields: &FieldSet,
    explicit: Option<&JsonObject>,
    options: &CompileOptions,
) -> Result<Mapping> {
    Mapping::compile_with(&Value::Object(effective_mapping(fields, explicit)), options)
}

/// Resolve a single field against an event
///
/// `Ok(None)` means the field is absent: it has neither an explicit
/// mapping nor a default, or its mapping resolved to nothing.
pub fn resolve_field(
    field: &FieldSchema,
    explicit: Option<&Value>,
    event: &Value,
) -> Result<Option<Value>> {
    match field.effective_mapping(explicit) {
        Some(mapping) => Ok(Mapping::compile(mapping)?.resolve(event)),
        None => Ok(None),
    }
}
