//! Parsers for action definitions, mappings and events
//!
//! YAML is a superset of JSON, so every document loader accepts both.

use crate::action::ActionDefinition;
use crate::error::{Error, Result, ResultExt};
use crate::mapping::CompileOptions;
use crate::schema::compile_fields_with;
use crate::types::{JsonObject, JsonValue};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load an action definition from a YAML or JSON file
///
/// # Examples
///
/// ```ignore
/// let definition = load_action("./actions/track.yaml")?;
/// let action = Action::new(definition)?;
/// ```
pub fn load_action(path: impl AsRef<Path>) -> Result<ActionDefinition> {
    load_action_with(path, &CompileOptions::default())
}

/// Load an action definition, checking defaults with `options`
pub fn load_action_with(
    path: impl AsRef<Path>,
    options: &CompileOptions,
) -> Result<ActionDefinition> {
    let content = read_file(path.as_ref(), "action")?;
    load_action_from_str_with(&content, options)
}

/// Load an action definition from a YAML or JSON string
pub fn load_action_from_str(yaml: &str) -> Result<ActionDefinition> {
    load_action_from_str_with(yaml, &CompileOptions::default())
}

/// Load an action definition from a string, checking defaults with `options`
pub fn load_action_from_str_with(yaml: &str, options: &CompileOptions) -> Result<ActionDefinition> {
    let def: ActionDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse action definition: {e}")))?;

    validate_action(&def, options)?;
    debug!("Loaded action {} with {} fields", def.name, def.fields.len());
    Ok(def)
}

/// Validate an action definition
fn validate_action(def: &ActionDefinition, options: &CompileOptions) -> Result<()> {
    if def.name.trim().is_empty() {
        return Err(Error::config("Action name cannot be empty"));
    }

    if def.fields.names().iter().any(|name| name.is_empty()) {
        return Err(Error::config(format!(
            "Action '{}' has a field with an empty key",
            def.name
        )));
    }

    // Every default must be a well-formed mapping
    compile_fields_with(&def.fields, None, options)?;

    Ok(())
}

/// Load a mapping document from a YAML or JSON file
pub fn load_mapping(path: impl AsRef<Path>) -> Result<JsonValue> {
    let content = read_file(path.as_ref(), "mapping")?;
    load_mapping_from_str(&content)
}

/// Parse a mapping document from a YAML or JSON string
pub fn load_mapping_from_str(yaml: &str) -> Result<JsonValue> {
    serde_yaml::from_str(yaml).map_err(|e| Error::config(format!("Failed to parse mapping: {e}")))
}

/// Load a per-field mapping that overrides action defaults
///
/// The document must be an object keyed by field name.
pub fn load_overrides(path: impl AsRef<Path>) -> Result<JsonObject> {
    match load_mapping(path.as_ref())? {
        JsonValue::Object(overrides) => Ok(overrides),
        other => Err(Error::config(format!(
            "Overrides in '{}' should be an object but it is {}",
            path.as_ref().display(),
            crate::types::ValueType::of(&other).with_article()
        ))),
    }
}

/// Load events from a JSON array or JSONL file
pub fn load_events(path: impl AsRef<Path>) -> Result<Vec<JsonValue>> {
    let content = read_file(path.as_ref(), "events")?;
    parse_events(&content)
}

/// Parse events from a JSON array, a single JSON document or JSONL
pub fn parse_events(content: &str) -> Result<Vec<JsonValue>> {
    if let Ok(document) = serde_json::from_str::<JsonValue>(content) {
        return Ok(match document {
            JsonValue::Array(events) => events,
            event => vec![event],
        });
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid JSON on line {}", i + 1))
        })
        .collect()
}

fn read_file(path: &Path, kind: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read {kind} file '{}': {e}",
                path.display()
            ))
        }
    })
}
