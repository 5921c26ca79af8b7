//! Mapping engine module
//!
//! Resolves declarative mappings against events.
//!
//! # Overview
//!
//! A mapping is a JSON tree of literals and directive objects. An object
//! with exactly one reserved key is a directive:
//!
//! | Directive    | Argument                       | Result                          |
//! |--------------|--------------------------------|---------------------------------|
//! | `@path`      | path string                    | value at the path, if any       |
//! | `@template`  | string with `{{ path }}`       | rendered string                 |
//! | `@if`        | `{exists or blank, then, else}`| the selected branch             |
//! | `@literal`   | any value                      | the value, directives resolved  |
//! | `@arrayPath` | `[path, shape?]`               | array, shape applied per item   |
//!
//! Anything else is literal structure whose members are resolved
//! recursively.
//!
//! ```rust,ignore
//! use mapkit::mapping::Mapping;
//! use serde_json::json;
//!
//! let mapping = Mapping::compile(&json!({
//!     "name": { "@path": "$.event" },
//!     "title": { "@template": "Viewed {{ properties.page }}" }
//! }))?;
//!
//! let payload = mapping.resolve(&event);
//! ```

mod compile;
mod resolve;
mod template;
mod types;

pub use compile::{directive_kind, is_directive};
pub use template::{has_templates, Template};
pub use types::{
    CompileOptions, Condition, Directive, DirectiveKind, Node, PathArg, ResolveOptions,
    TemplateArg, ARRAY_PATH, IF, LITERAL, PATH, TEMPLATE,
};

use crate::error::{Error, Result};
use crate::types::ValueType;
use serde_json::Value;

/// A compiled, immutable mapping
///
/// Compile once per action, then resolve against any number of events,
/// from any number of threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    root: Node,
}

impl Mapping {
    /// Compile a raw mapping with default options
    pub fn compile(mapping: &Value) -> Result<Self> {
        Self::compile_with(mapping, &CompileOptions::default())
    }

    /// Compile a raw mapping
    pub fn compile_with(mapping: &Value, options: &CompileOptions) -> Result<Self> {
        Ok(Self {
            root: compile::compile(mapping, options)?,
        })
    }

    /// The compiled node tree
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Resolve against an event with default options
    pub fn resolve(&self, event: &Value) -> Option<Value> {
        self.root.resolve(event, &ResolveOptions::default())
    }

    /// Resolve against an event
    pub fn resolve_with(&self, event: &Value, options: &ResolveOptions) -> Option<Value> {
        self.root.resolve(event, options)
    }
}

/// Compile and resolve a mapping against an event in one step
///
/// The event must be an object.
pub fn resolve_mapping(mapping: &Value, event: &Value) -> Result<Option<Value>> {
    resolve_mapping_with(
        mapping,
        event,
        &CompileOptions::default(),
        &ResolveOptions::default(),
    )
}

/// Compile and resolve a mapping with explicit options
pub fn resolve_mapping_with(
    mapping: &Value,
    event: &Value,
    compile_options: &CompileOptions,
    resolve_options: &ResolveOptions,
) -> Result<Option<Value>> {
    ensure_event(event)?;
    let mapping = Mapping::compile_with(mapping, compile_options)?;
    Ok(mapping.resolve_with(event, resolve_options))
}

/// Reject events whose root is not an object
pub fn ensure_event(event: &Value) -> Result<()> {
    if event.is_object() {
        Ok(())
    } else {
        Err(Error::invalid_event(format!(
            "should be an object but it is {}",
            ValueType::of(event).with_article()
        )))
    }
}
