//! Mapping evaluation
//!
//! Resolution is a pure function of (node, event): nothing here mutates
//! the event or keeps state between calls.

use super::template::Template;
use super::types::{Condition, Directive, Node, PathArg, ResolveOptions, TemplateArg};
use crate::path::JsonPath;
use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::debug;

impl Node {
    /// Resolve this node against an event
    ///
    /// `None` means the value is absent. Absent object members are
    /// dropped; absent array elements become `null`.
    pub fn resolve(&self, event: &Value, options: &ResolveOptions) -> Option<Value> {
        match self {
            Node::Value(value) => Some(value.clone()),
            Node::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| item.resolve(event, options).unwrap_or(Value::Null))
                    .collect(),
            )),
            Node::Object(entries) => {
                let mut out = Map::with_capacity(entries.len());
                for (key, node) in entries {
                    if let Some(value) = node.resolve(event, options) {
                        out.insert(key.clone(), value);
                    }
                }
                Some(Value::Object(out))
            }
            Node::Directive(directive) => directive.resolve(event, options),
        }
    }
}

impl Directive {
    /// Evaluate this directive against an event
    pub fn resolve(&self, event: &Value, options: &ResolveOptions) -> Option<Value> {
        match self {
            Directive::Path(path) => path.path(event, options)?.resolve(event).cloned(),
            Directive::Template(template) => {
                let template = template.template(event, options)?;
                Some(Value::String(template.render(event, options.escape_html)))
            }
            Directive::If {
                condition,
                then,
                otherwise,
            } => {
                let branch = if condition.holds(event, options) {
                    then
                } else {
                    otherwise
                };
                branch.as_ref()?.resolve(event, options)
            }
            Directive::Literal(node) => node.resolve(event, options),
            Directive::ArrayPath { path, shape } => {
                let root: Cow<'_, Value> = match path {
                    PathArg::Static(path) => Cow::Borrowed(path.resolve(event)?),
                    PathArg::Dynamic(node) => Cow::Owned(node.resolve(event, options)?),
                };
                let items: Cow<'_, [Value]> = match root {
                    Cow::Borrowed(Value::Null) | Cow::Owned(Value::Null) => return None,
                    Cow::Borrowed(Value::Array(items)) => Cow::Borrowed(items.as_slice()),
                    Cow::Owned(Value::Array(items)) => Cow::Owned(items),
                    other => Cow::Owned(vec![other.into_owned()]),
                };

                Some(Value::Array(match shape {
                    Some(shape) => items
                        .iter()
                        .map(|item| shape.resolve(item, options).unwrap_or(Value::Null))
                        .collect(),
                    None => items.into_owned(),
                }))
            }
        }
    }
}

impl Condition {
    fn holds(&self, event: &Value, options: &ResolveOptions) -> bool {
        match self {
            Condition::Exists(node) => {
                matches!(node.resolve(event, options), Some(value) if !value.is_null())
            }
            Condition::Blank(node) => match node.resolve(event, options) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(_) => true,
            },
        }
    }
}

impl PathArg {
    fn path(&self, event: &Value, options: &ResolveOptions) -> Option<Cow<'_, JsonPath>> {
        match self {
            PathArg::Static(path) => Some(Cow::Borrowed(path)),
            PathArg::Dynamic(node) => match node.resolve(event, options)? {
                Value::String(expr) => Some(Cow::Owned(JsonPath::parse(&expr))),
                other => {
                    debug!("Dynamic path resolved to non-string value: {}", other);
                    None
                }
            },
        }
    }
}

impl TemplateArg {
    fn template(&self, event: &Value, options: &ResolveOptions) -> Option<Cow<'_, Template>> {
        match self {
            TemplateArg::Static(template) => Some(Cow::Borrowed(template)),
            TemplateArg::Dynamic(node) => match node.resolve(event, options)? {
                Value::String(source) => Some(Cow::Owned(Template::parse(&source))),
                other => {
                    debug!("Dynamic template resolved to non-string value: {}", other);
                    None
                }
            },
        }
    }
}
