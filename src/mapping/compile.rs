//! Mapping compilation and validation
//!
//! Turns a raw JSON mapping into a `Node` tree. Every malformed directive
//! in the tree is reported, each tagged with its `/`-joined location.

use super::template::Template;
use super::types::{
    CompileOptions, Condition, Directive, DirectiveKind, Node, PathArg, TemplateArg,
};
use crate::error::{Error, Result};
use crate::path::JsonPath;
use crate::types::{JsonObject, ValueType};
use serde_json::Value;

/// Compile a raw mapping into a node tree
pub fn compile(mapping: &Value, options: &CompileOptions) -> Result<Node> {
    let mut compiler = Compiler {
        options: *options,
        stack: Vec::new(),
        errors: Vec::new(),
    };
    let node = compiler.node(mapping);

    if compiler.errors.is_empty() {
        Ok(node)
    } else {
        Err(Error::aggregate(compiler.errors))
    }
}

/// Returns the directive kind when `map` is exactly one reserved key
pub fn directive_kind(map: &JsonObject) -> Option<DirectiveKind> {
    if map.len() != 1 {
        return None;
    }
    map.keys().next().and_then(|key| DirectiveKind::from_key(key))
}

/// Whether a raw value is a directive object
pub fn is_directive(value: &Value) -> bool {
    matches!(value, Value::Object(map) if directive_kind(map).is_some())
}

struct Compiler {
    options: CompileOptions,
    stack: Vec<String>,
    errors: Vec<Error>,
}

impl Compiler {
    fn fail(&mut self, message: impl Into<String>) -> Node {
        self.errors.push(Error::malformed(&self.stack, message));
        Node::Value(Value::Null)
    }

    fn nested<T>(&mut self, key: impl Into<String>, f: impl FnOnce(&mut Self) -> T) -> T {
        self.stack.push(key.into());
        let out = f(self);
        self.stack.pop();
        out
    }

    fn node(&mut self, value: &Value) -> Node {
        match value {
            Value::Array(items) => Node::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.nested(i.to_string(), |c| c.node(item)))
                    .collect(),
            ),
            Value::Object(map) => match directive_kind(map) {
                Some(kind) => {
                    let arg = map.get(kind.key()).unwrap_or(&Value::Null);
                    self.nested(kind.key(), |c| c.directive(kind, arg))
                }
                None => self.object(map),
            },
            scalar => Node::Value(scalar.clone()),
        }
    }

    fn object(&mut self, map: &JsonObject) -> Node {
        if self.options.strict {
            let reserved: Vec<&String> = map.keys().filter(|k| k.starts_with('@')).collect();
            if reserved.len() > 1 {
                return self.fail(format!(
                    "should only have one @-prefixed key but it has {} keys",
                    reserved.len()
                ));
            }
            if let Some(key) = reserved.first() {
                if DirectiveKind::from_key(key).is_none() {
                    return self.fail(format!("has an invalid directive: {key}"));
                }
                return self.fail(format!(
                    "should only have one @-prefixed key but it has {} keys",
                    map.len()
                ));
            }
        }

        Node::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), self.nested(key.as_str(), |c| c.node(value))))
                .collect(),
        )
    }

    fn directive(&mut self, kind: DirectiveKind, arg: &Value) -> Node {
        let directive = match kind {
            DirectiveKind::Path => match self.path_arg(arg) {
                Some(path) => Directive::Path(path),
                None => return Node::Value(Value::Null),
            },
            DirectiveKind::Template => match arg {
                Value::String(source) => Directive::Template(TemplateArg::Static(Template::parse(source))),
                _ if is_directive(arg) => Directive::Template(TemplateArg::Dynamic(self.node(arg))),
                _ => return self.fail(string_or_directive(arg)),
            },
            DirectiveKind::Literal => Directive::Literal(self.node(arg)),
            DirectiveKind::If => match self.condition(arg) {
                Some(directive) => directive,
                None => return Node::Value(Value::Null),
            },
            DirectiveKind::ArrayPath => match self.array_path(arg) {
                Some(directive) => directive,
                None => return Node::Value(Value::Null),
            },
        };
        Node::Directive(Box::new(directive))
    }

    fn path_arg(&mut self, arg: &Value) -> Option<PathArg> {
        match arg {
            Value::String(expr) => Some(PathArg::Static(JsonPath::parse(expr))),
            _ if is_directive(arg) => Some(PathArg::Dynamic(self.node(arg))),
            _ => {
                self.fail(string_or_directive(arg));
                None
            }
        }
    }

    fn condition(&mut self, arg: &Value) -> Option<Directive> {
        let Value::Object(map) = arg else {
            self.fail(format!(
                "should be an object but it is {}",
                ValueType::of(arg).with_article()
            ));
            return None;
        };

        let mut valid = true;
        for key in map.keys() {
            if !matches!(key.as_str(), "exists" | "blank" | "then" | "else") {
                self.fail(format!("has an unexpected key {key:?}"));
                valid = false;
            }
        }

        let condition = match (map.get("exists"), map.get("blank")) {
            (Some(test), None) => Some(Condition::Exists(self.nested("exists", |c| c.node(test)))),
            (None, Some(test)) => Some(Condition::Blank(self.nested("blank", |c| c.node(test)))),
            (Some(_), Some(_)) => {
                self.fail("should have only one of \"exists\" or \"blank\" but it has both");
                None
            }
            (None, None) => {
                self.fail("should have field \"exists\" or \"blank\" but it doesn't");
                None
            }
        };

        let then = map.get("then").map(|v| self.nested("then", |c| c.node(v)));
        let otherwise = map.get("else").map(|v| self.nested("else", |c| c.node(v)));

        match condition {
            Some(condition) if valid => Some(Directive::If {
                condition,
                then,
                otherwise,
            }),
            _ => None,
        }
    }

    fn array_path(&mut self, arg: &Value) -> Option<Directive> {
        let Value::Array(items) = arg else {
            self.fail(format!(
                "should be an array but it is {}",
                ValueType::of(arg).with_article()
            ));
            return None;
        };

        if items.is_empty() || items.len() > 2 {
            self.fail(format!(
                "should have a path and an optional shape but it has {} elements",
                items.len()
            ));
            return None;
        }

        let path = self.nested("0", |c| c.path_arg(&items[0]))?;
        let shape = items.get(1).map(|shape| self.nested("1", |c| c.node(shape)));

        Some(Directive::ArrayPath { path, shape })
    }
}

fn string_or_directive(arg: &Value) -> String {
    format!(
        "should be a string or a mapping directive but it is {}",
        ValueType::of(arg).with_article()
    )
}
