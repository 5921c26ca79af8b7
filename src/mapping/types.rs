//! Mapping tree types
//!
//! A raw mapping is a JSON value. Compiling it produces a `Node` tree in
//! which every directive is an explicit `Directive` variant, so the
//! evaluator never has to inspect object keys again.

use super::template::Template;
use crate::path::JsonPath;
use serde_json::Value;

/// `@path` directive key
pub const PATH: &str = "@path";
/// `@template` directive key
pub const TEMPLATE: &str = "@template";
/// `@if` directive key
pub const IF: &str = "@if";
/// `@literal` directive key
pub const LITERAL: &str = "@literal";
/// `@arrayPath` directive key
pub const ARRAY_PATH: &str = "@arrayPath";

/// The directive vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Path,
    Template,
    If,
    Literal,
    ArrayPath,
}

impl DirectiveKind {
    /// Look up a directive by its reserved key
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            PATH => Some(Self::Path),
            TEMPLATE => Some(Self::Template),
            IF => Some(Self::If),
            LITERAL => Some(Self::Literal),
            ARRAY_PATH => Some(Self::ArrayPath),
            _ => None,
        }
    }

    /// The reserved key for this directive
    pub fn key(self) -> &'static str {
        match self {
            Self::Path => PATH,
            Self::Template => TEMPLATE,
            Self::If => IF,
            Self::Literal => LITERAL,
            Self::ArrayPath => ARRAY_PATH,
        }
    }
}

/// A compiled mapping node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Scalar copied verbatim (null, boolean, number, string)
    Value(Value),
    /// Array resolved element-wise
    Array(Vec<Node>),
    /// Object resolved key by key, in mapping order
    Object(Vec<(String, Node)>),
    /// Directive evaluated against the event
    Directive(Box<Directive>),
}

/// A compiled directive
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `{"@path": "$.a.b"}`
    Path(PathArg),
    /// `{"@template": "Hello {{ name }}"}`
    Template(TemplateArg),
    /// `{"@if": {"exists": ..., "then": ..., "else": ...}}`
    If {
        condition: Condition,
        then: Option<Node>,
        otherwise: Option<Node>,
    },
    /// `{"@literal": ...}`
    Literal(Node),
    /// `{"@arrayPath": ["$.products", {...}]}`
    ArrayPath {
        path: PathArg,
        shape: Option<Node>,
    },
}

/// Argument of `@path` and `@arrayPath`
#[derive(Debug, Clone, PartialEq)]
pub enum PathArg {
    /// Path string parsed at compile time
    Static(JsonPath),
    /// Directive resolved per event: its string result is the path for
    /// `@path`, its value is the array root for `@arrayPath`
    Dynamic(Node),
}

/// Argument of `@template`
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg {
    /// Template string parsed at compile time
    Static(Template),
    /// Directive whose string result is parsed per event
    Dynamic(Node),
}

/// Test performed by `@if`
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// True unless the value is absent or null
    Exists(Node),
    /// True unless the value is absent, null or an empty string
    Blank(Node),
}

/// Options applied while compiling a mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Reject any `@`-prefixed key that is not a well-formed directive
    pub strict: bool,
}

impl CompileOptions {
    /// Strict compilation
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Options applied while resolving a mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// HTML-escape `{{ }}` template substitutions; `{{{ }}}` stays raw
    pub escape_html: bool,
}

impl ResolveOptions {
    /// Resolution with mustache-style HTML escaping
    pub fn escape_html() -> Self {
        Self { escape_html: true }
    }
}
