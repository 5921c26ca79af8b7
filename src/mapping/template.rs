//! Template rendering for `@template`
//!
//! Handles `{{ path }}` and `{{{ path }}}` placeholders. Paths use the
//! same syntax as `@path`, with or without the `$.` prefix.

use crate::path::JsonPath;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching placeholders: {{{ raw.path }}} or {{ path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\{\s*([^{}]*?)\s*\}\}\}|\{\{\s*([^{}]*?)\s*\}\}").unwrap()
});

/// A piece of a parsed template
#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(String),
    Var { path: JsonPath, raw: bool },
}

/// A parsed template string
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    /// Parse a template string
    pub fn parse(source: &str) -> Self {
        let mut parts = Vec::new();
        let mut last = 0;

        for cap in TEMPLATE_REGEX.captures_iter(source) {
            let Some(full) = cap.get(0) else { continue };
            if full.start() > last {
                parts.push(Part::Text(source[last..full.start()].to_string()));
            }
            let (inner, raw) = match (cap.get(1), cap.get(2)) {
                (Some(m), _) => (m.as_str(), true),
                (None, Some(m)) => (m.as_str(), false),
                (None, None) => continue,
            };
            last = full.end();
            // `{{}}` names nothing and renders empty
            if inner.is_empty() {
                continue;
            }
            parts.push(Part::Var {
                path: JsonPath::parse(inner),
                raw,
            });
        }

        if last < source.len() {
            parts.push(Part::Text(source[last..].to_string()));
        }

        Self { parts }
    }

    /// Render against an event; missing values render as an empty string
    pub fn render(&self, event: &Value, escape_html: bool) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Var { path, raw } => {
                    let Some(value) = path.resolve(event) else {
                        continue;
                    };
                    let text = value_to_string(value);
                    if escape_html && !raw {
                        push_escaped(&mut out, &text);
                    } else {
                        out.push_str(&text);
                    }
                }
            }
        }
        out
    }

    /// Paths referenced by the template, in order
    pub fn variables(&self) -> Vec<String> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Var { path, .. } => Some(path.to_string()),
                Part::Text(_) => None,
            })
            .collect()
    }
}

/// Check if a string contains placeholders
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Convert a JSON value to a string for template substitution
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // For complex types, use JSON serialization
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Mustache-compatible HTML escaping
fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            _ => out.push(c),
        }
    }
}
