//! Path expression parser and resolver

use serde_json::Value;
use std::fmt;

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member, or array index when the text is numeric
    Key(String),
    /// Bracketed array index (`[n]`)
    Index(usize),
}

/// A parsed path expression
///
/// Accepted forms: `""`, `"$"` and `"$."` address the root; `$.a.b`,
/// `a.b`, `$.a[0].b` and `$.a.0.b` address nested members. Segment
/// text is taken verbatim, spaces included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parse a path expression
    pub fn parse(expr: &str) -> Self {
        let rest = if expr == "$" {
            ""
        } else if let Some(rest) = expr.strip_prefix("$.") {
            rest
        } else if expr.starts_with("$[") {
            &expr[1..]
        } else {
            expr
        };

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('.') {
                parse_segment(part, &mut segments);
            }
        }

        Self { segments }
    }

    /// Path addressing the root value
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this path addresses the root value
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Resolve this path against a value
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let mut current = value;
        for segment in &self.segments {
            current = match (current, segment) {
                (Value::Object(map), Segment::Key(key)) => map.get(key)?,
                (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string())?,
                (Value::Array(items), Segment::Key(key)) => {
                    let index: usize = key.parse().ok()?;
                    items.get(index)?
                }
                (Value::Array(items), Segment::Index(index)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl From<&str> for JsonPath {
    fn from(expr: &str) -> Self {
        Self::parse(expr)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Parse `name[0][1]` into segments, keeping malformed brackets as key text
fn parse_segment(part: &str, out: &mut Vec<Segment>) {
    match split_brackets(part) {
        Some(parsed) => out.extend(parsed),
        None => out.push(Segment::Key(part.to_string())),
    }
}

fn split_brackets(part: &str) -> Option<Vec<Segment>> {
    let open = part.find('[')?;
    if !part.ends_with(']') {
        return None;
    }

    let mut segments = Vec::new();
    let name = &part[..open];
    if !name.is_empty() {
        segments.push(Segment::Key(name.to_string()));
    }

    let mut rest = &part[open..];
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let content = &inner[..close];
        match content.parse::<usize>() {
            Ok(index) => segments.push(Segment::Index(index)),
            Err(_) => segments.push(Segment::Key(content.to_string())),
        }
        rest = &inner[close + 1..];
    }

    Some(segments)
}

/// Resolve a path expression against an event
///
/// Returns `None` when any segment is missing; never panics on
/// unexpected shapes.
pub fn resolve_path<'a>(event: &'a Value, expr: &str) -> Option<&'a Value> {
    JsonPath::parse(expr).resolve(event)
}
