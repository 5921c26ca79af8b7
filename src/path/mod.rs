//! Path resolution module
//!
//! Resolves `$.a.b[0].c` style expressions against an event.
//!
//! # Overview
//!
//! The path module provides:
//! - `JsonPath` - A parsed, reusable path expression
//! - `resolve_path` - One-shot parse and resolve
//!
//! Resolution never fails: a missing segment, a `null` or scalar
//! intermediate, or an out-of-range index all yield `None`.

mod resolver;

pub use resolver::{resolve_path, JsonPath, Segment};
