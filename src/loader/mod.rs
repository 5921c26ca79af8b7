//! File loader module
//!
//! Read action definitions, mappings and event files from disk.
//!
//! # Overview
//!
//! The loader module provides:
//! - `load_action` - Declarative action definition from YAML or JSON
//! - `load_mapping` / `load_overrides` - Mapping documents
//! - `load_events` - Events from a JSON array or JSONL file

mod parser;

pub use parser::{
    load_action, load_action_from_str, load_action_from_str_with, load_action_with, load_events,
    load_mapping, load_mapping_from_str, load_overrides, parse_events,
};
