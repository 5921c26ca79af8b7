//! Field schema module
//!
//! Declares payload fields, computes the effective mapping from explicit
//! mappings and field defaults, and validates resolved payloads.
//!
//! # Overview
//!
//! The schema module provides:
//! - `FieldSchema` / `FieldSet` - Ordered field declarations
//! - `effective_mapping` - Explicit mapping, else default, else absent
//! - `validate_payload` - Required / null / type checks with coercion

mod defaults;
mod types;
mod validate;

pub use defaults::{compile_fields, compile_fields_with, effective_mapping, resolve_field};
pub use types::{FieldSchema, FieldSet, FieldType};
pub use validate::{is_date_like, validate_payload};

#[cfg(test)]
mod tests;
