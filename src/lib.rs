// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]

//! # mapkit
//!
//! A declarative event mapping engine. A mapping is a JSON document that
//! mirrors the shape of the desired output; embedded directives pull values
//! out of an incoming event, render templates, branch on presence and
//! reshape arrays.
//!
//! ## Features
//!
//! - **Path lookup**: `$.properties.products[0].sku` style paths
//! - **Directives**: `@path`, `@template`, `@if`, `@literal`, `@arrayPath`
//! - **Compile once**: malformed directives are reported with their location
//!   before any event is evaluated
//! - **Field schemas**: typed action fields with defaults, coercion and validation
//! - **Cached fields**: per-request memoization of derived values
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mapkit::{resolve_mapping, Result};
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let mapping = json!({
//!         "email": {"@path": "$.traits.email"},
//!         "greeting": {"@template": "Hello {{ traits.name }}"}
//!     });
//!     let event = json!({"traits": {"email": "ada@example.com", "name": "Ada"}});
//!
//!     let output = resolve_mapping(&mapping, &event)?;
//!     assert_eq!(
//!         output,
//!         Some(json!({"email": "ada@example.com", "greeting": "Hello Ada"}))
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Action                               │
//! │  map_input() → payload    execute() → ExecuteInput           │
//! │  map_batch() → BatchReport                                   │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────┬───────────────┴─────┬──────────────┬───────────┐
//! │   Schema    │      Mapping        │     Path     │   Cache   │
//! ├─────────────┼─────────────────────┼──────────────┼───────────┤
//! │ FieldSet    │ compile → Node      │ JsonPath     │ FieldCache│
//! │ defaults    │ resolve(event)      │ resolve_path │ TTL       │
//! │ validation  │ Template            │              │ negative  │
//! └─────────────┴─────────────────────┴──────────────┴───────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document enum variant fields before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Path expressions over JSON events
pub mod path;

/// Mapping directives: compile and resolve
pub mod mapping;

/// Action field schemas and payload validation
pub mod schema;

/// Per-request cache for cached fields
pub mod cache;

/// Action pipeline
pub mod action;

/// File loader for actions, mappings and events
pub mod loader;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use action::{Action, ActionDefinition, BatchReport, ItemResult};
pub use loader::{load_action, load_action_from_str};
pub use mapping::{resolve_mapping, resolve_mapping_with, CompileOptions, Mapping, ResolveOptions};
pub use path::resolve_path;
pub use schema::{FieldSchema, FieldSet, FieldType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
