//! Action pipeline module
//!
//! Turns events into validated destination payloads.
//!
//! # Overview
//!
//! The action module provides:
//! - `ActionDefinition` - Declarative action: name, title, fields
//! - `Action` - Map input, validate, load cached fields
//! - `BatchReport` - Per-event outcomes for a batch
//!
//! Each event goes through the same steps:
//!
//! ```text
//! event ──► effective mapping ──► resolve ──► validate/coerce ──► payload
//!                                                                   │
//!                              cached fields (RequestContext) ◄─────┘
//! ```

mod executor;
mod types;

pub use executor::Action;
pub use types::{ActionDefinition, BatchReport, CachedField, ExecuteInput, ItemResult};
