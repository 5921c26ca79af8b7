//! CLI module
//!
//! Command-line interface for evaluating mappings and actions.
//!
//! # Commands
//!
//! - `resolve` - Resolve a mapping against one event
//! - `validate` - Check a mapping or action definition for malformed directives
//! - `run` - Map a file of events through an action

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
