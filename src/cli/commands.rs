//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Declarative event mapping CLI
#[derive(Parser, Debug)]
#[command(name = "mapkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Reject objects that look like directives but are not exactly one
    #[arg(long, global = true)]
    pub strict: bool,

    /// HTML-escape `{{ }}` template substitutions
    #[arg(long, global = true)]
    pub escape_html: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a mapping against one event
    Resolve {
        /// Mapping file (YAML or JSON)
        #[arg(short, long)]
        mapping: PathBuf,

        /// Event file (JSON)
        #[arg(short, long, conflicts_with = "event_json")]
        event: Option<PathBuf>,

        /// Inline event JSON
        #[arg(long)]
        event_json: Option<String>,
    },

    /// Validate a mapping or an action definition
    Validate {
        /// Mapping file (YAML or JSON)
        #[arg(short, long, required_unless_present = "action")]
        mapping: Option<PathBuf>,

        /// Action definition file (YAML or JSON)
        #[arg(short, long, conflicts_with = "mapping")]
        action: Option<PathBuf>,
    },

    /// Map every event of a file through an action
    Run {
        /// Action definition file (YAML or JSON)
        #[arg(short, long)]
        action: PathBuf,

        /// Events file (JSON array or JSONL)
        #[arg(short, long)]
        events: PathBuf,

        /// Per-field mapping overriding the action defaults
        #[arg(short, long)]
        overrides: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}
