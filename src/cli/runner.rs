//! CLI runner - executes commands

use crate::action::Action;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::error::{Error, Result, ResultExt};
use crate::loader::{load_action_with, load_events, load_mapping, load_overrides};
use crate::mapping::{resolve_mapping_with, CompileOptions, Mapping, ResolveOptions};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command and print its output
    pub fn run(&self) -> Result<()> {
        if let Some(output) = self.execute()? {
            self.output_message(&output);
        }
        Ok(())
    }

    /// Run the CLI command and return its output
    ///
    /// `None` means there is nothing to print, e.g. a mapping that
    /// resolved to no value.
    pub fn execute(&self) -> Result<Option<Value>> {
        match &self.cli.command {
            Commands::Resolve {
                mapping,
                event,
                event_json,
            } => self.resolve(mapping, event.as_deref(), event_json.as_deref()),
            Commands::Validate { mapping, action } => match (mapping, action) {
                (_, Some(action)) => self.validate_action(action).map(Some),
                (Some(mapping), None) => self.validate_mapping(mapping).map(Some),
                (None, None) => Err(Error::config("Specify --mapping or --action")),
            },
            Commands::Run {
                action,
                events,
                overrides,
            } => self.run_action(action, events, overrides.as_deref()).map(Some),
        }
    }

    fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            strict: self.cli.strict,
        }
    }

    fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            escape_html: self.cli.escape_html,
        }
    }

    /// Load the event from a file or inline JSON
    fn load_event(&self, path: Option<&Path>, inline: Option<&str>) -> Result<Value> {
        // Inline event takes precedence
        if let Some(json_str) = inline {
            return serde_json::from_str(json_str).context("Invalid event JSON");
        }

        if let Some(path) = path {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read event file '{}'", path.display()))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Invalid event JSON in '{}'", path.display()));
        }

        Err(Error::config("Event not specified (use --event or --event-json)"))
    }

    fn resolve(
        &self,
        mapping: &Path,
        event: Option<&Path>,
        event_json: Option<&str>,
    ) -> Result<Option<Value>> {
        let document = load_mapping(mapping)?;
        let event = self.load_event(event, event_json)?;

        let resolved = resolve_mapping_with(
            &document,
            &event,
            &self.compile_options(),
            &self.resolve_options(),
        )?;
        if resolved.is_none() {
            info!("Mapping {} resolved to no value", mapping.display());
        }
        Ok(resolved)
    }

    fn validate_mapping(&self, path: &Path) -> Result<Value> {
        let document = load_mapping(path)?;
        Mapping::compile_with(&document, &self.compile_options())?;
        debug!("Mapping {} compiled", path.display());

        Ok(json!({
            "valid": true,
            "mapping": path.display().to_string(),
        }))
    }

    fn validate_action(&self, path: &Path) -> Result<Value> {
        let definition = load_action_with(path, &self.compile_options())?;

        Ok(json!({
            "valid": true,
            "action": definition.name,
            "fields": definition.fields.names(),
        }))
    }

    fn run_action(&self, action: &Path, events: &Path, overrides: Option<&Path>) -> Result<Value> {
        let options = self.compile_options();
        let action = Action::new_with(load_action_with(action, &options)?, options)?
            .with_resolve_options(self.resolve_options());
        let overrides = overrides.map(load_overrides).transpose()?;
        let events = load_events(events)?;

        info!(
            "Running action {} over {} events",
            action.definition().name,
            events.len()
        );
        let report = action.map_batch(&events, overrides.as_ref())?;
        info!(
            "Action {} finished: {} succeeded, {} failed",
            action.definition().name,
            report.succeeded(),
            report.failed()
        );

        Ok(serde_json::to_value(&report)?)
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
