//! Action execution

use super::types::{ActionDefinition, BatchReport, CachedField, ExecuteInput, ItemResult};
use crate::cache::{CacheLookup, RequestContext};
use crate::error::Result;
use crate::mapping::{ensure_event, CompileOptions, Mapping, ResolveOptions};
use crate::schema::{compile_fields_with, validate_payload};
use crate::types::JsonObject;
use serde_json::Value;
use tracing::{debug, warn};

/// An action ready to map events
#[derive(Debug, Clone)]
pub struct Action {
    definition: ActionDefinition,
    cached_fields: Vec<CachedField>,
    compile_options: CompileOptions,
    resolve_options: ResolveOptions,
}

impl Action {
    /// Create an action, checking that every field default compiles
    pub fn new(definition: ActionDefinition) -> Result<Self> {
        Self::new_with(definition, CompileOptions::default())
    }

    /// Create an action whose mappings are compiled with `options`
    ///
    /// Defaults are checked under the same options, so a strict action
    /// rejects defaults that only compile leniently.
    pub fn new_with(definition: ActionDefinition, options: CompileOptions) -> Result<Self> {
        compile_fields_with(&definition.fields, None, &options)?;
        Ok(Self {
            definition,
            cached_fields: Vec::new(),
            compile_options: options,
            resolve_options: ResolveOptions::default(),
        })
    }

    /// Register a cached field
    #[must_use]
    pub fn with_cached_field(mut self, field: CachedField) -> Self {
        self.cached_fields.push(field);
        self
    }

    /// Set resolve options
    #[must_use]
    pub fn with_resolve_options(mut self, options: ResolveOptions) -> Self {
        self.resolve_options = options;
        self
    }

    /// The action definition
    pub fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    /// Compile the effective mapping for an explicit subscription mapping
    ///
    /// Compile once and reuse the result for every event of a batch.
    pub fn compile_mapping(&self, mapping: Option<&JsonObject>) -> Result<Mapping> {
        compile_fields_with(&self.definition.fields, mapping, &self.compile_options)
    }

    /// Map one event to a validated payload
    pub fn map_input(&self, event: &Value, mapping: Option<&JsonObject>) -> Result<JsonObject> {
        let compiled = self.compile_mapping(mapping)?;
        self.map_compiled(&compiled, event)
    }

    /// Map one event with a precompiled mapping
    pub fn map_compiled(&self, mapping: &Mapping, event: &Value) -> Result<JsonObject> {
        ensure_event(event)?;

        let mut payload = match mapping.resolve_with(event, &self.resolve_options) {
            Some(Value::Object(payload)) => payload,
            _ => JsonObject::new(),
        };
        validate_payload(&self.definition.fields, &mut payload)?;

        debug!(
            "Mapped event for action {} ({} fields)",
            self.definition.name,
            payload.len()
        );
        Ok(payload)
    }

    /// Map one event and load cached fields
    pub fn execute(
        &self,
        event: &Value,
        mapping: Option<&JsonObject>,
        ctx: &RequestContext,
    ) -> Result<ExecuteInput> {
        let payload = self.map_input(event, mapping)?;
        self.load_cached_fields(payload, ctx)
    }

    /// Map every event independently
    ///
    /// A mapping that fails to compile fails the whole call; an event that
    /// fails to map or validate only fails its own entry.
    pub fn map_batch(&self, events: &[Value], mapping: Option<&JsonObject>) -> Result<BatchReport> {
        let compiled = self.compile_mapping(mapping)?;

        let items = events
            .iter()
            .enumerate()
            .map(|(i, event)| {
                let result = self.map_compiled(&compiled, event);
                if let Err(e) = &result {
                    warn!("Event {} rejected by action {}: {}", i, self.definition.name, e);
                }
                ItemResult::from(result)
            })
            .collect();

        Ok(BatchReport { items })
    }

    fn load_cached_fields(&self, payload: JsonObject, ctx: &RequestContext) -> Result<ExecuteInput> {
        let mut input = ExecuteInput {
            payload,
            settings: ctx.settings().clone(),
            cached_fields: JsonObject::new(),
        };

        for field in &self.cached_fields {
            let key = field.key_for(&input);
            let value = match ctx.cache().get(&key) {
                CacheLookup::Hit(value) => {
                    debug!("Cache hit for {}", key);
                    value
                }
                CacheLookup::Miss => {
                    debug!("Cache miss for {}", key);
                    let value = field.fetch(&input)?;
                    if value.is_some() || field.negative {
                        ctx.cache().set(key, value.clone(), field.ttl);
                    }
                    value
                }
            };

            if let Some(value) = value {
                input.cached_fields.insert(field.name.clone(), value);
            }
        }

        Ok(input)
    }
}
