//! Action types

use crate::error::{Error, Result};
use crate::schema::FieldSet;
use crate::types::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Declarative action definition, loaded from YAML or JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    /// Unique identifier, e.g. `trackEvent`
    pub name: String,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Display description
    #[serde(default)]
    pub description: String,

    /// Subscription query used when the action is first set up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_subscription: Option<String>,

    /// Hide from configuration UIs
    #[serde(default)]
    pub hidden: bool,

    /// Payload fields
    #[serde(default)]
    pub fields: FieldSet,
}

impl ActionDefinition {
    /// Create a definition with no fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            description: String::new(),
            default_subscription: None,
            hidden: false,
            fields: FieldSet::new(),
        }
    }

    /// Set the fields
    #[must_use]
    pub fn with_fields(mut self, fields: FieldSet) -> Self {
        self.fields = fields;
        self
    }
}

/// Everything available once an event has been mapped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteInput {
    /// Validated payload
    pub payload: JsonObject,
    /// Destination settings from the request context
    pub settings: Value,
    /// Values loaded by cached fields, keyed by field name
    pub cached_fields: JsonObject,
}

type KeyFn = Arc<dyn Fn(&ExecuteInput) -> String + Send + Sync>;
type ValueFn = Arc<dyn Fn(&ExecuteInput) -> Result<Option<Value>> + Send + Sync>;

/// A value fetched once per key and reused across events
///
/// A value function returning a 404-status error counts as "no value".
/// Empty results are only cached when `negative` is set.
#[derive(Clone)]
pub struct CachedField {
    /// Name under which the value appears in `ExecuteInput::cached_fields`
    pub name: String,
    /// How long a value stays cached
    pub ttl: Duration,
    /// Cache empty results too
    pub negative: bool,
    key: KeyFn,
    value: ValueFn,
}

impl CachedField {
    /// Create a cached field
    pub fn new<K, V>(name: impl Into<String>, ttl: Duration, key: K, value: V) -> Self
    where
        K: Fn(&ExecuteInput) -> String + Send + Sync + 'static,
        V: Fn(&ExecuteInput) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            ttl,
            negative: false,
            key: Arc::new(key),
            value: Arc::new(value),
        }
    }

    /// Cache empty results as well
    #[must_use]
    pub fn negative(mut self) -> Self {
        self.negative = true;
        self
    }

    /// Cache key for an input, namespaced by field name
    pub(crate) fn key_for(&self, input: &ExecuteInput) -> String {
        format!("{}:{}", self.name, (self.key)(input))
    }

    /// Produce the value for an input
    pub(crate) fn fetch(&self, input: &ExecuteInput) -> Result<Option<Value>> {
        match (self.value)(input) {
            Err(e) if e.status() == 404 => Ok(None),
            other => other,
        }
    }
}

impl fmt::Debug for CachedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedField")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("negative", &self.negative)
            .finish_non_exhaustive()
    }
}

/// Outcome for one event of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemResult {
    /// The event mapped to a valid payload
    Success { status: u16, payload: Value },
    /// The event was rejected
    Failure {
        status: u16,
        code: String,
        message: String,
        retryable: bool,
    },
}

impl ItemResult {
    /// Build a failure entry from an error
    pub fn failure(error: &Error) -> Self {
        Self::Failure {
            status: error.status(),
            code: error.code().to_string(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }

    /// Whether the event succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// HTTP-style status of the outcome
    pub fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. } | Self::Failure { status, .. } => *status,
        }
    }
}

impl From<Result<JsonObject>> for ItemResult {
    fn from(result: Result<JsonObject>) -> Self {
        match result {
            Ok(payload) => Self::Success {
                status: 200,
                payload: Value::Object(payload),
            },
            Err(e) => Self::failure(&e),
        }
    }
}

/// Per-event outcomes of a batch, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub items: Vec<ItemResult>,
}

impl BatchReport {
    /// Number of events that succeeded
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.is_success()).count()
    }

    /// Number of events that failed
    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// Payloads of the successful events, in input order
    pub fn payloads(&self) -> Vec<&Value> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ItemResult::Success { payload, .. } => Some(payload),
                ItemResult::Failure { .. } => None,
            })
            .collect()
    }
}
