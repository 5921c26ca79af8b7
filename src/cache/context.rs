//! Request context

use super::store::FieldCache;
use serde_json::Value;
use std::sync::Arc;

/// Per-request state handed to actions
///
/// Carries destination settings and the cache handle used for cached
/// fields. Nothing here is global: tests and concurrent requests each
/// get their own context unless they share one on purpose.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    settings: Value,
    cache: Arc<FieldCache>,
}

impl RequestContext {
    /// Create a context with its own cache
    pub fn new(settings: Value) -> Self {
        Self {
            settings,
            cache: Arc::new(FieldCache::new()),
        }
    }

    /// Use an existing cache
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<FieldCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Destination settings
    pub fn settings(&self) -> &Value {
        &self.settings
    }

    /// The cache handle
    pub fn cache(&self) -> &FieldCache {
        &self.cache
    }

    /// A shared reference to the cache
    pub fn shared_cache(&self) -> Arc<FieldCache> {
        Arc::clone(&self.cache)
    }
}
