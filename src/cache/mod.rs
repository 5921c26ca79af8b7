//! Request-scoped caching module
//!
//! Replaces process-wide caches with explicit handles.
//!
//! # Overview
//!
//! The cache module provides:
//! - `FieldCache` - TTL cache for values fetched while building a payload
//! - `RequestContext` - Settings plus a cache handle, passed into every call
//!
//! Two contexts built with separate caches never observe each other's
//! entries; contexts cloned from one another share the same cache.

mod context;
mod store;

pub use context::RequestContext;
pub use store::{CacheLookup, FieldCache};
