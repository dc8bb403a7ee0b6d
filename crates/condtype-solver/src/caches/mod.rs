//! Shared caches used by the query layer.

pub mod query_trace;
pub mod resolution_cache;
