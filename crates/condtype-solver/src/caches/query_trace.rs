//! Structured query tracing for the `QueryCache` entry points.
//!
//! Events use target `condtype::query_json` and are meant to be consumed with
//! `CONDTYPE_LOG=condtype::query_json=trace CONDTYPE_LOG_FORMAT=json`.
//!
//! Environment:
//! - `CONDTYPE_QUERY_RUN_ID`: optional run identifier attached to every event.

use crate::types::{SubtypeResult, TypeId};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static QUERY_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "condtype::query_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    QUERY_RUN_ID
        .get_or_init(|| {
            std::env::var("CONDTYPE_QUERY_RUN_ID").unwrap_or_else(|_| "default".to_string())
        })
        .as_str()
}

#[inline]
pub(crate) fn unary_start(query_id: u64, op: &'static str, input: TypeId) {
    trace!(
        target: "condtype::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op,
        input_type_id = input.0
    );
}

#[inline]
pub(crate) fn unary_end(
    query_id: u64,
    op: &'static str,
    result_type: TypeId,
    diagnostics: usize,
    cache_hit: bool,
) {
    trace!(
        target: "condtype::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op,
        result_type_id = result_type.0,
        diagnostics,
        cache_hit
    );
}

#[inline]
pub(crate) fn relation_start(query_id: u64, op: &'static str, source: TypeId, target: TypeId) {
    trace!(
        target: "condtype::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op,
        source_type_id = source.0,
        target_type_id = target.0
    );
}

#[inline]
pub(crate) fn relation_end(query_id: u64, op: &'static str, result: SubtypeResult, cache_hit: bool) {
    trace!(
        target: "condtype::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op,
        result = ?result,
        cache_hit
    );
}
