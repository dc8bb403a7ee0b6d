//! Tracing configuration for inspecting conditional type resolution.
//!
//! Output format is chosen by `CONDTYPE_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: hierarchical indented output via `tracing-tree`, one level per
//!   nested alias expansion or assignability check
//! - `json`: one JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! # Alias cache hits and misses
//! CONDTYPE_LOG="query_trace=trace" cargo test
//!
//! # Nested resolution as a tree
//! CONDTYPE_LOG="condtype_solver=trace" CONDTYPE_LOG_FORMAT=tree cargo test
//! ```
//!
//! Nothing is installed unless `CONDTYPE_LOG` (or `RUST_LOG`) is set.

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const LOG_ENV: &str = "CONDTYPE_LOG";
const LOG_FORMAT_ENV: &str = "CONDTYPE_LOG_FORMAT";

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Standard flat text lines.
    #[default]
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Unknown names fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var(LOG_FORMAT_ENV).unwrap_or_default())
    }
}

/// `CONDTYPE_LOG` takes precedence over `RUST_LOG`.
fn build_filter() -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when neither `CONDTYPE_LOG` nor `RUST_LOG` is set.
/// Fails if another global subscriber is already installed.
///
/// All output goes to stderr.
pub fn init_tracing() -> Result<bool> {
    if std::env::var_os(LOG_ENV).is_none() && std::env::var_os("RUST_LOG").is_none() {
        return Ok(false);
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(text_layer).try_init()
        }
    }
    .context("a global tracing subscriber is already installed")?;
    Ok(true)
}
