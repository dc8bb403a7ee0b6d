//! Solver configuration.
//!
//! Options are read from JSON in the same camelCase spelling compiler options
//! use, so a host can embed them in its own config file:
//!
//! ```json
//! { "maxInstantiationDepth": 50, "strictFunctionTypes": true }
//! ```

use anyhow::{Context, Result, bail};
use condtype_common::limits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Overrides `maxInstantiationDepth` when set to a positive integer.
pub const MAX_INSTANTIATION_DEPTH_ENV: &str = "CONDTYPE_MAX_INSTANTIATION_DEPTH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverOptions {
    /// Nesting bound for generic alias expansion. Exceeding it yields the
    /// error marker and a `RecursionLimitExceeded` diagnostic.
    pub max_instantiation_depth: u32,
    pub max_evaluation_depth: u32,
    pub max_subtype_depth: u32,
    /// Work budget shared by the guards of one evaluator.
    pub max_iterations: u32,
    /// Largest union a distributive conditional expands over.
    pub max_distribution_size: usize,
    /// When false, function parameters are compared bivariantly.
    pub strict_function_types: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            max_instantiation_depth: limits::MAX_INSTANTIATION_DEPTH,
            max_evaluation_depth: limits::MAX_EVALUATION_DEPTH,
            max_subtype_depth: limits::MAX_SUBTYPE_DEPTH,
            max_iterations: limits::MAX_TOTAL_ITERATIONS,
            max_distribution_size: limits::MAX_DISTRIBUTION_SIZE,
            strict_function_types: true,
        }
    }
}

impl SolverOptions {
    pub fn from_json(source: &str) -> Result<Self> {
        let options: SolverOptions =
            serde_json::from_str(source).context("failed to parse solver options JSON")?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read solver options: {}", path.display()))?;
        Self::from_json(&source)
            .with_context(|| format!("failed to load solver options: {}", path.display()))
    }

    /// Apply `CONDTYPE_MAX_INSTANTIATION_DEPTH` if present.
    pub fn with_env_overrides(self) -> Result<Self> {
        match std::env::var(MAX_INSTANTIATION_DEPTH_ENV) {
            Ok(value) => self.with_depth_override(&value),
            Err(_) => Ok(self),
        }
    }

    fn with_depth_override(mut self, value: &str) -> Result<Self> {
        let depth: u32 = value
            .trim()
            .parse()
            .with_context(|| format!("invalid {MAX_INSTANTIATION_DEPTH_ENV} value '{value}'"))?;
        debug!(depth, "solver options: instantiation depth overridden from environment");
        self.max_instantiation_depth = depth;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.max_instantiation_depth == 0 {
            bail!("maxInstantiationDepth must be at least 1");
        }
        if self.max_evaluation_depth == 0 || self.max_subtype_depth == 0 {
            bail!("maxEvaluationDepth and maxSubtypeDepth must be at least 1");
        }
        if self.max_distribution_size == 0 {
            bail!("maxDistributionSize must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
