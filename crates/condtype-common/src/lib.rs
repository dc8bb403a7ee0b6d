//! Common types and utilities for the condtype solver.
//!
//! This crate provides foundational types shared by the solver crates:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Solver limits and thresholds
//! - Diagnostic codes, message templates and rendered diagnostics

// String interning for property names, type parameter names and string literals
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Centralized limits and thresholds
pub mod limits;

// Diagnostic codes and message templates
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessage};
