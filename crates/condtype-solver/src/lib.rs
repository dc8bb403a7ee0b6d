//! Conditional Type Solver
//!
//! Resolution of TypeScript-style conditional types over an interned,
//! structural type graph:
//!
//! - **Substitution**: `instantiate_type` binds type parameters without
//!   evaluating anything
//! - **Resolution**: `TypeEvaluator::resolve_conditional` decides
//!   `T extends U ? X : Y`, distributing over unions and capturing `infer`
//!   variables, and defers what is still generic
//! - **Assignability**: `SubtypeChecker` relates types structurally, with
//!   variance-based rules for two instantiations of the same alias
//!
//! Key properties:
//! - O(1) type equality via interning (`TypeId` comparison)
//! - Alias instantiations are memoized per `(alias, arguments)` and shared
//!   across threads through `ResolutionCache`, computed at most once each
//! - Every recursion is bounded; overflow yields the error marker and a
//!   diagnostic instead of a stack overflow
pub mod caches;
mod db;
pub mod def;
pub mod diagnostics;
mod evaluate;
pub mod evaluate_rules;
mod format;
mod instantiate;
mod intern;
pub mod options;
pub mod recursion;
mod subtype;
mod subtype_rules;
pub mod types;
pub mod variance;
pub mod visitor;

pub use caches::resolution_cache::{
    CachedResolution, ResolutionCache, ResolutionCacheStats, ResolutionKey,
};
pub use db::{QueryCache, Resolution, TypeDatabase};
pub use def::{DefId, DefKind, DefinitionInfo, DefinitionStore, LibAliases, NoopResolver, TypeResolver};
pub use diagnostics::{SolverDiagnostic, SolverDiagnosticKind, SubtypeFailureReason};
pub use evaluate::{TypeEvaluator, evaluate_type, resolve_conditional};
pub use format::TypeFormatter;
pub use instantiate::{TypeInstantiator, TypeSubstitution, instantiate_type};
pub use intern::TypeInterner;
pub use options::SolverOptions;
pub use subtype::{SubtypeChecker, is_subtype_of};
pub use types::*;
pub use variance::Variance;
