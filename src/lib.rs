//! TypeScript conditional type resolution.
//!
//! The solver lives in `condtype-solver`; shared atoms, limits and
//! diagnostic templates live in `condtype-common`. This crate re-exports
//! both and adds process-level tracing setup.
//!
//! ```
//! use condtype::{DefinitionInfo, DefinitionStore, QueryCache, TypeId, TypeInterner, TypeParamInfo};
//!
//! // type IsString<T> = T extends string ? "yes" : "no"
//! let interner = TypeInterner::new();
//! let defs = DefinitionStore::new();
//! let t_name = interner.intern_string("T");
//! let t = interner.type_param(TypeParamInfo::unconstrained(t_name));
//! let yes = interner.literal_string("yes");
//! let no = interner.literal_string("no");
//! let body = interner.declare_conditional(t, TypeId::STRING, yes, no);
//! let is_string = defs.register(DefinitionInfo::type_alias(
//!     interner.intern_string("IsString"),
//!     vec![TypeParamInfo::unconstrained(t_name)],
//!     body,
//! ));
//!
//! let db = QueryCache::new(&interner, &defs);
//! let applied = interner.application(
//!     interner.lazy(is_string),
//!     vec![interner.union2(TypeId::STRING, TypeId::NUMBER)],
//! );
//! assert_eq!(db.evaluate_type(applied), interner.union2(yes, no));
//! ```

pub use condtype_common as common;
pub use condtype_solver as solver;

pub use condtype_common::{Atom, Diagnostic, DiagnosticCategory};
pub use condtype_solver::*;

// Tracing configuration (text / tree / JSON output)
pub mod tracing_config;
pub use tracing_config::{LogFormat, init_tracing};
