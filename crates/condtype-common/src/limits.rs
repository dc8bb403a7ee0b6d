//! Centralized limits and thresholds for the conditional-type solver.
//!
//! These are the default values for `SolverOptions`; every guard in the solver
//! reads its limit from the options rather than from a literal at the call site.
//!
//! # Categories
//!
//! - **Recursion Depths**: Limits that guarantee termination on circular or
//!   expansive alias references
//! - **Operation Counts**: Work budgets for a single evaluator
//! - **Capacity Limits**: Maximum sizes of intermediate unions

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum depth for generic alias instantiation.
///
/// Each nested expansion of a generic alias application (`Alias<Args>`) adds a
/// level. When this depth is exceeded the resolution yields the error-marker
/// type and reports **TS2589**:
/// *"Type instantiation is excessively deep and possibly infinite."*
///
/// # TypeScript example
///
/// ```typescript
/// // Expansive recursion: every step produces new arguments.
/// type Loop<T> = T extends object ? Loop<{ next: T }> : T;
/// type Boom = Loop<{}>;
/// //   ~~~~ TS2589
///
/// // Finite recursion over nested object shapes terminates well below the limit.
/// type A2<T, V, E> =
///     T extends object ? T extends any[] ? T : { [Q in keyof T]: A2<T[Q], V, E> } : T;
/// type Ok = A2<{ a: { b: { c: string } } }, string, never>;
/// ```
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum nesting of `evaluate` calls inside one evaluator.
///
/// Structural evaluation (mapped templates, index access chains, nested
/// conditional branches) recurses through the type graph. Alias expansion is
/// bounded separately by [`MAX_INSTANTIATION_DEPTH`]; this limit protects the
/// call stack from everything else.
pub const MAX_EVALUATION_DEPTH: u32 = 100;

/// Maximum nesting of structural assignability checks.
///
/// Deep structural comparison of recursive object types can nest before a
/// `(source, target)` cycle is found. Beyond this depth the check answers
/// `Unknown`.
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Maximum nesting when walking a type for variance measurement.
pub const MAX_VARIANCE_DEPTH: u32 = 50;

/// Maximum nesting when instantiating a single type with a substitution.
pub const MAX_SUBSTITUTION_DEPTH: u32 = 100;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Total number of guarded steps a single evaluator or checker may take.
///
/// Bounds pathological inputs that stay shallow but fan out widely.
pub const MAX_TOTAL_ITERATIONS: u32 = 100_000;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Maximum number of union members a distributive conditional expands over.
///
/// # TypeScript example
///
/// ```typescript
/// type Digits = 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9;
/// type Pairs<T> = T extends Digits ? [T, Digits] : never;
/// type All = Pairs<Digits>; // 10 members, far below the limit
/// ```
pub const MAX_DISTRIBUTION_SIZE: usize = 10_000;
