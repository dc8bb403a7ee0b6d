//! Type evaluation for meta-types (conditional, mapped, index access, keyof)
//! and generic alias applications.
//!
//! Meta-types are "type-level functions" that compute output types from
//! input types. `TypeEvaluator::evaluate` reduces them as far as the known
//! bindings allow and leaves the rest deferred:
//! - Conditional types: `T extends U ? X : Y`, distributive over unions when
//!   the check type is a naked type parameter
//! - Index access types: `T[K]`
//! - `keyof T`
//! - Mapped types: `{ [K in C]: X }`
//! - Alias references `Lazy(def)` and applications `Alias<Args>`
//!
//! Alias applications are memoized per `(alias, evaluated arguments)` in a
//! local map and, when one is attached, in the shared [`ResolutionCache`].
//! Expansion is bounded by `SolverOptions::max_instantiation_depth`; beyond it
//! the result is the error marker and a `RecursionLimitExceeded` diagnostic is
//! recorded. Once a limit has been hit the evaluator stays poisoned and
//! answers `ERROR` for everything, so partial results never leak into a cache.
//!
//! A reference that re-enters an expansion already in progress is only a
//! recursive reference when a structural constructor (a mapped template, a
//! relation between members, an `infer` match) lies between the two. Without
//! one, as in `type Loop<T> = Loop<T>`, the expansion can never make progress
//! and is reported like any other recursion overflow.

use crate::caches::resolution_cache::{CachedResolution, Claim, ResolutionCache, ResolutionKey};
use crate::db::TypeDatabase;
use crate::def::{DefId, NoopResolver, TypeResolver};
use crate::diagnostics::SolverDiagnostic;
use crate::instantiate::{TypeInstantiator, TypeSubstitution};
use crate::options::SolverOptions;
use crate::recursion::{RecursionGuard, RecursionResult};
use crate::subtype::SubtypeChecker;
use crate::types::*;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Stack space kept free before `stacker` switches to a new segment.
pub(crate) const STACK_RED_ZONE: usize = 64 * 1024;
pub(crate) const STACK_GROW_SIZE: usize = 2 * 1024 * 1024;

static NEXT_EVALUATOR_ID: AtomicU64 = AtomicU64::new(1);

/// Type evaluator for meta-types.
///
/// Uses `&mut self` methods instead of interior mutability, so one evaluator
/// belongs to one thread; sharing happens through the attached
/// [`ResolutionCache`].
pub struct TypeEvaluator<'a, R: TypeResolver = NoopResolver> {
    interner: &'a dyn TypeDatabase,
    resolver: &'a R,
    options: SolverOptions,
    resolution_cache: Option<&'a ResolutionCache>,
    /// Identity used for in-flight claims in the shared cache.
    owner: u64,
    cache: FxHashMap<TypeId, TypeId>,
    guard: RecursionGuard<TypeId>,
    app_guard: RecursionGuard<ResolutionKey>,
    /// Structural nesting at which each active type / application was entered.
    entered_at: FxHashMap<TypeId, u32>,
    app_entered_at: FxHashMap<TypeId, u32>,
    structural_depth: u32,
    app_cache: FxHashMap<TypeId, CachedResolution>,
    relation_cache: FxHashMap<(TypeId, TypeId), SubtypeResult>,
    depth_exceeded: bool,
    /// Bumped on every limit overflow; results computed while it changed are
    /// not cached.
    overflow_count: u32,
    diagnostics: Vec<SolverDiagnostic>,
    recursion_reported: bool,
}

impl<'a> TypeEvaluator<'a, NoopResolver> {
    /// Create a new evaluator without a resolver.
    pub fn new(interner: &'a dyn TypeDatabase) -> TypeEvaluator<'a, NoopResolver> {
        static NOOP: NoopResolver = NoopResolver;
        TypeEvaluator::with_resolver(interner, &NOOP)
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    pub fn with_resolver(interner: &'a dyn TypeDatabase, resolver: &'a R) -> Self {
        let options = SolverOptions::default();
        TypeEvaluator {
            interner,
            resolver,
            options,
            resolution_cache: None,
            owner: NEXT_EVALUATOR_ID.fetch_add(1, Ordering::Relaxed),
            cache: FxHashMap::default(),
            guard: RecursionGuard::new(options.max_evaluation_depth, options.max_iterations),
            app_guard: RecursionGuard::new(options.max_instantiation_depth, options.max_iterations),
            entered_at: FxHashMap::default(),
            app_entered_at: FxHashMap::default(),
            structural_depth: 0,
            app_cache: FxHashMap::default(),
            relation_cache: FxHashMap::default(),
            depth_exceeded: false,
            overflow_count: 0,
            diagnostics: Vec::new(),
            recursion_reported: false,
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self.guard = RecursionGuard::new(options.max_evaluation_depth, options.max_iterations);
        self.app_guard =
            RecursionGuard::new(options.max_instantiation_depth, options.max_iterations);
        self
    }

    pub fn with_resolution_cache(mut self, cache: &'a ResolutionCache) -> Self {
        self.resolution_cache = Some(cache);
        self
    }

    // =========================================================================
    // Accessor methods for evaluate_rules and subtype_rules modules
    // =========================================================================

    #[inline]
    pub(crate) fn interner(&self) -> &'a dyn TypeDatabase {
        self.interner
    }

    #[inline]
    pub(crate) fn resolver(&self) -> &'a R {
        self.resolver
    }

    #[inline]
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Whether a recursion or size limit was hit by this evaluator.
    #[inline]
    pub fn is_depth_exceeded(&self) -> bool {
        self.depth_exceeded
    }

    pub fn diagnostics(&self) -> &[SolverDiagnostic] {
        &self.diagnostics
    }

    /// Drain the diagnostics, dropping repeats left by replayed cache hits.
    pub fn take_diagnostics(&mut self) -> Vec<SolverDiagnostic> {
        let mut unique: Vec<SolverDiagnostic> = Vec::with_capacity(self.diagnostics.len());
        for diagnostic in self.diagnostics.drain(..) {
            if !unique.contains(&diagnostic) {
                unique.push(diagnostic);
            }
        }
        unique
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: SolverDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    #[inline]
    pub(crate) fn overflow_count(&self) -> u32 {
        self.overflow_count
    }

    /// Poison the evaluator after a limit was exceeded while reducing
    /// `type_id`.
    pub(crate) fn record_overflow(&mut self, type_id: TypeId) {
        self.overflow_count += 1;
        self.depth_exceeded = true;
        debug!(
            type_id = type_id.0,
            depth = self.guard.depth(),
            alias_depth = self.app_guard.depth(),
            "evaluate: recursion limit exceeded"
        );
        if !self.recursion_reported {
            self.recursion_reported = true;
            self.diagnostics.push(SolverDiagnostic::recursion_limit());
        }
    }

    /// Substitute `substitution` into `type_id`.
    pub(crate) fn instantiate(&mut self, type_id: TypeId, substitution: &TypeSubstitution) -> TypeId {
        if substitution.is_empty() {
            return type_id;
        }
        let mut instantiator = TypeInstantiator::new(self.interner, substitution);
        let result = instantiator.instantiate(type_id);
        if instantiator.depth_exceeded() {
            self.record_overflow(type_id);
        }
        result
    }

    /// Instantiate every type parameter not bound in `substitution` with
    /// `any` (the permissive instantiation of a check).
    pub(crate) fn instantiate_permissive(&mut self, type_id: TypeId) -> TypeId {
        let empty = TypeSubstitution::new();
        let mut instantiator =
            TypeInstantiator::new(self.interner, &empty).with_unbound_replacement(TypeId::ANY);
        let result = instantiator.instantiate(type_id);
        if instantiator.depth_exceeded() {
            self.record_overflow(type_id);
        }
        result
    }

    /// Assignability as seen from inside evaluation. Results are memoized for
    /// the lifetime of the evaluator.
    pub(crate) fn check_subtype(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        if let Some(&cached) = self.relation_cache.get(&(source, target)) {
            return cached;
        }
        let overflow_before = self.overflow_count;
        let (result, exceeded) = self.behind_structure(|evaluator| {
            let mut checker = SubtypeChecker::new(evaluator);
            let result = checker.check_subtype(source, target);
            (result, checker.is_exceeded())
        });
        if !exceeded && self.overflow_count == overflow_before {
            self.relation_cache.insert((source, target), result);
        }
        result
    }

    /// Run `f` one structural level deeper. Re-entering an active expansion
    /// from inside `f` is a recursive reference, not a cycle error.
    pub(crate) fn behind_structure<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.structural_depth += 1;
        let result = f(self);
        self.structural_depth -= 1;
        result
    }

    /// Whether an active entry made at structural depth `entered` was reached
    /// again without crossing a structural constructor.
    fn is_direct_cycle(&self, entered: Option<&u32>) -> bool {
        entered.is_none_or(|&depth| self.structural_depth <= depth)
    }

    /// Evaluate a type, resolving any meta-types if possible.
    /// Returns the evaluated type (may be the same if no evaluation needed).
    pub fn evaluate(&mut self, type_id: TypeId) -> TypeId {
        // Fast path for intrinsics
        if type_id.is_intrinsic() {
            return type_id;
        }
        if self.depth_exceeded {
            return TypeId::ERROR;
        }
        if let Some(&cached) = self.cache.get(&type_id) {
            return cached;
        }
        let Some(key) = self.interner.lookup(type_id) else {
            return type_id;
        };
        if !needs_evaluation(&key) {
            return type_id;
        }

        match self.guard.enter(type_id) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                // Self-referential mapped types evaluate to empty objects.
                if matches!(key, TypeData::Mapped(_)) {
                    return self.interner.object(Vec::new());
                }
                if self.is_direct_cycle(self.entered_at.get(&type_id)) {
                    trace!(type_id = type_id.0, "evaluate: reference to itself");
                    self.record_overflow(type_id);
                    return TypeId::ERROR;
                }
                return type_id;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                self.record_overflow(type_id);
                return TypeId::ERROR;
            }
        }

        self.entered_at.insert(type_id, self.structural_depth);
        let overflow_before = self.overflow_count;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.visit_type_data(type_id, &key)
        });
        self.entered_at.remove(&type_id);
        self.guard.leave(type_id);

        if self.overflow_count == overflow_before {
            self.cache.insert(type_id, result);
        }
        trace!(type_id = type_id.0, result = result.0, "evaluate");
        result
    }

    fn visit_type_data(&mut self, type_id: TypeId, key: &TypeData) -> TypeId {
        match key {
            TypeData::Conditional(cond_id) => {
                let cond = self.interner.conditional_type(*cond_id);
                self.resolve_conditional(&cond, &TypeSubstitution::new())
            }
            TypeData::IndexAccess(object, index) => self.evaluate_index_access(*object, *index),
            TypeData::KeyOf(operand) => self.evaluate_keyof(*operand),
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(*mapped_id);
                self.evaluate_mapped(&mapped)
            }
            TypeData::Lazy(def_id) => self.visit_lazy(*def_id, type_id),
            TypeData::Application(app_id) => self.evaluate_application(type_id, *app_id),
            TypeData::Union(list_id) => {
                let members = self.interner.type_list(*list_id);
                let evaluated = self.evaluate_members(&members);
                if evaluated.as_slice() == &*members {
                    type_id
                } else {
                    self.interner.union(evaluated)
                }
            }
            TypeData::Intersection(list_id) => {
                let members = self.interner.type_list(*list_id);
                let evaluated = self.evaluate_members(&members);
                if evaluated.as_slice() == &*members {
                    type_id
                } else {
                    self.interner.intersection(evaluated)
                }
            }
            _ => type_id,
        }
    }

    fn evaluate_members(&mut self, members: &[TypeId]) -> Vec<TypeId> {
        let mut evaluated = Vec::with_capacity(members.len());
        for &member in members {
            evaluated.push(self.evaluate(member));
        }
        evaluated
    }

    /// A non-generic alias or interface reference evaluates to its body. A
    /// generic one used without arguments stays a reference.
    fn visit_lazy(&mut self, def_id: DefId, original: TypeId) -> TypeId {
        if self
            .resolver
            .get_lazy_type_params(def_id)
            .is_some_and(|params| !params.is_empty())
        {
            return original;
        }
        match self.resolver.resolve_lazy(def_id, self.interner) {
            Some(body) => self.evaluate(body),
            None => original,
        }
    }

    /// Evaluate a generic type application: `Alias<Args>`
    ///
    /// 1. Evaluate the arguments; the interned application of the alias to the
    ///    evaluated arguments is the memoization key
    /// 2. A key already being expanded is a recursive reference and is
    ///    returned unexpanded
    /// 3. Otherwise bind the declared parameters and resolve the body
    fn evaluate_application(&mut self, type_id: TypeId, app_id: TypeApplicationId) -> TypeId {
        let app = self.interner.type_application(app_id);
        let Some(TypeData::Lazy(def_id)) = self.interner.lookup(app.base) else {
            let args = self.evaluate_members(&app.args);
            if args == app.args {
                return type_id;
            }
            return self.interner.application(app.base, args);
        };
        let Some(params) = self.resolver.get_lazy_type_params(def_id) else {
            return type_id;
        };
        let Some(body) = self.resolver.resolve_lazy(def_id, self.interner) else {
            return type_id;
        };

        let args = self.evaluate_members(&app.args);
        if self.depth_exceeded {
            return TypeId::ERROR;
        }
        let key_app = if args == app.args {
            type_id
        } else {
            self.interner.application(app.base, args.clone())
        };
        if let Some(cached) = self.app_cache.get(&key_app).cloned() {
            return self.replay(cached);
        }

        let key = ResolutionKey {
            def_id,
            application: key_app,
        };
        match self.app_guard.enter(key) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                if self.is_direct_cycle(self.app_entered_at.get(&key_app)) {
                    trace!(def_id = def_id.0, "evaluate_application: expands to itself");
                    self.record_overflow(key_app);
                    return TypeId::ERROR;
                }
                trace!(def_id = def_id.0, "evaluate_application: recursive reference");
                return key_app;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                self.record_overflow(key_app);
                return TypeId::ERROR;
            }
        }

        trace!(
            def_id = def_id.0,
            args = args.len(),
            depth = self.app_guard.depth(),
            "evaluate_application: expanding"
        );
        self.app_entered_at.insert(key_app, self.structural_depth);
        let overflow_before = self.overflow_count;
        let diagnostics_before = self.diagnostics.len();
        let shared = self.resolution_cache;
        let result = match shared.map(|cache| cache.claim(key, self.owner)) {
            Some(Claim::Hit(cached)) => self.replay(cached),
            Some(Claim::Owned(claim)) => {
                let result = self.expand_alias(&params, body, &args);
                if self.overflow_count == overflow_before {
                    claim.publish(result, self.diagnostics_since(diagnostics_before));
                }
                result
            }
            Some(Claim::Contended) | None => self.expand_alias(&params, body, &args),
        };
        self.app_entered_at.remove(&key_app);
        self.app_guard.leave(key);

        if self.overflow_count == overflow_before {
            let cached = CachedResolution::new(result, self.diagnostics_since(diagnostics_before));
            self.app_cache.insert(key_app, cached);
        }
        result
    }

    fn diagnostics_since(&self, start: usize) -> &[SolverDiagnostic] {
        self.diagnostics.get(start..).unwrap_or_default()
    }

    /// Report a cached expansion's diagnostics again and return its type.
    fn replay(&mut self, cached: CachedResolution) -> TypeId {
        if !cached.diagnostics.is_empty() {
            trace!(
                type_id = cached.type_id.0,
                diagnostics = cached.diagnostics.len(),
                "evaluate_application: replaying cached diagnostics"
            );
            self.diagnostics.extend(cached.diagnostics.iter().cloned());
        }
        cached.type_id
    }

    fn expand_alias(&mut self, params: &[TypeParamInfo], body: TypeId, args: &[TypeId]) -> TypeId {
        let substitution = TypeSubstitution::from_args(self.interner, params, args);
        if let Some(TypeData::Conditional(cond_id)) = self.interner.lookup(body) {
            let cond = self.interner.conditional_type(cond_id);
            return self.resolve_conditional(&cond, &substitution);
        }
        let instantiated = self.instantiate(body, &substitution);
        self.evaluate(instantiated)
    }
}

/// Whether evaluation can change a type with this top-level shape. Objects,
/// tuples, arrays and functions are structural leaves: their members are
/// reduced lazily, when a relation or access needs them.
fn needs_evaluation(key: &TypeData) -> bool {
    matches!(
        key,
        TypeData::Conditional(_)
            | TypeData::IndexAccess(..)
            | TypeData::KeyOf(_)
            | TypeData::Mapped(_)
            | TypeData::Lazy(_)
            | TypeData::Application(_)
            | TypeData::Union(_)
            | TypeData::Intersection(_)
    )
}

/// Convenience function for full type evaluation
pub fn evaluate_type(interner: &dyn TypeDatabase, type_id: TypeId) -> TypeId {
    let mut evaluator = TypeEvaluator::new(interner);
    evaluator.evaluate(type_id)
}

/// Convenience function for resolving a conditional type under bindings
pub fn resolve_conditional(
    interner: &dyn TypeDatabase,
    cond: &ConditionalType,
    env: &TypeSubstitution,
) -> TypeId {
    let mut evaluator = TypeEvaluator::new(interner);
    evaluator.resolve_conditional(cond, env)
}

#[cfg(test)]
#[path = "../tests/evaluate_tests.rs"]
mod tests;
