//! Type database abstraction and the query facade.
//!
//! `TypeDatabase` isolates solver logic from concrete storage: every rule
//! module talks to `&dyn TypeDatabase`, never to `TypeInterner` directly.
//!
//! `QueryCache` is what a host checker holds. It bundles the interner, the
//! definition store and the shared caches, and exposes the three public
//! operations (`substitute`, `resolve_conditional`, `is_assignable`) plus
//! evaluation and diagnostic helpers. It is `Sync`: independent files can be
//! checked from several threads against one `QueryCache`.

use crate::caches::query_trace;
use crate::caches::resolution_cache::{ResolutionCache, ResolutionCacheStats};
use crate::def::{DefId, DefinitionStore};
use crate::diagnostics::SolverDiagnostic;
use crate::evaluate::TypeEvaluator;
use crate::format::TypeFormatter;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::options::SolverOptions;
use crate::subtype::SubtypeChecker;
use crate::types::*;
use condtype_common::diagnostics::Diagnostic;
use condtype_common::interner::Atom;
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Declares `TypeDatabase` and forwards every method to the inherent
/// `TypeInterner` method of the same name.
macro_rules! type_database {
    ($(fn $name:ident(&self $(, $arg:ident: $ty:ty)*) -> $ret:ty;)*) => {
        /// Storage-agnostic view of interned types. Rule modules take
        /// `&dyn TypeDatabase` so they never depend on `TypeInterner` itself.
        pub trait TypeDatabase {
            $(fn $name(&self $(, $arg: $ty)*) -> $ret;)*
        }

        impl TypeDatabase for TypeInterner {
            $(
                #[inline]
                fn $name(&self $(, $arg: $ty)*) -> $ret {
                    TypeInterner::$name(self $(, $arg)*)
                }
            )*
        }
    };
}

type_database! {
    fn intern(&self, key: TypeData) -> TypeId;
    fn lookup(&self, id: TypeId) -> Option<TypeData>;
    fn intern_string(&self, s: &str) -> Atom;
    fn resolve_atom(&self, atom: Atom) -> String;

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]>;
    fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape>;
    fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape>;
    fn conditional_type(&self, id: ConditionalTypeId) -> Arc<ConditionalType>;
    fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType>;
    fn type_application(&self, id: TypeApplicationId) -> Arc<TypeApplication>;

    fn literal_string(&self, value: &str) -> TypeId;
    fn literal_string_atom(&self, atom: Atom) -> TypeId;
    fn literal_number(&self, value: f64) -> TypeId;
    fn literal_boolean(&self, value: bool) -> TypeId;

    fn union(&self, members: Vec<TypeId>) -> TypeId;
    fn union2(&self, left: TypeId, right: TypeId) -> TypeId;
    fn union3(&self, first: TypeId, second: TypeId, third: TypeId) -> TypeId;
    fn intersection(&self, members: Vec<TypeId>) -> TypeId;
    fn intersection2(&self, left: TypeId, right: TypeId) -> TypeId;
    fn merge_object_shapes(&self, objects: &[Arc<ObjectShape>]) -> TypeId;

    fn array(&self, element: TypeId) -> TypeId;
    fn tuple(&self, elements: Vec<TupleElement>) -> TypeId;
    fn object(&self, properties: Vec<PropertyInfo>) -> TypeId;
    fn function(&self, shape: FunctionShape) -> TypeId;
    fn conditional(&self, conditional: ConditionalType) -> TypeId;
    fn declare_conditional(&self, check_type: TypeId, extends_type: TypeId, true_type: TypeId, false_type: TypeId) -> TypeId;
    fn mapped(&self, mapped: MappedType) -> TypeId;
    fn application(&self, base: TypeId, args: Vec<TypeId>) -> TypeId;
    fn type_param(&self, info: TypeParamInfo) -> TypeId;
    fn infer(&self, info: TypeParamInfo) -> TypeId;
    fn index_access(&self, object_type: TypeId, index_type: TypeId) -> TypeId;
    fn keyof(&self, operand: TypeId) -> TypeId;
    fn lazy(&self, def_id: DefId) -> TypeId;
}

/// A best-effort result together with the non-fatal failures met on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub type_id: TypeId,
    pub diagnostics: Vec<SolverDiagnostic>,
}

impl Resolution {
    pub fn is_error(&self) -> bool {
        self.type_id.is_error()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Query database wrapper with shared caching.
pub struct QueryCache<'a> {
    interner: &'a TypeInterner,
    defs: &'a DefinitionStore,
    options: SolverOptions,
    resolution_cache: ResolutionCache,
    eval_cache: RwLock<FxHashMap<TypeId, TypeId>>,
    subtype_cache: RwLock<FxHashMap<(TypeId, TypeId), SubtypeResult>>,
}

impl<'a> QueryCache<'a> {
    pub fn new(interner: &'a TypeInterner, defs: &'a DefinitionStore) -> Self {
        Self::with_options(interner, defs, SolverOptions::default())
    }

    pub fn with_options(
        interner: &'a TypeInterner,
        defs: &'a DefinitionStore,
        options: SolverOptions,
    ) -> Self {
        QueryCache {
            interner,
            defs,
            options,
            resolution_cache: ResolutionCache::new(),
            eval_cache: RwLock::new(FxHashMap::default()),
            subtype_cache: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    pub fn definitions(&self) -> &'a DefinitionStore {
        self.defs
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    fn evaluator(&self) -> TypeEvaluator<'_, DefinitionStore> {
        TypeEvaluator::with_resolver(self.interner, self.defs)
            .with_options(self.options)
            .with_resolution_cache(&self.resolution_cache)
    }

    pub fn clear(&self) {
        self.resolution_cache.clear();
        self.eval_cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.subtype_cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn cache_stats(&self) -> ResolutionCacheStats {
        self.resolution_cache.stats()
    }

    #[cfg(test)]
    pub(crate) fn subtype_cache_len(&self) -> usize {
        self.subtype_cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Replace every type parameter bound in `env`. Unbound parameters stay
    /// naked; nothing is evaluated.
    pub fn substitute(&self, type_id: TypeId, env: &TypeSubstitution) -> TypeId {
        instantiate_type(self.interner, type_id, env)
    }

    /// Resolve `check extends extends ? true : false` under `env`.
    pub fn resolve_conditional(&self, cond: &ConditionalType, env: &TypeSubstitution) -> Resolution {
        let trace_enabled = query_trace::enabled();
        let query_id = trace_enabled.then(query_trace::next_query_id);
        if let Some(query_id) = query_id {
            query_trace::unary_start(query_id, "resolve_conditional", cond.check_type);
        }

        let mut evaluator = self.evaluator();
        let type_id = evaluator.resolve_conditional(cond, env);
        let diagnostics = evaluator.take_diagnostics();

        if let Some(query_id) = query_id {
            query_trace::unary_end(
                query_id,
                "resolve_conditional",
                type_id,
                diagnostics.len(),
                false,
            );
        }
        Resolution {
            type_id,
            diagnostics,
        }
    }

    /// Evaluate a type, keeping the diagnostics of this evaluation.
    pub fn evaluate(&self, type_id: TypeId) -> Resolution {
        let query_id = query_trace::enabled().then(query_trace::next_query_id);
        if let Some(query_id) = query_id {
            query_trace::unary_start(query_id, "evaluate", type_id);
        }

        let mut evaluator = self.evaluator();
        let result = evaluator.evaluate(type_id);
        let diagnostics = evaluator.take_diagnostics();
        if !evaluator.is_depth_exceeded() {
            self.eval_cache
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .insert(type_id, result);
        }

        if let Some(query_id) = query_id {
            query_trace::unary_end(query_id, "evaluate", result, diagnostics.len(), false);
        }
        Resolution {
            type_id: result,
            diagnostics,
        }
    }

    /// Evaluate a type, answering from the evaluation cache when possible.
    pub fn evaluate_type(&self, type_id: TypeId) -> TypeId {
        if type_id.is_intrinsic() {
            return type_id;
        }
        let cached = self
            .eval_cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&type_id)
            .copied();
        if let Some(result) = cached {
            if query_trace::enabled() {
                let query_id = query_trace::next_query_id();
                query_trace::unary_start(query_id, "evaluate", type_id);
                query_trace::unary_end(query_id, "evaluate", result, 0, true);
            }
            return result;
        }
        self.evaluate(type_id).type_id
    }

    pub fn check_subtype(&self, source: TypeId, target: TypeId) -> SubtypeResult {
        let key = (source, target);
        let query_id = query_trace::enabled().then(query_trace::next_query_id);
        if let Some(query_id) = query_id {
            query_trace::relation_start(query_id, "check_subtype", source, target);
        }

        let cached = self
            .subtype_cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .copied();
        if let Some(result) = cached {
            if let Some(query_id) = query_id {
                query_trace::relation_end(query_id, "check_subtype", result, true);
            }
            return result;
        }

        let mut evaluator = self.evaluator();
        let mut checker = SubtypeChecker::new(&mut evaluator);
        let result = checker.check_subtype(source, target);
        let overflowed = checker.is_exceeded();
        drop(checker);
        if overflowed || evaluator.is_depth_exceeded() {
            debug!(
                source = source.0,
                target = target.0,
                "check_subtype: limit reached, result not cached"
            );
        } else {
            self.subtype_cache
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .insert(key, result);
        }

        if let Some(query_id) = query_id {
            query_trace::relation_end(query_id, "check_subtype", result, false);
        }
        result
    }

    pub fn is_assignable(&self, source: TypeId, target: TypeId) -> bool {
        self.check_subtype(source, target).is_true()
    }

    /// `None` when `source` is assignable to `target`, otherwise an
    /// `UnsoundAssignment` diagnostic explaining the first mismatch.
    pub fn check_assignment(&self, source: TypeId, target: TypeId) -> Option<SolverDiagnostic> {
        if self.is_assignable(source, target) {
            return None;
        }
        let mut evaluator = self.evaluator();
        let mut checker = SubtypeChecker::new(&mut evaluator);
        let reason = checker.explain_failure(source, target);
        debug!(
            source = source.0,
            target = target.0,
            ?reason,
            "check_assignment: unsound assignment"
        );
        Some(SolverDiagnostic::unsound_assignment(
            source,
            target,
            reason.as_ref(),
        ))
    }

    pub fn formatter(&self) -> TypeFormatter<'a> {
        TypeFormatter::new(self.interner).with_resolver(self.defs)
    }

    pub fn format_type(&self, type_id: TypeId) -> String {
        self.formatter().format(type_id)
    }

    pub fn render(&self, diagnostic: &SolverDiagnostic) -> Diagnostic {
        diagnostic.render(&mut self.formatter())
    }
}

#[cfg(test)]
#[path = "../tests/db_tests.rs"]
mod tests;
