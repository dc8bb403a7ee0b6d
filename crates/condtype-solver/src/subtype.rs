//! Assignability checking.
//!
//! `SubtypeChecker` decides `source <: target` structurally, evaluating
//! meta-types on demand through the `TypeEvaluator` it borrows. Rules live in
//! `subtype_rules/`; this module holds the entry points, the fast paths for
//! intrinsics and the recursion guard.
//!
//! Results are three-valued. `SubtypeResult::Unknown` is returned when the
//! check failed but cannot be called definitive: a limit was hit, or either
//! side is still generic. Callers treat `Unknown` as "not assignable".
//!
//! Failures are explained lazily: the fast check runs with `FastTracer`, and
//! only a caller asking for the reason reruns it with `DiagnosticTracer`.

use crate::db::TypeDatabase;
use crate::def::{NoopResolver, TypeResolver};
use crate::diagnostics::{DiagnosticTracer, FastTracer, SubtypeFailureReason, SubtypeTracer};
use crate::evaluate::{STACK_GROW_SIZE, STACK_RED_ZONE, TypeEvaluator};
use crate::recursion::{RecursionGuard, RecursionResult};
use crate::types::*;
use crate::visitor::contains_type_parameters;
use tracing::trace;

pub struct SubtypeChecker<'e, 'a, R: TypeResolver = NoopResolver> {
    pub(crate) evaluator: &'e mut TypeEvaluator<'a, R>,
    guard: RecursionGuard<(TypeId, TypeId)>,
    pub(crate) strict_function_types: bool,
}

impl<'e, 'a, R: TypeResolver> SubtypeChecker<'e, 'a, R> {
    pub fn new(evaluator: &'e mut TypeEvaluator<'a, R>) -> Self {
        let options = *evaluator.options();
        SubtypeChecker {
            evaluator,
            guard: RecursionGuard::new(options.max_subtype_depth, options.max_iterations),
            strict_function_types: options.strict_function_types,
        }
    }

    #[inline]
    pub(crate) fn interner(&self) -> &'a dyn TypeDatabase {
        self.evaluator.interner()
    }

    /// Whether the checker gave up on some pair because of its limits.
    pub fn is_exceeded(&self) -> bool {
        self.guard.is_exceeded()
    }

    pub fn check_subtype(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        if self.is_subtype(source, target, &mut FastTracer) {
            return SubtypeResult::True;
        }
        let interner = self.interner();
        if self.is_exceeded()
            || self.evaluator.is_depth_exceeded()
            || contains_type_parameters(interner, source)
            || contains_type_parameters(interner, target)
        {
            SubtypeResult::Unknown
        } else {
            SubtypeResult::False
        }
    }

    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        self.check_subtype(source, target).is_true()
    }

    /// The first mismatch found relating `source` to `target`, or `None` when
    /// they are related.
    pub fn explain_failure(&mut self, source: TypeId, target: TypeId) -> Option<SubtypeFailureReason> {
        let mut tracer = DiagnosticTracer::new();
        if self.is_subtype(source, target, &mut tracer) {
            return None;
        }
        Some(
            tracer
                .take_failure()
                .unwrap_or(SubtypeFailureReason::TypeMismatch {
                    source_type: source,
                    target_type: target,
                }),
        )
    }

    pub(crate) fn is_subtype<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        target: TypeId,
        tracer: &mut T,
    ) -> bool {
        if source == target {
            return true;
        }
        if let Some(result) = self.check_intrinsic_pair(source, target) {
            if !result {
                return tracer.on_mismatch(|| {
                    if source.is_error() || target.is_error() {
                        SubtypeFailureReason::ErrorType {
                            source_type: source,
                            target_type: target,
                        }
                    } else {
                        SubtypeFailureReason::TypeMismatch {
                            source_type: source,
                            target_type: target,
                        }
                    }
                });
            }
            return true;
        }

        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {}
            // Assume related while the pair is already being checked.
            RecursionResult::Cycle => return true,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                trace!(source = source.0, target = target.0, "subtype: limit exceeded");
                return tracer.on_mismatch(|| SubtypeFailureReason::RecursionLimitExceeded);
            }
        }
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.is_subtype_inner(source, target, tracer)
        });
        self.guard.leave((source, target));
        result
    }

    fn is_subtype_inner<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        target: TypeId,
        tracer: &mut T,
    ) -> bool {
        let interner = self.interner();

        if let Some(result) = self.check_alias_applications(source, target, tracer) {
            return result;
        }

        let evaluated_source = self.evaluator.evaluate(source);
        let evaluated_target = self.evaluator.evaluate(target);
        if evaluated_source != source || evaluated_target != target {
            return self.is_subtype(evaluated_source, evaluated_target, tracer);
        }

        let source_key = interner.lookup(source);
        let target_key = interner.lookup(target);

        if let Some(TypeData::Union(list_id)) = &source_key {
            return self.check_union_source(*list_id, target, tracer);
        }
        if source == TypeId::BOOLEAN
            && let Some(TypeData::Union(_)) = &target_key
        {
            return self.is_subtype(TypeId::BOOLEAN_TRUE, target, tracer)
                && self.is_subtype(TypeId::BOOLEAN_FALSE, target, tracer);
        }
        if let Some(TypeData::Union(list_id)) = &target_key {
            if self.check_generic_source_to_union(source, source_key.as_ref(), target) {
                return true;
            }
            return self.check_union_target(source, *list_id, tracer);
        }
        if let Some(TypeData::Intersection(list_id)) = &target_key {
            return self.check_intersection_target(source, *list_id, tracer);
        }
        if let Some(TypeData::Intersection(list_id)) = &source_key {
            return self.check_intersection_source(source, *list_id, target, tracer);
        }

        if let Some(TypeData::TypeParameter(info) | TypeData::Infer(info)) = &source_key {
            return self.check_type_param_source(info, target, tracer);
        }
        if let Some(TypeData::Conditional(cond_id)) = &source_key
            && self.check_conditional_source(source, *cond_id, target)
        {
            return true;
        }
        if let Some(TypeData::Conditional(cond_id)) = &target_key {
            return self.check_conditional_target(source, target, *cond_id, tracer);
        }
        if let Some(TypeData::TypeParameter(_) | TypeData::Infer(_)) = &target_key {
            return tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch {
                source_type: source,
                target_type: target,
            });
        }

        self.check_structural(source, source_key.as_ref(), target, target_key.as_ref(), tracer)
    }
}

/// Convenience function for a one-off check without definitions.
pub fn is_subtype_of(interner: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    let mut evaluator = TypeEvaluator::new(interner);
    SubtypeChecker::new(&mut evaluator).is_assignable(source, target)
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
