//! Rules for generic shapes: alias applications, type parameters and
//! deferred conditional types.

use crate::def::TypeResolver;
use crate::diagnostics::{FastTracer, SubtypeFailureReason, SubtypeTracer};
use crate::evaluate_rules::constraint::conditional_constraint;
use crate::subtype::SubtypeChecker;
use crate::types::*;
use crate::variance::{Variance, definition_variance};
use crate::visitor::{contains_infer_types, test_type};
use tracing::trace;

impl<R: TypeResolver> SubtypeChecker<'_, '_, R> {
    /// Two applications of the same alias are related argument by argument
    /// according to the alias's parameter variance. Structure is not
    /// consulted, so an invariant parameter (one used as a conditional check
    /// or extends type) needs identical arguments even when the expanded
    /// bodies happen to be related.
    ///
    /// `None` when the pair is not two applications of one alias.
    pub(crate) fn check_alias_applications<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        target: TypeId,
        tracer: &mut T,
    ) -> Option<bool> {
        let interner = self.interner();
        let (Some(TypeData::Application(source_app)), Some(TypeData::Application(target_app))) =
            (interner.lookup(source), interner.lookup(target))
        else {
            return None;
        };
        let source_app = interner.type_application(source_app);
        let target_app = interner.type_application(target_app);
        if source_app.base != target_app.base || source_app.args.len() != target_app.args.len() {
            return None;
        }
        let Some(TypeData::Lazy(def_id)) = interner.lookup(source_app.base) else {
            return None;
        };
        let variances = definition_variance(interner, self.evaluator.resolver(), def_id)?;

        for (i, (&source_arg, &target_arg)) in
            source_app.args.iter().zip(target_app.args.iter()).enumerate()
        {
            let variance = variances.get(i).copied().unwrap_or(Variance::INVARIANT);
            if variance.is_independent() {
                continue;
            }
            let source_arg = self.evaluator.evaluate(source_arg);
            let target_arg = self.evaluator.evaluate(target_arg);
            let related = if variance.is_invariant() {
                source_arg == target_arg
            } else if variance.is_covariant() {
                self.is_subtype(source_arg, target_arg, &mut FastTracer)
            } else {
                self.is_subtype(target_arg, source_arg, &mut FastTracer)
            };
            if !related {
                trace!(
                    def_id = def_id.0,
                    param_index = i,
                    ?variance,
                    "subtype: alias argument mismatch"
                );
                return Some(tracer.on_mismatch(|| SubtypeFailureReason::AliasArgumentMismatch {
                    param_index: i,
                    source_arg,
                    target_arg,
                    variance,
                }));
            }
        }
        Some(true)
    }

    /// A type parameter is assignable to itself and to whatever its
    /// constraint is assignable to.
    pub(crate) fn check_type_param_source<T: SubtypeTracer>(
        &mut self,
        info: &TypeParamInfo,
        target: TypeId,
        tracer: &mut T,
    ) -> bool {
        let interner = self.interner();
        if let Some(TypeData::TypeParameter(target_info)) = interner.lookup(target)
            && target_info.name == info.name
        {
            return true;
        }
        match info.constraint {
            Some(constraint) => self.is_subtype(constraint, target, tracer),
            None => {
                let source = interner.type_param(info.clone());
                tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch {
                    source_type: source,
                    target_type: target,
                })
            }
        }
    }

    /// A type parameter or deferred conditional relates to a union target as a
    /// whole through its constraint, before the union is split into members:
    /// `T extends string | number` is assignable to `string | number` even
    /// though it is assignable to neither member alone.
    pub(crate) fn check_generic_source_to_union(
        &mut self,
        source: TypeId,
        source_key: Option<&TypeData>,
        target: TypeId,
    ) -> bool {
        match source_key {
            Some(TypeData::TypeParameter(info) | TypeData::Infer(info)) => info
                .constraint
                .is_some_and(|constraint| self.is_subtype(constraint, target, &mut FastTracer)),
            Some(TypeData::Conditional(cond_id)) => {
                self.check_conditional_source(source, *cond_id, target)
            }
            _ => false,
        }
    }

    /// A deferred conditional source relates to a conditional target with the
    /// same check and extends types and the same distributivity when the
    /// branches relate pairwise, and to anything its constraint relates to.
    /// Returns false when neither applies so that the target rules still run.
    pub(crate) fn check_conditional_source(
        &mut self,
        source: TypeId,
        cond_id: ConditionalTypeId,
        target: TypeId,
    ) -> bool {
        let interner = self.interner();
        let source_cond = interner.conditional_type(cond_id);

        if let Some(TypeData::Conditional(target_id)) = interner.lookup(target) {
            let target_cond = interner.conditional_type(target_id);
            if source_cond.is_distributive == target_cond.is_distributive
                && source_cond.extends_type == target_cond.extends_type
                && (self.is_subtype(source_cond.check_type, target_cond.check_type, &mut FastTracer)
                    || self.is_subtype(
                        target_cond.check_type,
                        source_cond.check_type,
                        &mut FastTracer,
                    ))
                && self.is_subtype(source_cond.true_type, target_cond.true_type, &mut FastTracer)
                && self.is_subtype(
                    source_cond.false_type,
                    target_cond.false_type,
                    &mut FastTracer,
                )
            {
                return true;
            }
        }

        let constraint = conditional_constraint(interner, &source_cond);
        if constraint == source || constraint.is_error() {
            return false;
        }
        trace!(constraint = constraint.0, "subtype: relating conditional through its constraint");
        self.is_subtype(constraint, target, &mut FastTracer)
    }

    /// A source is assignable to a deferred conditional target when it is
    /// assignable to both branches, provided the target declares no `infer`
    /// captures and its branches do not depend on how it distributes.
    pub(crate) fn check_conditional_target<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        target: TypeId,
        cond_id: ConditionalTypeId,
        tracer: &mut T,
    ) -> bool {
        let interner = self.interner();
        let cond = interner.conditional_type(cond_id);
        let mismatch = |tracer: &mut T| {
            tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch {
                source_type: source,
                target_type: target,
            })
        };
        if contains_infer_types(interner, cond.extends_type) || self.is_distribution_dependent(&cond)
        {
            return mismatch(tracer);
        }
        if self.is_subtype(source, cond.true_type, &mut FastTracer)
            && self.is_subtype(source, cond.false_type, &mut FastTracer)
        {
            return true;
        }
        mismatch(tracer)
    }

    /// Whether the branches of a distributive conditional mention its check
    /// parameter, so that distributing changes what they denote.
    fn is_distribution_dependent(&self, cond: &ConditionalType) -> bool {
        if !cond.is_distributive {
            return false;
        }
        let interner = self.interner();
        let Some(TypeData::TypeParameter(check)) = interner.lookup(cond.check_type) else {
            return false;
        };
        let mentions_check = |branch: TypeId| {
            test_type(interner, branch, |key| {
                matches!(key, TypeData::TypeParameter(info) if info.name == check.name)
            })
        };
        mentions_check(cond.true_type) || mentions_check(cond.false_type)
    }
}
