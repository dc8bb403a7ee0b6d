//! Conditional type resolution.
//!
//! Handles TypeScript's conditional types: `T extends U ? X : Y`
//! Including distributive conditional types over unions and `infer`
//! captures in the extends type.
//!
//! Resolution of one (non-distributed) check proceeds as:
//! 1. evaluate the check and extends types under the bindings
//! 2. defer when the check (or, for `[T] extends [U]`, its elements) is
//!    still generic
//! 3. infer `infer X` captures by matching the check against the extends
//!    pattern
//! 4. definitely false: the permissive instantiation (every free parameter
//!    read as `any`) is not assignable, so the false branch is taken
//! 5. definitely true: the restrictive instantiation (free parameters are
//!    opaque) is assignable, so the true branch is taken with the captures
//!    in scope
//! 6. otherwise the conditional stays deferred

use crate::evaluate::TypeEvaluator;
use crate::def::TypeResolver;
use crate::diagnostics::SolverDiagnostic;
use crate::evaluate_rules::infer_pattern::{InferenceContext, InferencePolarity};
use crate::evaluate_rules::union_members;
use crate::instantiate::TypeSubstitution;
use crate::types::*;
use crate::visitor::{
    collect_infer_params, contains_type_parameters, is_deferred_type, test_type,
};
use condtype_common::interner::Atom;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, trace};

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Resolve `cond` with the type parameters in `env` bound.
    ///
    /// A distributive conditional whose check type evaluates to a union is
    /// resolved once per member and the results are unioned; `never`
    /// distributes to `never`. Anything that cannot be decided yet comes back
    /// as a deferred conditional with the known bindings substituted.
    pub fn resolve_conditional(&mut self, cond: &ConditionalType, env: &TypeSubstitution) -> TypeId {
        if self.is_depth_exceeded() {
            return TypeId::ERROR;
        }
        let interner = self.interner();
        let check_param = match interner.lookup(cond.check_type) {
            Some(TypeData::TypeParameter(info)) => Some(info.name),
            _ => None,
        };
        let check_instantiated = self.instantiate(cond.check_type, env);
        let check = self.evaluate(check_instantiated);
        if check.is_error() {
            return TypeId::ERROR;
        }

        if cond.is_distributive {
            if check == TypeId::NEVER {
                return TypeId::NEVER;
            }
            if let Some(members) = self.distribution_members(check) {
                if members.len() > self.options().max_distribution_size {
                    debug!(
                        members = members.len(),
                        limit = self.options().max_distribution_size,
                        "resolve_conditional: distribution too large"
                    );
                    self.record_overflow(check);
                    return TypeId::ERROR;
                }
                trace!(members = members.len(), "resolve_conditional: distributing");
                let mut results = Vec::with_capacity(members.len());
                for member in members {
                    let result = match check_param {
                        Some(name) => {
                            let member_env = env.extended(name, member);
                            self.resolve_for_check(cond, &member_env, member)
                        }
                        None => {
                            let narrowed = self.narrow_check(cond, env, check_instantiated, member);
                            self.resolve_for_check(&narrowed, &TypeSubstitution::new(), member)
                        }
                    };
                    if result.is_error() {
                        return TypeId::ERROR;
                    }
                    results.push(result);
                }
                return interner.union(results);
            }
        }

        self.resolve_for_check(cond, env, check)
    }

    /// Union members with `boolean` split into its two literals.
    fn distribution_members(&self, check: TypeId) -> Option<Vec<TypeId>> {
        let members = union_members(self.interner(), check)?;
        let mut flat = Vec::with_capacity(members.len() + 1);
        for member in members {
            if member == TypeId::BOOLEAN {
                flat.extend([TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE]);
            } else {
                flat.push(member);
            }
        }
        Some(flat)
    }

    /// A conditional whose check is no longer a naked parameter (it was
    /// substituted by a type that only reduced to a union later) distributes
    /// by replacing the substituted check inside the branches.
    fn narrow_check(
        &mut self,
        cond: &ConditionalType,
        env: &TypeSubstitution,
        check_instantiated: TypeId,
        member: TypeId,
    ) -> ConditionalType {
        let infer_names = self.infer_names(cond.extends_type);
        let shadowed = env.without(&infer_names);
        let extends_type = self.instantiate(cond.extends_type, &shadowed);
        let true_type = self.instantiate(cond.true_type, &shadowed);
        let false_type = self.instantiate(cond.false_type, env);
        ConditionalType {
            check_type: member,
            extends_type,
            true_type: self.replace_type(true_type, check_instantiated, member),
            false_type: self.replace_type(false_type, check_instantiated, member),
            is_distributive: false,
        }
    }

    fn infer_names(&self, extends_type: TypeId) -> SmallVec<[Atom; 4]> {
        collect_infer_params(self.interner(), extends_type)
            .into_iter()
            .map(|info| info.name)
            .collect()
    }

    /// Resolve one check type that has already been evaluated.
    fn resolve_for_check(
        &mut self,
        cond: &ConditionalType,
        env: &TypeSubstitution,
        check: TypeId,
    ) -> TypeId {
        let interner = self.interner();
        let infer_params = collect_infer_params(interner, cond.extends_type);
        let infer_names: SmallVec<[Atom; 4]> = infer_params.iter().map(|info| info.name).collect();
        let extends_env = env.without(&infer_names);
        let extends_instantiated = self.instantiate(cond.extends_type, &extends_env);
        let extends = self.evaluate(extends_instantiated);
        if check.is_error() || extends.is_error() {
            return TypeId::ERROR;
        }

        let check_tuples = self.is_simple_tuple_pair(check, extends);
        if self.is_deferred_operand(check, check_tuples) {
            trace!(check = check.0, "resolve_conditional: deferred on generic check");
            return self.defer_conditional(cond, env, &extends_env, check, extends);
        }

        let mut bindings = TypeSubstitution::new();
        let mut uninferred: SmallVec<[(Atom, TypeId); 2]> = SmallVec::new();
        let mut inferred_extends = extends;
        if !infer_params.is_empty() {
            let mut ctx = InferenceContext::new(&infer_params);
            self.behind_structure(|evaluator| {
                evaluator.infer_from_types(&mut ctx, check, extends, InferencePolarity::Covariant)
            });
            let resolved = self.resolve_inferences(&ctx, extends);
            bindings = resolved.bindings;
            uninferred = resolved.uninferred;
            let instantiated = self.instantiate(extends, &bindings);
            inferred_extends = self.evaluate(instantiated);
            if inferred_extends.is_error() {
                return TypeId::ERROR;
            }
        }
        if self.is_deferred_operand(inferred_extends, check_tuples) {
            trace!(extends = inferred_extends.0, "resolve_conditional: deferred on generic extends");
            return self.defer_conditional(cond, env, &extends_env, check, extends);
        }

        // Definitely false. An `any` check takes both branches.
        if !inferred_extends.is_any_or_unknown()
            && (check.is_any() || !self.is_permissively_assignable(check, inferred_extends))
        {
            let false_result = self.resolve_branch(cond.false_type, env);
            if check.is_any() {
                let true_result = self.resolve_true_branch(cond, env, &bindings, &uninferred);
                return interner.union2(true_result, false_result);
            }
            return false_result;
        }

        // Definitely true.
        if inferred_extends.is_any_or_unknown()
            || self.is_restrictively_assignable(check, inferred_extends)
        {
            return self.resolve_true_branch(cond, env, &bindings, &uninferred);
        }

        self.defer_conditional(cond, env, &extends_env, check, extends)
    }

    fn resolve_true_branch(
        &mut self,
        cond: &ConditionalType,
        env: &TypeSubstitution,
        bindings: &TypeSubstitution,
        uninferred: &[(Atom, TypeId)],
    ) -> TypeId {
        for &(name, resolved) in uninferred {
            self.push_diagnostic(SolverDiagnostic::unresolved_inference(name, resolved));
        }
        let branch_env = env.extend_with(bindings);
        self.resolve_branch(cond.true_type, &branch_env)
    }

    fn resolve_branch(&mut self, branch: TypeId, env: &TypeSubstitution) -> TypeId {
        let instantiated = self.instantiate(branch, env);
        self.evaluate(instantiated)
    }

    /// The conditional with everything known substituted. `infer` captures
    /// stay declared in the extends type and in scope in the true branch.
    fn defer_conditional(
        &mut self,
        cond: &ConditionalType,
        env: &TypeSubstitution,
        extends_env: &TypeSubstitution,
        check: TypeId,
        extends: TypeId,
    ) -> TypeId {
        let true_type = self.instantiate(cond.true_type, extends_env);
        let false_type = self.instantiate(cond.false_type, env);
        self.interner().conditional(ConditionalType {
            check_type: check,
            extends_type: extends,
            true_type,
            false_type,
            is_distributive: cond.is_distributive,
        })
    }

    /// `[A] extends [B]` with single, plain elements on both sides is decided
    /// on the elements: the wrapping tuple is not itself generic.
    fn is_simple_tuple_pair(&self, check: TypeId, extends: TypeId) -> bool {
        match (
            self.simple_tuple_len(check),
            self.simple_tuple_len(extends),
        ) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }

    fn simple_tuple_len(&self, type_id: TypeId) -> Option<usize> {
        let interner = self.interner();
        let Some(TypeData::Tuple(list_id)) = interner.lookup(type_id) else {
            return None;
        };
        let elements = interner.tuple_list(list_id);
        elements
            .iter()
            .all(|element| !element.optional && !element.rest)
            .then_some(elements.len())
    }

    fn is_deferred_operand(&self, type_id: TypeId, check_tuples: bool) -> bool {
        let interner = self.interner();
        if check_tuples && let Some(TypeData::Tuple(list_id)) = interner.lookup(type_id) {
            return interner
                .tuple_list(list_id)
                .iter()
                .any(|element| is_deferred_type(interner, element.type_id));
        }
        is_deferred_type(interner, type_id)
    }

    /// Assignability with every free type parameter read as `any`. False
    /// means no instantiation can make the check succeed.
    fn is_permissively_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        let interner = self.interner();
        if !contains_type_parameters(interner, source) && !contains_type_parameters(interner, target)
        {
            return self.check_subtype(source, target).is_true();
        }
        let source = self.instantiate_permissive(source);
        let target = self.instantiate_permissive(target);
        self.check_subtype(source, target).is_true()
    }

    /// Assignability with every free type parameter opaque: its constraint is
    /// not consulted, only its identity. True means every instantiation
    /// succeeds.
    fn is_restrictively_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        let interner = self.interner();
        if !contains_type_parameters(interner, source) && !contains_type_parameters(interner, target)
        {
            return self.check_subtype(source, target).is_true();
        }
        let mut restrictive = TypeSubstitution::new();
        for root in [source, target] {
            let mut seen: FxHashSet<Atom> = FxHashSet::default();
            test_type(interner, root, |key| {
                if let TypeData::TypeParameter(info) = key
                    && info.constraint.is_some()
                    && seen.insert(info.name)
                {
                    let opaque = interner.type_param(TypeParamInfo::unconstrained(info.name));
                    restrictive.insert(info.name, opaque);
                }
                false
            });
        }
        let source = self.instantiate(source, &restrictive);
        let target = self.instantiate(target, &restrictive);
        self.check_subtype(source, target).is_true()
    }
}
