//! `infer` capture by structural matching.
//!
//! The check type is walked against the extends pattern in lockstep. Each
//! time the pattern reaches an `infer X` node the source at that position
//! becomes a candidate for `X`, tagged with the polarity of the position:
//! function parameters flip it. Candidates are combined afterwards:
//! covariant candidates union, contravariant-only candidates intersect.
//!
//! A variable the walk never reaches falls back to its constraint, else to
//! `unknown`, or to `never` when the variable only occurs contravariantly in
//! the pattern.

use crate::evaluate::TypeEvaluator;
use crate::def::TypeResolver;
use crate::instantiate::TypeSubstitution;
use crate::types::*;
use crate::variance::compute_variance;
use crate::visitor::contains_infer_types;
use condtype_common::interner::Atom;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InferencePolarity {
    Covariant,
    Contravariant,
}

impl InferencePolarity {
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            InferencePolarity::Covariant => InferencePolarity::Contravariant,
            InferencePolarity::Contravariant => InferencePolarity::Covariant,
        }
    }
}

#[derive(Clone, Debug)]
pub struct InferVar {
    pub info: TypeParamInfo,
    pub covariant: SmallVec<[TypeId; 2]>,
    pub contravariant: SmallVec<[TypeId; 2]>,
}

impl InferVar {
    fn has_candidates(&self) -> bool {
        !self.covariant.is_empty() || !self.contravariant.is_empty()
    }
}

/// Candidates collected for the `infer` variables of one extends pattern.
#[derive(Clone, Debug, Default)]
pub struct InferenceContext {
    vars: IndexMap<Atom, InferVar>,
    visited: FxHashSet<(TypeId, TypeId, InferencePolarity)>,
}

impl InferenceContext {
    pub fn new(params: &[TypeParamInfo]) -> Self {
        let vars = params
            .iter()
            .map(|info| {
                (
                    info.name,
                    InferVar {
                        info: info.clone(),
                        covariant: SmallVec::new(),
                        contravariant: SmallVec::new(),
                    },
                )
            })
            .collect();
        InferenceContext {
            vars,
            visited: FxHashSet::default(),
        }
    }

    /// Record a candidate. Names not declared in this pattern are ignored.
    pub fn add_candidate(&mut self, name: Atom, candidate: TypeId, polarity: InferencePolarity) {
        let Some(var) = self.vars.get_mut(&name) else {
            return;
        };
        let list = match polarity {
            InferencePolarity::Covariant => &mut var.covariant,
            InferencePolarity::Contravariant => &mut var.contravariant,
        };
        if !list.contains(&candidate) {
            list.push(candidate);
        }
    }

    pub fn var(&self, name: Atom) -> Option<&InferVar> {
        self.vars.get(&name)
    }

    pub fn vars(&self) -> impl Iterator<Item = &InferVar> {
        self.vars.values()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Bindings for every variable of a context, plus the variables that had no
/// candidate and the type they fell back to.
#[derive(Clone, Debug, Default)]
pub struct InferenceResult {
    pub bindings: TypeSubstitution,
    pub uninferred: SmallVec<[(Atom, TypeId); 2]>,
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Match `source` against the pattern `target`, collecting candidates for
    /// the `infer` variables `target` mentions.
    pub fn infer_from_types(
        &mut self,
        ctx: &mut InferenceContext,
        source: TypeId,
        target: TypeId,
        polarity: InferencePolarity,
    ) {
        let interner = self.interner();
        if source.is_error() || !contains_infer_types(interner, target) {
            return;
        }
        if !ctx.visited.insert((source, target, polarity)) {
            return;
        }
        let Some(target_key) = interner.lookup(target) else {
            return;
        };
        if let TypeData::Infer(info) = &target_key {
            trace!(name = info.name.0, candidate = source.0, ?polarity, "infer: candidate");
            ctx.add_candidate(info.name, source, polarity);
            return;
        }

        let source = self.evaluate(source);
        if source.is_error() {
            return;
        }
        let source_key = interner.lookup(source);

        // A union source matches member by member against a non-union pattern.
        if let Some(TypeData::Union(list_id)) = &source_key
            && !matches!(target_key, TypeData::Union(_))
        {
            for &member in interner.type_list(*list_id).iter() {
                self.infer_from_types(ctx, member, target, polarity);
            }
            return;
        }

        match target_key {
            TypeData::Union(list_id) | TypeData::Intersection(list_id) => {
                for &member in interner.type_list(list_id).iter() {
                    if contains_infer_types(interner, member) {
                        self.infer_from_types(ctx, source, member, polarity);
                    }
                }
            }
            TypeData::Tuple(target_list) => match source_key {
                Some(TypeData::Tuple(source_list)) => {
                    let sources = interner.tuple_list(source_list);
                    let targets = interner.tuple_list(target_list);
                    self.infer_tuple(ctx, &sources, &targets, polarity);
                }
                Some(TypeData::Array(element)) => {
                    for target_element in interner.tuple_list(target_list).iter() {
                        let source = if target_element.rest {
                            source
                        } else {
                            element
                        };
                        self.infer_from_types(ctx, source, target_element.type_id, polarity);
                    }
                }
                _ => {}
            },
            TypeData::Array(target_element) => match source_key {
                Some(TypeData::Array(element)) => {
                    self.infer_from_types(ctx, element, target_element, polarity);
                }
                Some(TypeData::Tuple(source_list)) => {
                    let elements: Vec<TypeId> = interner
                        .tuple_list(source_list)
                        .iter()
                        .map(|element| self.rest_element_type(element))
                        .collect();
                    let element = interner.union(elements);
                    self.infer_from_types(ctx, element, target_element, polarity);
                }
                _ => {}
            },
            TypeData::Object(target_shape) => {
                if let Some(TypeData::Object(source_shape)) = source_key {
                    let source_shape = interner.object_shape(source_shape);
                    let target_shape = interner.object_shape(target_shape);
                    for prop in &target_shape.properties {
                        if let Some(source_prop) = source_shape.property(prop.name) {
                            self.infer_from_types(ctx, source_prop.type_id, prop.type_id, polarity);
                        }
                    }
                }
            }
            TypeData::Function(target_shape) => {
                if let Some(TypeData::Function(source_shape)) = source_key {
                    let source_shape = interner.function_shape(source_shape);
                    let target_shape = interner.function_shape(target_shape);
                    self.infer_function(ctx, &source_shape, &target_shape, polarity);
                }
            }
            TypeData::Application(target_app) => {
                let target_app = interner.type_application(target_app);
                if let Some(TypeData::Application(source_app)) = source_key {
                    let source_app = interner.type_application(source_app);
                    if source_app.base == target_app.base
                        && source_app.args.len() == target_app.args.len()
                    {
                        for (&arg, &pattern) in source_app.args.iter().zip(target_app.args.iter()) {
                            self.infer_from_types(ctx, arg, pattern, polarity);
                        }
                        return;
                    }
                }
                let expanded = self.evaluate(target);
                if expanded != target && !expanded.is_error() {
                    self.infer_from_types(ctx, source, expanded, polarity);
                }
            }
            _ => {}
        }
    }

    fn rest_element_type(&self, element: &TupleElement) -> TypeId {
        if !element.rest {
            return element.type_id;
        }
        match self.interner().lookup(element.type_id) {
            Some(TypeData::Array(inner)) => inner,
            _ => element.type_id,
        }
    }

    fn infer_tuple(
        &mut self,
        ctx: &mut InferenceContext,
        sources: &[TupleElement],
        targets: &[TupleElement],
        polarity: InferencePolarity,
    ) {
        let Some(rest_index) = targets.iter().position(|element| element.rest) else {
            for (source, target) in sources.iter().zip(targets.iter()) {
                self.infer_from_types(ctx, source.type_id, target.type_id, polarity);
            }
            return;
        };

        // `[A, ...R, B]`: fixed elements match from both ends and the rest
        // captures a tuple of what is left in between.
        let trailing = targets.len() - rest_index - 1;
        if sources.len() < rest_index + trailing {
            return;
        }
        for (source, target) in sources.iter().zip(targets[..rest_index].iter()) {
            self.infer_from_types(ctx, source.type_id, target.type_id, polarity);
        }
        let middle_end = sources.len() - trailing;
        let middle: Vec<TupleElement> = sources[rest_index..middle_end].to_vec();
        let middle = self.interner().tuple(middle);
        self.infer_from_types(ctx, middle, targets[rest_index].type_id, polarity);
        for (source, target) in sources[middle_end..]
            .iter()
            .zip(targets[rest_index + 1..].iter())
        {
            self.infer_from_types(ctx, source.type_id, target.type_id, polarity);
        }
    }

    fn infer_function(
        &mut self,
        ctx: &mut InferenceContext,
        source: &FunctionShape,
        target: &FunctionShape,
        polarity: InferencePolarity,
    ) {
        let interner = self.interner();
        for (i, target_param) in target.params.iter().enumerate() {
            if target_param.rest {
                // `(...args: infer P) => R` captures the remaining parameters
                // as a tuple.
                let rest: Vec<TupleElement> = source
                    .params
                    .iter()
                    .skip(i)
                    .map(|param| TupleElement {
                        type_id: param.type_id,
                        name: param.name,
                        optional: param.optional,
                        rest: param.rest,
                    })
                    .collect();
                let rest = interner.tuple(rest);
                self.infer_from_types(ctx, rest, target_param.type_id, polarity.flip());
                break;
            }
            if let Some(source_param) = source.params.get(i) {
                self.infer_from_types(
                    ctx,
                    source_param.type_id,
                    target_param.type_id,
                    polarity.flip(),
                );
            }
        }
        self.infer_from_types(ctx, source.return_type, target.return_type, polarity);
    }

    /// Combine the candidates of every variable into bindings.
    ///
    /// A candidate that violates the variable's constraint is replaced by the
    /// constraint.
    pub fn resolve_inferences(
        &mut self,
        ctx: &InferenceContext,
        pattern: TypeId,
    ) -> InferenceResult {
        let interner = self.interner();
        let mut result = InferenceResult::default();
        for var in ctx.vars() {
            let name = var.info.name;
            if !var.has_candidates() {
                let fallback = var.info.constraint.unwrap_or_else(|| {
                    if compute_variance(interner, pattern, name).is_contravariant() {
                        TypeId::NEVER
                    } else {
                        TypeId::UNKNOWN
                    }
                });
                trace!(name = name.0, fallback = fallback.0, "infer: no candidates");
                result.bindings.insert(name, fallback);
                result.uninferred.push((name, fallback));
                continue;
            }

            let mut inferred = if !var.covariant.is_empty() {
                interner.union(var.covariant.to_vec())
            } else {
                interner.intersection(var.contravariant.to_vec())
            };
            if let Some(constraint) = var.info.constraint
                && !self.check_subtype(inferred, constraint).is_true()
            {
                trace!(
                    name = name.0,
                    inferred = inferred.0,
                    constraint = constraint.0,
                    "infer: candidate violates constraint"
                );
                inferred = constraint;
            }
            result.bindings.insert(name, inferred);
        }
        result
    }
}
