//! Generic type instantiation and substitution.
//!
//! `instantiate_type` replaces every type parameter bound in a
//! [`TypeSubstitution`] by its bound type and leaves unbound parameters
//! naked. It is a pure structural rewrite: conditional, index-access,
//! `keyof` and mapped nodes are rebuilt with substituted children but not
//! evaluated. Reduction is the evaluator's job.
//!
//! Two scoping rules apply while descending:
//! - a mapped type's key parameter shadows an outer binding of the same name
//!   inside its template;
//! - `infer` declarations in a conditional's extends type shadow outer
//!   bindings inside the extends type and the true branch.
//!
//! A distributive conditional whose naked check parameter is bound to a union
//! is expanded member by member, so `T extends U ? X : Y` with
//! `T := A | B` instantiates to `(A extends U ? X : Y) | (B extends U ? X : Y)`.

use crate::db::TypeDatabase;
use crate::types::*;
use crate::visitor::collect_infer_params;
use condtype_common::interner::Atom;
use condtype_common::limits::MAX_SUBSTITUTION_DEPTH;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

/// Environment mapping type-parameter names to bound types.
///
/// Copy-on-extend: the `extended*` constructors return a new environment and
/// never mutate one that has already been handed to a nested resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: FxHashMap<Atom, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind declared parameters to arguments positionally. A missing argument
    /// falls back to the parameter's default (instantiated with the earlier
    /// bindings); with no default the parameter stays naked.
    pub fn from_args(db: &dyn TypeDatabase, params: &[TypeParamInfo], args: &[TypeId]) -> Self {
        let mut subst = Self::new();
        for (i, param) in params.iter().enumerate() {
            if let Some(&arg) = args.get(i) {
                subst.insert(param.name, arg);
            } else if let Some(default) = param.default {
                let resolved = instantiate_type(db, default, &subst);
                subst.insert(param.name, resolved);
            }
        }
        subst
    }

    pub fn insert(&mut self, name: Atom, type_id: TypeId) {
        self.map.insert(name, type_id);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    pub fn contains(&self, name: Atom) -> bool {
        self.map.contains_key(&name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// A copy of this environment with one more binding.
    #[must_use]
    pub fn extended(&self, name: Atom, type_id: TypeId) -> Self {
        let mut next = self.clone();
        next.insert(name, type_id);
        next
    }

    /// A copy of this environment with every binding of `other` added.
    #[must_use]
    pub fn extend_with(&self, other: &TypeSubstitution) -> Self {
        let mut next = self.clone();
        for (&name, &type_id) in &other.map {
            next.insert(name, type_id);
        }
        next
    }

    /// A copy of this environment with `names` unbound, so that the `infer`
    /// declarations of an extends pattern are not captured by outer bindings
    /// of the same name.
    #[must_use]
    pub fn without(&self, names: &[Atom]) -> Self {
        if names.iter().all(|name| !self.contains(*name)) {
            return self.clone();
        }
        let mut next = self.clone();
        next.map.retain(|name, _| !names.contains(name));
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = (Atom, TypeId)> + '_ {
        self.map.iter().map(|(&name, &type_id)| (name, type_id))
    }
}

/// Structural rewriter applying a [`TypeSubstitution`].
pub struct TypeInstantiator<'a> {
    interner: &'a dyn TypeDatabase,
    substitution: &'a TypeSubstitution,
    /// Names hidden by an enclosing mapped key or `infer` declaration.
    shadowed: SmallVec<[Atom; 4]>,
    /// When set, type parameters with no binding are replaced by this type.
    unbound_replacement: Option<TypeId>,
    cache: FxHashMap<TypeId, TypeId>,
    depth: u32,
    max_depth: u32,
    depth_exceeded: bool,
}

impl<'a> TypeInstantiator<'a> {
    pub fn new(interner: &'a dyn TypeDatabase, substitution: &'a TypeSubstitution) -> Self {
        TypeInstantiator {
            interner,
            substitution,
            shadowed: SmallVec::new(),
            unbound_replacement: None,
            cache: FxHashMap::default(),
            depth: 0,
            max_depth: MAX_SUBSTITUTION_DEPTH,
            depth_exceeded: false,
        }
    }

    /// Replace every unbound type parameter by `replacement`. Used to build the
    /// permissive instantiation (`any` for every parameter) of a check.
    pub fn with_unbound_replacement(mut self, replacement: TypeId) -> Self {
        self.unbound_replacement = Some(replacement);
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn depth_exceeded(&self) -> bool {
        self.depth_exceeded
    }

    pub fn instantiate(&mut self, type_id: TypeId) -> TypeId {
        if type_id.is_intrinsic() {
            return type_id;
        }
        if self.substitution.is_empty() && self.unbound_replacement.is_none() {
            return type_id;
        }
        let cacheable = self.shadowed.is_empty();
        if cacheable && let Some(&cached) = self.cache.get(&type_id) {
            return cached;
        }
        if self.depth >= self.max_depth {
            self.depth_exceeded = true;
            return TypeId::ERROR;
        }
        self.depth += 1;
        let result = self.instantiate_inner(type_id);
        self.depth -= 1;
        if cacheable {
            self.cache.insert(type_id, result);
        }
        result
    }

    fn lookup_binding(&self, name: Atom) -> Option<TypeId> {
        if self.shadowed.contains(&name) {
            return None;
        }
        self.substitution.get(name).or(self.unbound_replacement)
    }

    fn with_shadowed<T>(&mut self, names: &[Atom], f: impl FnOnce(&mut Self) -> T) -> T {
        let before = self.shadowed.len();
        self.shadowed.extend(names.iter().copied());
        let result = f(self);
        self.shadowed.truncate(before);
        result
    }

    fn instantiate_list(&mut self, members: &[TypeId]) -> Vec<TypeId> {
        members.iter().map(|&m| self.instantiate(m)).collect()
    }

    fn instantiate_inner(&mut self, type_id: TypeId) -> TypeId {
        let interner = self.interner;
        let Some(key) = interner.lookup(type_id) else {
            return type_id;
        };

        match key {
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Lazy(_) | TypeData::Error => {
                type_id
            }
            TypeData::TypeParameter(info) | TypeData::Infer(info) => {
                self.lookup_binding(info.name).unwrap_or(type_id)
            }
            TypeData::Object(shape_id) => {
                let shape = interner.object_shape(shape_id);
                let properties = shape
                    .properties
                    .iter()
                    .map(|prop| PropertyInfo {
                        type_id: self.instantiate(prop.type_id),
                        ..prop.clone()
                    })
                    .collect();
                interner.object(properties)
            }
            TypeData::Array(element) => {
                let element = self.instantiate(element);
                interner.array(element)
            }
            TypeData::Tuple(list_id) => {
                let elements = interner.tuple_list(list_id);
                let mut instantiated = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    let type_id = self.instantiate(element.type_id);
                    // `[A, ...[B, C]]` spreads into `[A, B, C]`.
                    if element.rest
                        && let Some(TypeData::Tuple(spread)) = interner.lookup(type_id)
                    {
                        instantiated.extend(interner.tuple_list(spread).iter().cloned());
                        continue;
                    }
                    instantiated.push(TupleElement {
                        type_id,
                        ..element.clone()
                    });
                }
                interner.tuple(instantiated)
            }
            TypeData::Union(list_id) => {
                let members = interner.type_list(list_id);
                let members = self.instantiate_list(&members);
                interner.union(members)
            }
            TypeData::Intersection(list_id) => {
                let members = interner.type_list(list_id);
                let members = self.instantiate_list(&members);
                interner.intersection(members)
            }
            TypeData::Function(shape_id) => {
                let shape = interner.function_shape(shape_id);
                let params = shape
                    .params
                    .iter()
                    .map(|param| ParamInfo {
                        type_id: self.instantiate(param.type_id),
                        ..param.clone()
                    })
                    .collect();
                let return_type = self.instantiate(shape.return_type);
                interner.function(FunctionShape {
                    params,
                    return_type,
                })
            }
            TypeData::Conditional(cond_id) => {
                let cond = interner.conditional_type(cond_id);
                self.instantiate_conditional(&cond)
            }
            TypeData::IndexAccess(object, index) => {
                let object = self.instantiate(object);
                let index = self.instantiate(index);
                interner.index_access(object, index)
            }
            TypeData::KeyOf(operand) => {
                let operand = self.instantiate(operand);
                interner.keyof(operand)
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = interner.mapped_type(mapped_id);
                let constraint = self.instantiate(mapped.constraint);
                let key_name = mapped.type_param.name;
                let template = self.with_shadowed(&[key_name], |this| {
                    this.instantiate(mapped.template)
                });
                interner.mapped(MappedType {
                    type_param: mapped.type_param.clone(),
                    constraint,
                    template,
                })
            }
            TypeData::Application(app_id) => {
                let app = interner.type_application(app_id);
                let base = self.instantiate(app.base);
                let args = self.instantiate_list(&app.args);
                interner.application(base, args)
            }
        }
    }

    fn instantiate_conditional(&mut self, cond: &ConditionalType) -> TypeId {
        let interner = self.interner;

        if cond.is_distributive
            && let Some(TypeData::TypeParameter(param)) = interner.lookup(cond.check_type)
            && let Some(bound) = self.lookup_binding(param.name)
        {
            let members: Option<Vec<TypeId>> = if bound == TypeId::NEVER {
                Some(Vec::new())
            } else if bound == TypeId::BOOLEAN {
                Some(vec![TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE])
            } else if let Some(TypeData::Union(list_id)) = interner.lookup(bound) {
                Some(interner.type_list(list_id).to_vec())
            } else {
                None
            };

            if let Some(members) = members {
                trace!(
                    param = param.name.0,
                    members = members.len(),
                    "instantiate: distributing conditional over union binding"
                );
                let mut results = Vec::with_capacity(members.len());
                for member in members {
                    let extended = self.substitution.extended(param.name, member);
                    let mut child = TypeInstantiator {
                        interner,
                        substitution: &extended,
                        shadowed: self.shadowed.clone(),
                        unbound_replacement: self.unbound_replacement,
                        cache: FxHashMap::default(),
                        depth: self.depth,
                        max_depth: self.max_depth,
                        depth_exceeded: false,
                    };
                    results.push(child.instantiate_conditional_parts(cond));
                    self.depth_exceeded |= child.depth_exceeded;
                }
                return interner.union(results);
            }
        }

        self.instantiate_conditional_parts(cond)
    }

    fn instantiate_conditional_parts(&mut self, cond: &ConditionalType) -> TypeId {
        let check_type = self.instantiate(cond.check_type);
        let infer_names: SmallVec<[Atom; 4]> = collect_infer_params(self.interner, cond.extends_type)
            .into_iter()
            .map(|info| info.name)
            .collect();
        let (extends_type, true_type) = self.with_shadowed(&infer_names, |this| {
            (
                this.instantiate(cond.extends_type),
                this.instantiate(cond.true_type),
            )
        });
        let false_type = self.instantiate(cond.false_type);
        self.interner.conditional(ConditionalType {
            check_type,
            extends_type,
            true_type,
            false_type,
            is_distributive: cond.is_distributive,
        })
    }
}

/// Instantiate a type with a substitution.
pub fn instantiate_type(
    interner: &dyn TypeDatabase,
    type_id: TypeId,
    substitution: &TypeSubstitution,
) -> TypeId {
    if substitution.is_empty() {
        return type_id;
    }
    TypeInstantiator::new(interner, substitution).instantiate(type_id)
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
