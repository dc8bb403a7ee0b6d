//! Mapped type evaluation: `{ [K in C]: X }`.

use crate::evaluate::TypeEvaluator;
use crate::def::TypeResolver;
use crate::evaluate_rules::{literal_key_name, union_members};
use crate::instantiate::TypeSubstitution;
use crate::types::*;
use crate::visitor::is_deferred_type;
use condtype_common::interner::Atom;
use tracing::trace;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Expand a mapped type over a finite set of literal keys into an object.
    ///
    /// The template is instantiated once per key with the key parameter bound
    /// to that key's literal. A homomorphic mapping (`[K in keyof T]`) keeps
    /// the optional and readonly modifiers of `T`'s properties.
    pub fn evaluate_mapped(&mut self, mapped: &MappedType) -> TypeId {
        let interner = self.interner();
        let constraint = self.evaluate(mapped.constraint);
        if constraint.is_error() {
            return TypeId::ERROR;
        }
        if is_deferred_type(interner, constraint) {
            return interner.mapped(MappedType {
                constraint,
                ..mapped.clone()
            });
        }
        let Some(keys) = self.mapped_keys(constraint) else {
            trace!(constraint = constraint.0, "mapped: keys are not literals");
            return interner.mapped(MappedType {
                constraint,
                ..mapped.clone()
            });
        };
        let modifiers_source = match interner.lookup(mapped.constraint) {
            Some(TypeData::KeyOf(operand)) => match interner.lookup(self.evaluate(operand)) {
                Some(TypeData::Object(shape_id)) => Some(interner.object_shape(shape_id)),
                _ => None,
            },
            _ => None,
        };

        let mut properties = Vec::with_capacity(keys.len());
        for (name, key) in keys {
            let mut subst = TypeSubstitution::new();
            subst.insert(mapped.type_param.name, key);
            let instantiated = self.instantiate(mapped.template, &subst);
            let value = self.behind_structure(|evaluator| evaluator.evaluate(instantiated));
            if value.is_error() {
                return TypeId::ERROR;
            }
            let source = modifiers_source
                .as_ref()
                .and_then(|shape| shape.property(name));
            properties.push(PropertyInfo {
                name,
                type_id: value,
                optional: source.is_some_and(|prop| prop.optional),
                readonly: source.is_some_and(|prop| prop.readonly),
            });
        }
        interner.object(properties)
    }

    fn mapped_keys(&self, constraint: TypeId) -> Option<Vec<(Atom, TypeId)>> {
        let interner = self.interner();
        if constraint == TypeId::NEVER {
            return Some(Vec::new());
        }
        let members = union_members(interner, constraint).unwrap_or_else(|| vec![constraint]);
        members
            .into_iter()
            .map(|key| literal_key_name(interner, key).map(|name| (name, key)))
            .collect()
    }
}
