//! Index access evaluation: `T[K]`.

use crate::evaluate::TypeEvaluator;
use crate::def::TypeResolver;
use crate::evaluate_rules::literal_key_name;
use crate::types::*;
use crate::visitor::is_deferred_type;
use tracing::trace;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Evaluate `object[index]`.
    ///
    /// Union keys and union objects distribute. An optional property reads as
    /// `T | undefined`. Accessing a property the object does not have is an
    /// error.
    pub fn evaluate_index_access(&mut self, object_type: TypeId, index_type: TypeId) -> TypeId {
        let interner = self.interner();
        let object = self.evaluate(object_type);
        let index = self.evaluate(index_type);
        if object.is_error() || index.is_error() {
            return TypeId::ERROR;
        }
        if index == TypeId::NEVER {
            return TypeId::NEVER;
        }
        if object.is_any() {
            return TypeId::ANY;
        }
        if is_deferred_type(interner, object) || is_deferred_type(interner, index) {
            return interner.index_access(object, index);
        }

        if let Some(TypeData::Union(list_id)) = interner.lookup(index) {
            let keys = interner.type_list(list_id);
            return self.map_union(&keys, |this, key| this.evaluate_index_access(object, key));
        }
        if let Some(TypeData::Union(list_id)) = interner.lookup(object) {
            let members = interner.type_list(list_id);
            return self.map_union(&members, |this, member| this.evaluate_index_access(member, index));
        }

        let result = match interner.lookup(object) {
            Some(TypeData::Object(shape_id)) => {
                let shape = interner.object_shape(shape_id);
                match literal_key_name(interner, index).and_then(|name| shape.property(name)) {
                    Some(prop) if prop.optional => interner.union2(prop.type_id, TypeId::UNDEFINED),
                    Some(prop) => prop.type_id,
                    None => TypeId::ERROR,
                }
            }
            Some(TypeData::Intersection(list_id)) => {
                let members = interner.type_list(list_id);
                let mut found = Vec::new();
                for &member in members.iter() {
                    let value = self.evaluate_index_access(member, index);
                    if !value.is_error() {
                        found.push(value);
                    }
                }
                if found.is_empty() {
                    TypeId::ERROR
                } else {
                    interner.intersection(found)
                }
            }
            Some(TypeData::Tuple(list_id)) => {
                let elements = interner.tuple_list(list_id);
                self.tuple_element_at(&elements, index)
            }
            Some(TypeData::Array(element)) => {
                if self.is_numeric_key(index) {
                    element
                } else {
                    TypeId::ERROR
                }
            }
            _ => TypeId::ERROR,
        };
        if result.is_error() {
            trace!(object = object.0, index = index.0, "index access: no such property");
            return TypeId::ERROR;
        }
        self.evaluate(result)
    }

    fn map_union(
        &mut self,
        members: &[TypeId],
        mut f: impl FnMut(&mut Self, TypeId) -> TypeId,
    ) -> TypeId {
        let mut results = Vec::with_capacity(members.len());
        for &member in members {
            let result = f(self, member);
            if result.is_error() {
                return TypeId::ERROR;
            }
            results.push(result);
        }
        self.interner().union(results)
    }

    fn is_numeric_key(&self, index: TypeId) -> bool {
        index == TypeId::NUMBER
            || matches!(
                self.interner().lookup(index),
                Some(TypeData::Literal(LiteralValue::Number(_)))
            )
    }

    /// `[A, B][0]` is `A`, `[A, B][number]` is `A | B`.
    fn tuple_element_at(&self, elements: &[TupleElement], index: TypeId) -> TypeId {
        let interner = self.interner();
        let element_type = |element: &TupleElement| {
            if element.rest {
                match interner.lookup(element.type_id) {
                    Some(TypeData::Array(inner)) => inner,
                    _ => element.type_id,
                }
            } else if element.optional {
                interner.union2(element.type_id, TypeId::UNDEFINED)
            } else {
                element.type_id
            }
        };
        if index == TypeId::NUMBER {
            return interner.union(elements.iter().map(element_type).collect());
        }
        let position = match interner.lookup(index) {
            Some(TypeData::Literal(LiteralValue::Number(value)))
                if value.0 >= 0.0 && value.0.fract() == 0.0 =>
            {
                Some(value.0 as usize)
            }
            Some(TypeData::Literal(LiteralValue::String(atom))) => {
                interner.resolve_atom(atom).parse::<usize>().ok()
            }
            _ => None,
        };
        match position.and_then(|position| elements.get(position)) {
            Some(element) if !element.rest => element_type(element),
            _ => TypeId::ERROR,
        }
    }
}
