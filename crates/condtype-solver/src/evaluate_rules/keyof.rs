//! `keyof T` evaluation.

use crate::evaluate::TypeEvaluator;
use crate::def::TypeResolver;
use crate::evaluate_rules::number_key_text;
use crate::types::*;
use crate::visitor::is_deferred_type;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Evaluate `keyof operand`.
    ///
    /// - `keyof any` and `keyof never` are `string | number | symbol`
    /// - `keyof unknown` is `never`
    /// - `keyof (A | B)` is the keys common to both, `keyof (A & B)` the keys
    ///   of either
    pub fn evaluate_keyof(&mut self, operand: TypeId) -> TypeId {
        let interner = self.interner();
        let operand = self.evaluate(operand);
        match operand {
            TypeId::ERROR => return TypeId::ERROR,
            TypeId::ANY | TypeId::NEVER => {
                return interner.union3(TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL);
            }
            TypeId::UNKNOWN => return TypeId::NEVER,
            _ => {}
        }
        if is_deferred_type(interner, operand) {
            return interner.keyof(operand);
        }

        match interner.lookup(operand) {
            Some(TypeData::Object(shape_id)) => {
                let shape = interner.object_shape(shape_id);
                let keys = shape
                    .properties
                    .iter()
                    .map(|prop| interner.literal_string_atom(prop.name))
                    .collect();
                interner.union(keys)
            }
            Some(TypeData::Union(list_id)) => {
                let members = interner.type_list(list_id);
                let mut common: Option<Vec<TypeId>> = None;
                for &member in members.iter() {
                    let keys = self.evaluate_keyof(member);
                    if keys.is_error() {
                        return TypeId::ERROR;
                    }
                    let keys = match interner.lookup(keys) {
                        Some(TypeData::Union(keys_id)) => interner.type_list(keys_id).to_vec(),
                        _ if keys == TypeId::NEVER => Vec::new(),
                        _ => vec![keys],
                    };
                    common = Some(match common {
                        None => keys,
                        Some(mut common) => {
                            common.retain(|key| keys.contains(key));
                            common
                        }
                    });
                }
                interner.union(common.unwrap_or_default())
            }
            Some(TypeData::Intersection(list_id)) => {
                let members = interner.type_list(list_id);
                let mut keys = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    keys.push(self.evaluate_keyof(member));
                }
                interner.union(keys)
            }
            Some(TypeData::Array(_)) => TypeId::NUMBER,
            Some(TypeData::Tuple(list_id)) => {
                let elements = interner.tuple_list(list_id);
                let mut keys: Vec<TypeId> = elements
                    .iter()
                    .enumerate()
                    .filter(|(_, element)| !element.rest)
                    .map(|(i, _)| interner.literal_string(&number_key_text(i as f64)))
                    .collect();
                keys.push(TypeId::NUMBER);
                interner.union(keys)
            }
            _ => TypeId::NEVER,
        }
    }
}
