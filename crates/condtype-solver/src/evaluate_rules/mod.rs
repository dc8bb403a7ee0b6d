//! Reduction rules for the meta-types handled by `TypeEvaluator`.
//!
//! Each submodule adds methods to `TypeEvaluator` through its own `impl`
//! block.

pub mod conditional;
pub mod constraint;
pub mod index_access;
pub mod infer_pattern;
pub mod keyof;
pub mod mapped;

use crate::db::TypeDatabase;
use crate::types::*;
use condtype_common::interner::Atom;

/// Property name denoted by a string or number literal key.
pub(crate) fn literal_key_name(db: &dyn TypeDatabase, key: TypeId) -> Option<Atom> {
    match db.lookup(key)? {
        TypeData::Literal(LiteralValue::String(atom)) => Some(atom),
        TypeData::Literal(LiteralValue::Number(value)) => {
            Some(db.intern_string(&number_key_text(value.0)))
        }
        _ => None,
    }
}

/// `1` names the same property as `"1"`; integral values print without a
/// fraction.
pub(crate) fn number_key_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// The members a union-like type distributes over, or `None` for a type that
/// is not a union. `boolean` counts as `true | false`.
pub(crate) fn union_members(db: &dyn TypeDatabase, type_id: TypeId) -> Option<Vec<TypeId>> {
    if type_id == TypeId::BOOLEAN {
        return Some(vec![TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE]);
    }
    match db.lookup(type_id) {
        Some(TypeData::Union(list_id)) => Some(db.type_list(list_id).to_vec()),
        _ => None,
    }
}
