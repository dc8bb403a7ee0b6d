//! Constraints of deferred conditional types.
//!
//! A deferred `T extends U ? X : Y` is known to be one of its branches, and
//! inside `X` the check type is known to also satisfy `U`. Its constraint is
//! therefore `X[T := T & U] | Y`, with nested conditionals replaced by their
//! own constraints. Relating a deferred conditional source to a target goes
//! through this constraint.

use crate::db::TypeDatabase;
use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::types::*;
use crate::visitor::contains_infer_types;
use rustc_hash::FxHashMap;

const MAX_CONSTRAINT_DEPTH: u32 = 50;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Replace every occurrence of `from` inside `type_id` by `to`.
    pub(crate) fn replace_type(&self, type_id: TypeId, from: TypeId, to: TypeId) -> TypeId {
        replace_type(self.interner(), type_id, from, to)
    }

    pub fn conditional_constraint(&self, cond: &ConditionalType) -> TypeId {
        conditional_constraint(self.interner(), cond)
    }
}

/// Constraint of a deferred conditional type.
pub fn conditional_constraint(db: &dyn TypeDatabase, cond: &ConditionalType) -> TypeId {
    constraint_of_conditional(db, cond, 0)
}

fn constraint_of_conditional(db: &dyn TypeDatabase, cond: &ConditionalType, depth: u32) -> TypeId {
    let true_type = if contains_infer_types(db, cond.extends_type) {
        cond.true_type
    } else {
        let refined = db.intersection2(cond.check_type, cond.extends_type);
        replace_type(db, cond.true_type, cond.check_type, refined)
    };
    let true_constraint = constraint_of(db, true_type, depth + 1);
    let false_constraint = constraint_of(db, cond.false_type, depth + 1);
    db.union2(true_constraint, false_constraint)
}

fn constraint_of(db: &dyn TypeDatabase, type_id: TypeId, depth: u32) -> TypeId {
    if depth > MAX_CONSTRAINT_DEPTH || type_id.is_intrinsic() {
        return type_id;
    }
    match db.lookup(type_id) {
        Some(TypeData::Conditional(cond_id)) => {
            let cond = db.conditional_type(cond_id);
            constraint_of_conditional(db, &cond, depth)
        }
        Some(TypeData::Union(list_id)) => {
            let members = db.type_list(list_id);
            db.union(members.iter().map(|&m| constraint_of(db, m, depth + 1)).collect())
        }
        Some(TypeData::Intersection(list_id)) => {
            let members = db.type_list(list_id);
            db.intersection(members.iter().map(|&m| constraint_of(db, m, depth + 1)).collect())
        }
        _ => type_id,
    }
}

/// Structural replacement by identity. Unlike instantiation this matches any
/// node, not only type parameters, and never distributes.
pub fn replace_type(db: &dyn TypeDatabase, type_id: TypeId, from: TypeId, to: TypeId) -> TypeId {
    if from == to {
        return type_id;
    }
    let mut replacer = TypeReplacer {
        db,
        from,
        to,
        cache: FxHashMap::default(),
        depth: 0,
    };
    replacer.replace(type_id)
}

struct TypeReplacer<'a> {
    db: &'a dyn TypeDatabase,
    from: TypeId,
    to: TypeId,
    cache: FxHashMap<TypeId, TypeId>,
    depth: u32,
}

impl TypeReplacer<'_> {
    fn replace(&mut self, type_id: TypeId) -> TypeId {
        if type_id == self.from {
            return self.to;
        }
        if type_id.is_intrinsic() || self.depth > MAX_CONSTRAINT_DEPTH {
            return type_id;
        }
        if let Some(&cached) = self.cache.get(&type_id) {
            return cached;
        }
        self.depth += 1;
        let result = self.replace_inner(type_id);
        self.depth -= 1;
        self.cache.insert(type_id, result);
        result
    }

    fn replace_list(&mut self, members: &[TypeId]) -> Vec<TypeId> {
        members.iter().map(|&member| self.replace(member)).collect()
    }

    fn replace_inner(&mut self, type_id: TypeId) -> TypeId {
        let db = self.db;
        let Some(key) = db.lookup(type_id) else {
            return type_id;
        };
        match key {
            TypeData::Object(shape_id) => {
                let shape = db.object_shape(shape_id);
                let properties = shape
                    .properties
                    .iter()
                    .map(|prop| PropertyInfo {
                        type_id: self.replace(prop.type_id),
                        ..prop.clone()
                    })
                    .collect();
                db.object(properties)
            }
            TypeData::Array(element) => {
                let element = self.replace(element);
                db.array(element)
            }
            TypeData::Tuple(list_id) => {
                let elements = db
                    .tuple_list(list_id)
                    .iter()
                    .map(|element| TupleElement {
                        type_id: self.replace(element.type_id),
                        ..element.clone()
                    })
                    .collect();
                db.tuple(elements)
            }
            TypeData::Union(list_id) => {
                let members = self.replace_list(&db.type_list(list_id));
                db.union(members)
            }
            TypeData::Intersection(list_id) => {
                let members = self.replace_list(&db.type_list(list_id));
                db.intersection(members)
            }
            TypeData::Function(shape_id) => {
                let shape = db.function_shape(shape_id);
                let params = shape
                    .params
                    .iter()
                    .map(|param| ParamInfo {
                        type_id: self.replace(param.type_id),
                        ..param.clone()
                    })
                    .collect();
                let return_type = self.replace(shape.return_type);
                db.function(FunctionShape {
                    params,
                    return_type,
                })
            }
            TypeData::Conditional(cond_id) => {
                let cond = db.conditional_type(cond_id);
                db.conditional(ConditionalType {
                    check_type: self.replace(cond.check_type),
                    extends_type: self.replace(cond.extends_type),
                    true_type: self.replace(cond.true_type),
                    false_type: self.replace(cond.false_type),
                    is_distributive: cond.is_distributive,
                })
            }
            TypeData::IndexAccess(object, index) => {
                let object = self.replace(object);
                let index = self.replace(index);
                db.index_access(object, index)
            }
            TypeData::KeyOf(operand) => {
                let operand = self.replace(operand);
                db.keyof(operand)
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = db.mapped_type(mapped_id);
                db.mapped(MappedType {
                    type_param: mapped.type_param.clone(),
                    constraint: self.replace(mapped.constraint),
                    template: self.replace(mapped.template),
                })
            }
            TypeData::Application(app_id) => {
                let app = db.type_application(app_id);
                let base = self.replace(app.base);
                let args = self.replace_list(&app.args);
                db.application(base, args)
            }
            TypeData::Intrinsic(_)
            | TypeData::Literal(_)
            | TypeData::Error
            | TypeData::TypeParameter(_)
            | TypeData::Infer(_)
            | TypeData::Lazy(_) => type_id,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/constraint_tests.rs"]
mod tests;
