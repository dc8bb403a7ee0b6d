//! Structural traversal helpers.
//!
//! These walks answer shape questions about a type graph without evaluating
//! anything: "does this type still mention a type parameter?", "which `infer`
//! variables does this pattern declare?". Each walk keeps a visited set so
//! cyclic graphs terminate.

use crate::db::TypeDatabase;
use crate::types::*;
use condtype_common::interner::Atom;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Direct children of a type node, in declaration order.
pub fn children(db: &dyn TypeDatabase, type_id: TypeId) -> SmallVec<[TypeId; 4]> {
    let mut out = SmallVec::new();
    if type_id.is_intrinsic() {
        return out;
    }
    let Some(key) = db.lookup(type_id) else {
        return out;
    };
    match key {
        TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Lazy(_) | TypeData::Error => {}
        TypeData::Object(shape_id) => {
            let shape = db.object_shape(shape_id);
            out.extend(shape.properties.iter().map(|p| p.type_id));
        }
        TypeData::Array(element) => out.push(element),
        TypeData::Tuple(list_id) => {
            let elements = db.tuple_list(list_id);
            out.extend(elements.iter().map(|e| e.type_id));
        }
        TypeData::Union(list_id) | TypeData::Intersection(list_id) => {
            out.extend(db.type_list(list_id).iter().copied());
        }
        TypeData::Function(shape_id) => {
            let shape = db.function_shape(shape_id);
            out.extend(shape.params.iter().map(|p| p.type_id));
            out.push(shape.return_type);
        }
        TypeData::TypeParameter(info) | TypeData::Infer(info) => {
            out.extend(info.constraint);
            out.extend(info.default);
        }
        TypeData::Conditional(cond_id) => {
            let cond = db.conditional_type(cond_id);
            out.extend([
                cond.check_type,
                cond.extends_type,
                cond.true_type,
                cond.false_type,
            ]);
        }
        TypeData::IndexAccess(object, index) => out.extend([object, index]),
        TypeData::KeyOf(operand) => out.push(operand),
        TypeData::Mapped(mapped_id) => {
            let mapped = db.mapped_type(mapped_id);
            out.extend([mapped.constraint, mapped.template]);
        }
        TypeData::Application(app_id) => {
            let app = db.type_application(app_id);
            out.push(app.base);
            out.extend(app.args.iter().copied());
        }
    }
    out
}

/// Returns true if any node reachable from `type_id` satisfies `predicate`.
pub fn test_type<F>(db: &dyn TypeDatabase, type_id: TypeId, mut predicate: F) -> bool
where
    F: FnMut(&TypeData) -> bool,
{
    let mut visited = FxHashSet::default();
    let mut stack: Vec<TypeId> = vec![type_id];
    while let Some(current) = stack.pop() {
        if current.is_intrinsic() || !visited.insert(current) {
            continue;
        }
        let Some(key) = db.lookup(current) else {
            continue;
        };
        if predicate(&key) {
            return true;
        }
        stack.extend(children(db, current));
    }
    false
}

/// Whether `type_id` still mentions an unresolved type parameter or `infer`
/// variable, i.e. whether it is generic.
pub fn contains_type_parameters(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    test_type(db, type_id, |key| {
        matches!(key, TypeData::TypeParameter(_) | TypeData::Infer(_))
    })
}

pub fn contains_infer_types(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    test_type(db, type_id, |key| matches!(key, TypeData::Infer(_)))
}

/// `ERROR` is an intrinsic id, so this walks child ids rather than keys.
pub fn contains_error_type(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    let mut visited = FxHashSet::default();
    let mut stack = vec![type_id];
    while let Some(current) = stack.pop() {
        if current.is_error() {
            return true;
        }
        if current.is_intrinsic() || !visited.insert(current) {
            continue;
        }
        stack.extend(children(db, current));
    }
    false
}

/// `infer` declarations in an extends pattern, deduplicated by name in
/// order of first appearance.
pub fn collect_infer_params(db: &dyn TypeDatabase, type_id: TypeId) -> Vec<TypeParamInfo> {
    let mut seen: FxHashSet<Atom> = FxHashSet::default();
    let mut params = Vec::new();
    let mut visited = FxHashSet::default();
    let mut stack = vec![type_id];
    while let Some(current) = stack.pop() {
        if current.is_intrinsic() || !visited.insert(current) {
            continue;
        }
        if let Some(TypeData::Infer(info)) = db.lookup(current)
            && seen.insert(info.name)
        {
            params.push(info);
        }
        // Reverse so the leftmost child is visited first.
        let mut kids = children(db, current);
        kids.reverse();
        stack.extend(kids);
    }
    params
}

/// Whether the type is a "deferred" form that cannot be related structurally
/// until its type parameters are known: a bare type parameter, an unresolved
/// index access, `keyof`, conditional or mapped type over generics, or a
/// union/intersection containing one.
pub fn is_deferred_type(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    if type_id.is_intrinsic() {
        return false;
    }
    match db.lookup(type_id) {
        Some(TypeData::TypeParameter(_) | TypeData::Infer(_)) => true,
        Some(
            TypeData::IndexAccess(..)
            | TypeData::KeyOf(_)
            | TypeData::Conditional(_)
            | TypeData::Mapped(_)
            | TypeData::Application(_),
        ) => contains_type_parameters(db, type_id),
        Some(TypeData::Union(list_id) | TypeData::Intersection(list_id)) => db
            .type_list(list_id)
            .iter()
            .any(|&member| is_deferred_type(db, member)),
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/visitor_tests.rs"]
mod tests;
