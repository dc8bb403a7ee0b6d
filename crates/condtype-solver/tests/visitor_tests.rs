use super::*;
use crate::intern::TypeInterner;

#[test]
fn test_contains_type_parameters() {
    let interner = TypeInterner::new();
    let t = interner.type_param(TypeParamInfo::unconstrained(interner.intern_string("T")));
    let nested = interner.array(interner.union2(t, TypeId::STRING));
    assert!(contains_type_parameters(&interner, nested));
    assert!(!contains_type_parameters(&interner, interner.array(TypeId::STRING)));
    assert!(!contains_type_parameters(&interner, TypeId::ANY));
}

#[test]
fn test_collect_infer_params_in_order_and_deduplicated() {
    // [infer A, infer B, infer A]
    let interner = TypeInterner::new();
    let a = interner.intern_string("A");
    let b = interner.intern_string("B");
    let infer_a = interner.infer(TypeParamInfo::unconstrained(a));
    let infer_b = interner.infer(TypeParamInfo::unconstrained(b));
    let pattern = interner.tuple(vec![
        TupleElement::required(infer_a),
        TupleElement::required(infer_b),
        TupleElement::required(infer_a),
    ]);
    let names: Vec<Atom> = collect_infer_params(&interner, pattern)
        .into_iter()
        .map(|info| info.name)
        .collect();
    assert_eq!(names, vec![a, b], "leftmost first, each name once");
    assert!(contains_infer_types(&interner, pattern));
}

#[test]
fn test_is_deferred_type() {
    let interner = TypeInterner::new();
    let t = interner.type_param(TypeParamInfo::unconstrained(interner.intern_string("T")));
    assert!(is_deferred_type(&interner, t));
    assert!(is_deferred_type(&interner, interner.keyof(t)));
    assert!(is_deferred_type(&interner, interner.union2(t, TypeId::STRING)));
    // An object mentioning T is a structural leaf, not deferred.
    let obj = interner.object(vec![PropertyInfo::new(interner.intern_string("x"), t)]);
    assert!(!is_deferred_type(&interner, obj));
    assert!(!is_deferred_type(&interner, TypeId::STRING));
}

#[test]
fn test_contains_error_type() {
    let interner = TypeInterner::new();
    assert!(contains_error_type(&interner, TypeId::ERROR));
    assert!(contains_error_type(&interner, interner.array(interner.array(TypeId::ERROR))));
    let obj = interner.object(vec![PropertyInfo::new(interner.intern_string("x"), TypeId::STRING)]);
    assert!(!contains_error_type(&interner, obj));
}

#[test]
fn test_children_of_conditional() {
    let interner = TypeInterner::new();
    let t = interner.type_param(TypeParamInfo::unconstrained(interner.intern_string("T")));
    let one = interner.literal_number(1.0);
    let cond = interner.declare_conditional(t, TypeId::STRING, one, TypeId::NEVER);
    let kids = children(&interner, cond);
    assert_eq!(kids.as_slice(), &[t, TypeId::STRING, one, TypeId::NEVER]);
}
