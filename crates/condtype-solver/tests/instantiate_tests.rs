use super::*;
use crate::intern::TypeInterner;

fn param(interner: &TypeInterner, name: &str) -> (Atom, TypeId) {
    let atom = interner.intern_string(name);
    (atom, interner.type_param(TypeParamInfo::unconstrained(atom)))
}

#[test]
fn test_substitutes_bound_parameters_only() {
    // { a: T; b: U } with T = string
    let interner = TypeInterner::new();
    let (t_name, t) = param(&interner, "T");
    let (_, u) = param(&interner, "U");
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let obj = interner.object(vec![PropertyInfo::new(a, t), PropertyInfo::new(b, u)]);

    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, TypeId::STRING);
    let result = instantiate_type(&interner, obj, &subst);
    let expected = interner.object(vec![
        PropertyInfo::new(a, TypeId::STRING),
        PropertyInfo::new(b, u),
    ]);
    assert_eq!(result, expected, "unbound U stays naked");
}

#[test]
fn test_empty_substitution_is_identity() {
    let interner = TypeInterner::new();
    let (_, t) = param(&interner, "T");
    let arr = interner.array(t);
    assert_eq!(instantiate_type(&interner, arr, &TypeSubstitution::new()), arr);
}

#[test]
fn test_substitution_does_not_evaluate() {
    // keyof T with T = { a: string } stays a keyof node
    let interner = TypeInterner::new();
    let (t_name, t) = param(&interner, "T");
    let obj = interner.object(vec![PropertyInfo::new(interner.intern_string("a"), TypeId::STRING)]);
    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, obj);
    let result = instantiate_type(&interner, interner.keyof(t), &subst);
    assert_eq!(result, interner.keyof(obj));
}

#[test]
fn test_distributive_conditional_expands_over_union_binding() {
    let interner = TypeInterner::new();
    let (t_name, t) = param(&interner, "T");
    let cond = interner.declare_conditional(t, TypeId::STRING, t, TypeId::NEVER);
    let hello = interner.literal_string("hello");
    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, interner.union2(hello, TypeId::NUMBER));

    let result = instantiate_type(&interner, cond, &subst);
    let per_member = |member| {
        interner.conditional(ConditionalType {
            check_type: member,
            extends_type: TypeId::STRING,
            true_type: member,
            false_type: TypeId::NEVER,
            is_distributive: true,
        })
    };
    let expected = interner.union2(per_member(hello), per_member(TypeId::NUMBER));
    assert_eq!(result, expected, "one unevaluated conditional per member");

    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, TypeId::NEVER);
    assert_eq!(instantiate_type(&interner, cond, &subst), TypeId::NEVER);
}

#[test]
fn test_infer_shadows_outer_binding_in_true_branch() {
    // T extends (infer U)[] ? U : U  with U = number bound outside
    let interner = TypeInterner::new();
    let (t_name, t) = param(&interner, "T");
    let (u_name, u) = param(&interner, "U");
    let cond = interner.conditional(ConditionalType {
        check_type: t,
        extends_type: interner.array(interner.infer(TypeParamInfo::unconstrained(u_name))),
        true_type: u,
        false_type: u,
        is_distributive: false,
    });
    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, TypeId::STRING);
    subst.insert(u_name, TypeId::NUMBER);

    let result = instantiate_type(&interner, cond, &subst);
    let Some(TypeData::Conditional(id)) = interner.lookup(result) else {
        panic!("expected conditional");
    };
    let shape = interner.conditional_type(id);
    assert_eq!(shape.check_type, TypeId::STRING);
    assert_eq!(shape.true_type, u, "the capture shadows U in the true branch");
    assert_eq!(shape.false_type, TypeId::NUMBER, "the false branch sees the outer U");
}

#[test]
fn test_mapped_key_shadows_outer_binding() {
    let interner = TypeInterner::new();
    let (k_name, k) = param(&interner, "K");
    let (t_name, t) = param(&interner, "T");
    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::unconstrained(k_name),
        constraint: interner.keyof(t),
        template: k,
    });
    let mut subst = TypeSubstitution::new();
    subst.insert(k_name, TypeId::STRING);
    subst.insert(t_name, TypeId::NUMBER);
    let result = instantiate_type(&interner, mapped, &subst);
    let expected = interner.mapped(MappedType {
        type_param: TypeParamInfo::unconstrained(k_name),
        constraint: interner.keyof(TypeId::NUMBER),
        template: k,
    });
    assert_eq!(result, expected);
}

#[test]
fn test_rest_tuple_binding_is_spread() {
    // [A, ...R] with R = [B, C] becomes [A, B, C]
    let interner = TypeInterner::new();
    let (r_name, r) = param(&interner, "R");
    let tuple = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement {
            type_id: r,
            name: None,
            optional: false,
            rest: true,
        },
    ]);
    let mut subst = TypeSubstitution::new();
    subst.insert(
        r_name,
        interner.tuple(vec![
            TupleElement::required(TypeId::NUMBER),
            TupleElement::required(TypeId::BOOLEAN),
        ]),
    );
    let expected = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement::required(TypeId::NUMBER),
        TupleElement::required(TypeId::BOOLEAN),
    ]);
    assert_eq!(instantiate_type(&interner, tuple, &subst), expected);
}

#[test]
fn test_unbound_replacement() {
    let interner = TypeInterner::new();
    let (_, t) = param(&interner, "T");
    let arr = interner.array(t);
    let empty = TypeSubstitution::new();
    let mut instantiator = TypeInstantiator::new(&interner, &empty).with_unbound_replacement(TypeId::ANY);
    assert_eq!(instantiator.instantiate(arr), interner.array(TypeId::ANY));
}

#[test]
fn test_depth_limit_reports_exceeded() {
    let interner = TypeInterner::new();
    let (t_name, t) = param(&interner, "T");
    let mut nested = t;
    for _ in 0..10 {
        nested = interner.array(nested);
    }
    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, TypeId::STRING);
    let mut instantiator = TypeInstantiator::new(&interner, &subst).with_max_depth(4);
    let result = instantiator.instantiate(nested);
    assert!(instantiator.depth_exceeded());
    assert!(
        crate::visitor::contains_error_type(&interner, result),
        "the cut-off subtree is replaced by the error marker"
    );
}

#[test]
fn test_from_args_uses_defaults() {
    // <T, U = T[]> applied to [string]
    let interner = TypeInterner::new();
    let (t_name, t) = param(&interner, "T");
    let u_name = interner.intern_string("U");
    let params = vec![
        TypeParamInfo::unconstrained(t_name),
        TypeParamInfo {
            name: u_name,
            constraint: None,
            default: Some(interner.array(t)),
        },
    ];
    let subst = TypeSubstitution::from_args(&interner, &params, &[TypeId::STRING]);
    assert_eq!(subst.get(t_name), Some(TypeId::STRING));
    assert_eq!(subst.get(u_name), Some(interner.array(TypeId::STRING)));
    assert_eq!(subst.len(), 2);
}

#[test]
fn test_substitution_copy_on_extend() {
    let interner = TypeInterner::new();
    let t = interner.intern_string("T");
    let u = interner.intern_string("U");
    let mut base = TypeSubstitution::new();
    base.insert(t, TypeId::STRING);

    let extended = base.extended(u, TypeId::NUMBER);
    assert!(!base.contains(u), "extending never mutates the original");
    assert_eq!(extended.get(u), Some(TypeId::NUMBER));

    let without = extended.without(&[t]);
    assert!(!without.contains(t));
    assert!(without.contains(u));
    assert_eq!(base.extend_with(&without).len(), 2);
}
