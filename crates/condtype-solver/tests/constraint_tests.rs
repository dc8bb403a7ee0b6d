use super::*;
use crate::intern::TypeInterner;

fn param(interner: &TypeInterner, name: &str) -> TypeId {
    interner.type_param(TypeParamInfo::unconstrained(interner.intern_string(name)))
}

#[test]
fn test_true_branch_is_refined_by_extends() {
    // T extends string ? T : number  has constraint  (T & string) | number
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let cond = ConditionalType {
        check_type: t,
        extends_type: TypeId::STRING,
        true_type: t,
        false_type: TypeId::NUMBER,
        is_distributive: true,
    };
    let expected = interner.union2(interner.intersection2(t, TypeId::STRING), TypeId::NUMBER);
    assert_eq!(conditional_constraint(&interner, &cond), expected);
}

#[test]
fn test_infer_pattern_leaves_true_branch_alone() {
    // T extends (infer U)[] ? U : never  has constraint  U
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let u_name = interner.intern_string("U");
    let u = interner.type_param(TypeParamInfo::unconstrained(u_name));
    let cond = ConditionalType {
        check_type: t,
        extends_type: interner.array(interner.infer(TypeParamInfo::unconstrained(u_name))),
        true_type: u,
        false_type: TypeId::NEVER,
        is_distributive: true,
    };
    assert_eq!(conditional_constraint(&interner, &cond), u);
}

#[test]
fn test_nested_conditionals_are_flattened() {
    // T extends string ? "s" : (T extends number ? "n" : "o")
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let s = interner.literal_string("s");
    let n = interner.literal_string("n");
    let o = interner.literal_string("o");
    let inner = interner.declare_conditional(t, TypeId::NUMBER, n, o);
    let cond = ConditionalType {
        check_type: t,
        extends_type: TypeId::STRING,
        true_type: s,
        false_type: inner,
        is_distributive: true,
    };
    assert_eq!(
        conditional_constraint(&interner, &cond),
        interner.union3(s, n, o),
        "nested conditionals contribute their own constraints"
    );
}

#[test]
fn test_replace_type_rewrites_every_occurrence() {
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let a = interner.intern_string("a");
    let source = interner.object(vec![PropertyInfo::new(a, interner.array(t))]);
    let replaced = replace_type(&interner, source, t, TypeId::STRING);
    let expected = interner.object(vec![PropertyInfo::new(a, interner.array(TypeId::STRING))]);
    assert_eq!(replaced, expected);
    assert_eq!(replace_type(&interner, source, t, t), source, "identity replacement");
}

#[test]
fn test_replace_type_matches_non_parameter_nodes() {
    // Replacing the array node itself, not just parameters.
    let interner = TypeInterner::new();
    let arr = interner.array(TypeId::NUMBER);
    let wrapped = interner.tuple(vec![TupleElement::required(arr)]);
    let replaced = replace_type(&interner, wrapped, arr, TypeId::BOOLEAN);
    assert_eq!(replaced, interner.tuple(vec![TupleElement::required(TypeId::BOOLEAN)]));
}
