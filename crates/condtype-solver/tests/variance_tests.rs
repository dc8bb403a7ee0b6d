use super::*;
use crate::def::{DefinitionInfo, DefinitionStore};
use crate::intern::TypeInterner;

fn setup() -> (TypeInterner, Atom, TypeId) {
    let interner = TypeInterner::new();
    let name = interner.intern_string("T");
    let t = interner.type_param(TypeParamInfo::unconstrained(name));
    (interner, name, t)
}

#[test]
fn test_property_is_covariant() {
    let (interner, name, t) = setup();
    let obj = interner.object(vec![PropertyInfo::new(interner.intern_string("x"), t)]);
    assert_eq!(compute_variance(&interner, obj, name), Variance::COVARIANT);
}

#[test]
fn test_parameter_is_contravariant() {
    let (interner, name, t) = setup();
    let func = interner.function(FunctionShape {
        params: vec![ParamInfo::required(None, t)],
        return_type: TypeId::VOID,
    });
    let variance = compute_variance(&interner, func, name);
    assert!(variance.is_contravariant(), "got {variance:?}");
}

#[test]
fn test_parameter_and_return_is_invariant() {
    let (interner, name, t) = setup();
    let func = interner.function(FunctionShape {
        params: vec![ParamInfo::required(None, t)],
        return_type: t,
    });
    assert!(compute_variance(&interner, func, name).is_invariant());
}

#[test]
fn test_conditional_check_position_is_invariant() {
    // T extends string ? T : number -- covariant-looking branches do not help
    let (interner, name, t) = setup();
    let cond = interner.declare_conditional(t, TypeId::STRING, t, TypeId::NUMBER);
    assert_eq!(compute_variance(&interner, cond, name), Variance::INVARIANT);
}

#[test]
fn test_conditional_extends_position_is_invariant() {
    // string extends T ? 1 : 0
    let (interner, name, t) = setup();
    let cond = interner.declare_conditional(
        TypeId::STRING,
        t,
        interner.literal_number(1.0),
        interner.literal_number(0.0),
    );
    assert!(compute_variance(&interner, cond, name).is_invariant());
}

#[test]
fn test_unused_parameter_is_independent() {
    let (interner, name, _) = setup();
    let obj = interner.object(vec![PropertyInfo::new(interner.intern_string("x"), TypeId::STRING)]);
    assert!(compute_variance(&interner, obj, name).is_independent());
}

#[test]
fn test_keyof_flips_polarity() {
    let (interner, name, t) = setup();
    assert!(compute_variance(&interner, interner.keyof(t), name).is_contravariant());
}

#[test]
fn test_definition_variance_is_cached_in_resolver() {
    let (interner, name, t) = setup();
    let defs = DefinitionStore::new();
    let u_name = interner.intern_string("U");
    let u = interner.type_param(TypeParamInfo::unconstrained(u_name));
    // type Pair<T, U> = { first: T; check: U extends string ? 1 : 0 }
    let body = interner.object(vec![
        PropertyInfo::new(interner.intern_string("first"), t),
        PropertyInfo::new(
            interner.intern_string("check"),
            interner.declare_conditional(
                u,
                TypeId::STRING,
                interner.literal_number(1.0),
                interner.literal_number(0.0),
            ),
        ),
    ]);
    let def = defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Pair"),
        vec![
            TypeParamInfo::unconstrained(name),
            TypeParamInfo::unconstrained(u_name),
        ],
        body,
    ));

    assert!(defs.get_variance(def).is_none());
    let variance = definition_variance(&interner, &defs, def).expect("known definition");
    assert_eq!(&*variance, &[Variance::COVARIANT, Variance::INVARIANT]);
    assert!(defs.get_variance(def).is_some(), "variance is stored after first use");
}

#[test]
fn test_definition_variance_of_unknown_def() {
    let (interner, _, _) = setup();
    let defs = DefinitionStore::new();
    assert!(definition_variance(&interner, &defs, DefId(9999)).is_none());
}
