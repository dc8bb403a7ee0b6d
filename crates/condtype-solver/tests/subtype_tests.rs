//! Assignability tests: intrinsics, structure, alias variance and generic
//! sources.

use super::*;
use crate::def::{DefinitionInfo, DefinitionStore};
use crate::intern::TypeInterner;
use crate::options::SolverOptions;
use condtype_common::interner::Atom;

fn param(interner: &TypeInterner, name: &str) -> (Atom, TypeId) {
    let atom = interner.intern_string(name);
    (atom, interner.type_param(TypeParamInfo::unconstrained(atom)))
}

fn check(interner: &TypeInterner, source: TypeId, target: TypeId) -> SubtypeResult {
    let mut evaluator = TypeEvaluator::new(interner);
    SubtypeChecker::new(&mut evaluator).check_subtype(source, target)
}

fn check_with_defs(
    interner: &TypeInterner,
    defs: &DefinitionStore,
    source: TypeId,
    target: TypeId,
) -> SubtypeResult {
    let mut evaluator = TypeEvaluator::with_resolver(interner, defs);
    SubtypeChecker::new(&mut evaluator).check_subtype(source, target)
}

// =============================================================================
// Intrinsics and literals
// =============================================================================

#[test]
fn test_top_and_bottom_types() {
    let interner = TypeInterner::new();
    assert!(is_subtype_of(&interner, TypeId::NEVER, TypeId::STRING), "never <: string");
    assert!(is_subtype_of(&interner, TypeId::STRING, TypeId::UNKNOWN), "string <: unknown");
    assert!(is_subtype_of(&interner, TypeId::ANY, TypeId::NUMBER), "any <: number");
    assert!(!is_subtype_of(&interner, TypeId::ANY, TypeId::NEVER), "any is not never");
    assert!(!is_subtype_of(&interner, TypeId::UNKNOWN, TypeId::STRING));
    assert!(!is_subtype_of(&interner, TypeId::STRING, TypeId::NEVER));
}

#[test]
fn test_error_marker_relates_only_to_itself() {
    let interner = TypeInterner::new();
    assert!(is_subtype_of(&interner, TypeId::ERROR, TypeId::ERROR));
    assert!(!is_subtype_of(&interner, TypeId::ERROR, TypeId::ANY));
    assert!(!is_subtype_of(&interner, TypeId::ANY, TypeId::ERROR));
    assert!(!is_subtype_of(&interner, TypeId::ERROR, TypeId::UNKNOWN));
}

#[test]
fn test_literals_widen_to_primitives() {
    let interner = TypeInterner::new();
    let hello = interner.literal_string("hello");
    let one = interner.literal_number(1.0);
    assert!(is_subtype_of(&interner, hello, TypeId::STRING));
    assert!(!is_subtype_of(&interner, hello, TypeId::NUMBER));
    assert!(is_subtype_of(&interner, one, TypeId::NUMBER));
    assert!(!is_subtype_of(&interner, TypeId::STRING, hello), "string is wider than \"hello\"");
    assert!(is_subtype_of(&interner, TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN));
    assert!(is_subtype_of(&interner, TypeId::UNDEFINED, TypeId::VOID));
}

#[test]
fn test_empty_object_accepts_non_nullish() {
    let interner = TypeInterner::new();
    let empty = interner.object(Vec::new());
    assert!(is_subtype_of(&interner, TypeId::STRING, empty));
    assert!(is_subtype_of(&interner, interner.array(TypeId::NUMBER), empty));
    assert!(!is_subtype_of(&interner, TypeId::NULL, empty));
    assert!(!is_subtype_of(&interner, TypeId::UNDEFINED, empty));
}

// =============================================================================
// Unions and intersections
// =============================================================================

#[test]
fn test_union_source_and_target() {
    let interner = TypeInterner::new();
    let str_or_num = interner.union2(TypeId::STRING, TypeId::NUMBER);
    assert!(is_subtype_of(&interner, TypeId::STRING, str_or_num));
    assert!(!is_subtype_of(&interner, str_or_num, TypeId::STRING));
    let a_or_b = interner.union2(interner.literal_string("a"), interner.literal_string("b"));
    assert!(is_subtype_of(&interner, a_or_b, str_or_num), "each member must be assignable");
}

#[test]
fn test_boolean_to_union_of_literals() {
    let interner = TypeInterner::new();
    let target = interner.union2(TypeId::BOOLEAN_TRUE, interner.union2(TypeId::BOOLEAN_FALSE, TypeId::STRING));
    assert!(is_subtype_of(&interner, TypeId::BOOLEAN, target));
    let only_true = interner.union2(TypeId::BOOLEAN_TRUE, TypeId::STRING);
    assert!(!is_subtype_of(&interner, TypeId::BOOLEAN, only_true));
}

#[test]
fn test_intersection_of_objects_merges() {
    // { a: string } & { b: number } <: { a: string; b: number }
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let left = interner.object(vec![PropertyInfo::new(a, TypeId::STRING)]);
    let right = interner.object(vec![PropertyInfo::new(b, TypeId::NUMBER)]);
    let both = interner.object(vec![
        PropertyInfo::new(a, TypeId::STRING),
        PropertyInfo::new(b, TypeId::NUMBER),
    ]);
    let intersection = interner.intersection2(left, right);
    assert!(is_subtype_of(&interner, intersection, both));
    assert!(is_subtype_of(&interner, both, intersection), "intersection target needs every member");
    assert!(!is_subtype_of(&interner, left, intersection));
}

#[test]
fn test_branded_string_relates_to_its_members() {
    // string & { __brand: "id" }
    let interner = TypeInterner::new();
    let brand = interner.object(vec![PropertyInfo::new(
        interner.intern_string("__brand"),
        interner.literal_string("id"),
    )]);
    let branded = interner.intersection2(TypeId::STRING, brand);
    assert!(is_subtype_of(&interner, branded, TypeId::STRING));
    assert!(is_subtype_of(&interner, branded, brand));
    assert!(!is_subtype_of(&interner, interner.literal_string("x"), branded));
    assert!(!is_subtype_of(&interner, branded, TypeId::NEVER));
}

// =============================================================================
// Objects, functions, arrays and tuples
// =============================================================================

#[test]
fn test_object_width_and_optional_properties() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let wide = interner.object(vec![
        PropertyInfo::new(a, TypeId::STRING),
        PropertyInfo::new(b, TypeId::NUMBER),
    ]);
    let narrow = interner.object(vec![PropertyInfo::new(a, TypeId::STRING)]);
    let optional_b = interner.object(vec![
        PropertyInfo::new(a, TypeId::STRING),
        PropertyInfo::optional(b, TypeId::NUMBER),
    ]);

    assert!(is_subtype_of(&interner, wide, narrow), "extra properties are allowed");
    assert!(!is_subtype_of(&interner, narrow, wide), "missing required property");
    assert!(is_subtype_of(&interner, narrow, optional_b), "missing optional property is fine");
    assert!(!is_subtype_of(&interner, optional_b, wide), "optional does not satisfy required");
}

#[test]
fn test_function_parameters_are_contravariant() {
    let interner = TypeInterner::new();
    let x = Some(interner.intern_string("x"));
    let hello = interner.literal_string("hello");
    let takes_string = interner.function(FunctionShape {
        params: vec![ParamInfo::required(x, TypeId::STRING)],
        return_type: TypeId::VOID,
    });
    let takes_hello = interner.function(FunctionShape {
        params: vec![ParamInfo::required(x, hello)],
        return_type: TypeId::VOID,
    });
    assert!(is_subtype_of(&interner, takes_string, takes_hello));
    assert!(!is_subtype_of(&interner, takes_hello, takes_string));

    let bivariant = SolverOptions {
        strict_function_types: false,
        ..SolverOptions::default()
    };
    let mut evaluator = TypeEvaluator::new(&interner).with_options(bivariant);
    assert!(
        SubtypeChecker::new(&mut evaluator).is_assignable(takes_hello, takes_string),
        "parameters are bivariant without strictFunctionTypes"
    );
}

#[test]
fn test_function_arity_and_return() {
    let interner = TypeInterner::new();
    let x = Some(interner.intern_string("x"));
    let y = Some(interner.intern_string("y"));
    let one_param = interner.function(FunctionShape {
        params: vec![ParamInfo::required(x, TypeId::STRING)],
        return_type: TypeId::NUMBER,
    });
    let two_params = interner.function(FunctionShape {
        params: vec![
            ParamInfo::required(x, TypeId::STRING),
            ParamInfo::required(y, TypeId::STRING),
        ],
        return_type: TypeId::NUMBER,
    });
    let returns_void = interner.function(FunctionShape {
        params: vec![ParamInfo::required(x, TypeId::STRING)],
        return_type: TypeId::VOID,
    });
    assert!(is_subtype_of(&interner, one_param, two_params), "fewer parameters are fine");
    assert!(!is_subtype_of(&interner, two_params, one_param));
    assert!(is_subtype_of(&interner, one_param, returns_void), "void return accepts anything");
    assert!(!is_subtype_of(&interner, returns_void, one_param));
}

#[test]
fn test_tuples_and_arrays() {
    let interner = TypeInterner::new();
    let pair = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement::required(TypeId::NUMBER),
    ]);
    let single = interner.tuple(vec![TupleElement::required(TypeId::STRING)]);
    let mixed_array = interner.array(interner.union2(TypeId::STRING, TypeId::NUMBER));

    assert!(is_subtype_of(&interner, pair, mixed_array));
    assert!(!is_subtype_of(&interner, mixed_array, pair), "arrays have no fixed length");
    assert!(!is_subtype_of(&interner, pair, single), "length must match");
    assert!(is_subtype_of(&interner, interner.array(TypeId::STRING), mixed_array));

    let rest = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement {
            type_id: interner.array(TypeId::NUMBER),
            name: None,
            optional: false,
            rest: true,
        },
    ]);
    assert!(is_subtype_of(&interner, pair, rest), "a rest element absorbs the tail");
    assert!(is_subtype_of(&interner, single, rest));
}

#[test]
fn test_recursive_interfaces_assume_related_on_cycle() {
    // interface A { next: A; v: string }  interface B { next: B; v: string }
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();
    let next = interner.intern_string("next");
    let v = interner.intern_string("v");
    let a_def = defs.register(DefinitionInfo::interface(interner.intern_string("A"), Vec::new(), TypeId::ERROR));
    let b_def = defs.register(DefinitionInfo::interface(interner.intern_string("B"), Vec::new(), TypeId::ERROR));
    defs.set_body(
        a_def,
        interner.object(vec![
            PropertyInfo::new(next, interner.lazy(a_def)),
            PropertyInfo::new(v, TypeId::STRING),
        ]),
    );
    defs.set_body(
        b_def,
        interner.object(vec![
            PropertyInfo::new(next, interner.lazy(b_def)),
            PropertyInfo::new(v, TypeId::STRING),
        ]),
    );
    let result = check_with_defs(&interner, &defs, interner.lazy(a_def), interner.lazy(b_def));
    assert_eq!(result, SubtypeResult::True);
}

// =============================================================================
// Alias variance
// =============================================================================

#[test]
fn test_conditional_use_makes_parameter_invariant() {
    // interface Covariant<T> { foo: T extends string ? T : number }
    // Covariant<"a"> is not assignable to Covariant<string> although the
    // expanded bodies would be.
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();
    let (t_name, t) = param(&interner, "T");
    let foo = interner.intern_string("foo");
    let body = interner.object(vec![PropertyInfo::new(
        foo,
        interner.declare_conditional(t, TypeId::STRING, t, TypeId::NUMBER),
    )]);
    let def = defs.register(DefinitionInfo::interface(
        interner.intern_string("Covariant"),
        vec![TypeParamInfo::unconstrained(t_name)],
        body,
    ));
    let lit = interner.application(interner.lazy(def), vec![interner.literal_string("a")]);
    let wide = interner.application(interner.lazy(def), vec![TypeId::STRING]);

    assert_eq!(check_with_defs(&interner, &defs, lit, wide), SubtypeResult::False);
    assert_eq!(check_with_defs(&interner, &defs, wide, lit), SubtypeResult::False);
    assert_eq!(check_with_defs(&interner, &defs, lit, lit), SubtypeResult::True);

    let mut evaluator = TypeEvaluator::with_resolver(&interner, &defs);
    let reason = SubtypeChecker::new(&mut evaluator).explain_failure(lit, wide);
    assert!(
        matches!(reason, Some(SubtypeFailureReason::AliasArgumentMismatch { param_index: 0, .. })),
        "got {reason:?}"
    );
}

#[test]
fn test_covariant_contravariant_and_independent_aliases() {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();
    let (t_name, t) = param(&interner, "T");
    let params = vec![TypeParamInfo::unconstrained(t_name)];
    let value = interner.intern_string("value");
    let x = Some(interner.intern_string("x"));

    // type Box<T> = { value: T }
    let box_def = defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Box"),
        params.clone(),
        interner.object(vec![PropertyInfo::new(value, t)]),
    ));
    // type Sink<T> = (x: T) => void
    let sink_def = defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Sink"),
        params.clone(),
        interner.function(FunctionShape {
            params: vec![ParamInfo::required(x, t)],
            return_type: TypeId::VOID,
        }),
    ));
    // type Ignore<T> = string
    let ignore_def = defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Ignore"),
        params,
        TypeId::STRING,
    ));

    let hello = interner.literal_string("hello");
    let app = |def, arg| interner.application(interner.lazy(def), vec![arg]);

    assert!(check_with_defs(&interner, &defs, app(box_def, hello), app(box_def, TypeId::STRING)).is_true());
    assert!(check_with_defs(&interner, &defs, app(box_def, TypeId::STRING), app(box_def, hello)).is_false());
    assert!(check_with_defs(&interner, &defs, app(sink_def, TypeId::STRING), app(sink_def, hello)).is_true());
    assert!(check_with_defs(&interner, &defs, app(sink_def, hello), app(sink_def, TypeId::STRING)).is_false());
    assert!(
        check_with_defs(&interner, &defs, app(ignore_def, TypeId::NUMBER), app(ignore_def, TypeId::STRING))
            .is_true(),
        "an unused parameter places no requirement"
    );
}

// =============================================================================
// Generic sources and targets
// =============================================================================

#[test]
fn test_unconstrained_parameter_is_unknown_not_false() {
    let interner = TypeInterner::new();
    let (_, t) = param(&interner, "T");
    assert_eq!(check(&interner, t, TypeId::STRING), SubtypeResult::Unknown);
    assert_eq!(check(&interner, t, t), SubtypeResult::True);
    assert_eq!(check(&interner, t, interner.union2(t, TypeId::STRING)), SubtypeResult::True);
}

#[test]
fn test_constrained_parameter_relates_through_constraint() {
    let interner = TypeInterner::new();
    let t_name = interner.intern_string("T");
    let str_or_num = interner.union2(TypeId::STRING, TypeId::NUMBER);
    let t = interner.type_param(TypeParamInfo::constrained(t_name, str_or_num));
    assert!(check(&interner, t, str_or_num).is_true(), "T extends string | number");
    assert!(check(&interner, t, TypeId::UNKNOWN).is_true());
    assert!(!check(&interner, t, TypeId::STRING).is_true());
}

#[test]
fn test_deferred_conditional_source_uses_constraint() {
    // (T extends string ? T : number) <: string | number
    let interner = TypeInterner::new();
    let (_, t) = param(&interner, "T");
    let cond = interner.declare_conditional(t, TypeId::STRING, t, TypeId::NUMBER);
    let str_or_num = interner.union2(TypeId::STRING, TypeId::NUMBER);
    assert!(check(&interner, cond, str_or_num).is_true());
    assert!(!check(&interner, cond, TypeId::STRING).is_true());
}

#[test]
fn test_deferred_conditional_to_conditional() {
    // Same check and extends: branches relate pairwise.
    let interner = TypeInterner::new();
    let (_, t) = param(&interner, "T");
    let narrow = interner.declare_conditional(t, TypeId::STRING, interner.literal_string("a"), TypeId::NUMBER);
    let wide = interner.declare_conditional(t, TypeId::STRING, TypeId::STRING, TypeId::NUMBER);
    assert!(check(&interner, narrow, wide).is_true());
    assert!(!check(&interner, wide, narrow).is_true());

    // Different distributivity never matches structurally.
    let non_dist = interner.conditional(ConditionalType {
        check_type: t,
        extends_type: TypeId::STRING,
        true_type: TypeId::STRING,
        false_type: TypeId::NUMBER,
        is_distributive: false,
    });
    assert!(!check(&interner, non_dist, narrow).is_true());
}

#[test]
fn test_source_assignable_to_both_branches_of_conditional_target() {
    // "x" <: (T extends number ? string : string)
    let interner = TypeInterner::new();
    let (_, t) = param(&interner, "T");
    let target = interner.declare_conditional(t, TypeId::NUMBER, TypeId::STRING, TypeId::STRING);
    assert!(check(&interner, interner.literal_string("x"), target).is_true());

    // Branches mentioning the check parameter depend on distribution.
    let dependent = interner.declare_conditional(t, TypeId::NUMBER, t, TypeId::STRING);
    assert!(!check(&interner, TypeId::STRING, dependent).is_true());
}

#[test]
fn test_explain_failure_reports_missing_property() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let target = interner.object(vec![PropertyInfo::new(a, TypeId::STRING)]);
    let source = interner.object(Vec::new());
    let mut evaluator = TypeEvaluator::new(&interner);
    let mut checker = SubtypeChecker::new(&mut evaluator);
    let reason = checker.explain_failure(source, target);
    assert!(
        matches!(reason, Some(SubtypeFailureReason::MissingProperty { property_name, .. }) if property_name == a),
        "got {reason:?}"
    );
    assert!(checker.explain_failure(target, source).is_none());
}

#[test]
fn test_subtype_depth_limit_gives_unknown() {
    // Deeply nested, distinct object pairs exhaust a tiny subtype depth.
    let interner = TypeInterner::new();
    let inner = interner.intern_string("inner");
    let mut source = TypeId::STRING;
    let mut target = TypeId::NUMBER;
    for _ in 0..10 {
        source = interner.object(vec![PropertyInfo::new(inner, source)]);
        target = interner.object(vec![PropertyInfo::new(inner, target)]);
    }
    let options = SolverOptions {
        max_subtype_depth: 3,
        ..SolverOptions::default()
    };
    let mut evaluator = TypeEvaluator::new(&interner).with_options(options);
    let mut checker = SubtypeChecker::new(&mut evaluator);
    assert_eq!(checker.check_subtype(source, target), SubtypeResult::Unknown);
    assert!(checker.is_exceeded());
}
