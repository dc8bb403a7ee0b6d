use super::*;
use crate::intern::TypeInterner;
use crate::types::{PropertyInfo, TypeData};

#[test]
fn test_register_and_read_back() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    assert!(store.is_empty());

    let t_name = interner.intern_string("T");
    let body = interner.array(interner.type_param(TypeParamInfo::unconstrained(t_name)));
    let id = store.register(DefinitionInfo::type_alias(
        interner.intern_string("List"),
        vec![TypeParamInfo::unconstrained(t_name)],
        body,
    ));

    assert!(id.is_valid());
    assert!(store.contains(id));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get_kind(id), Some(DefKind::TypeAlias));
    assert_eq!(store.get_body(id), Some(body));
    assert_eq!(store.get_name(id), Some(interner.intern_string("List")));
    assert_eq!(store.get_type_params(id).map(|p| p.len()), Some(1));
    assert_eq!(store.resolve_lazy(id, &interner), Some(body));
    assert!(!DefId::INVALID.is_valid());
}

#[test]
fn test_ids_are_distinct() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let name = interner.intern_string("I");
    let first = store.register(DefinitionInfo::interface(name, vec![], TypeId::OBJECT));
    let second = store.register(DefinitionInfo::interface(name, vec![], TypeId::OBJECT));
    assert_ne!(first, second, "same name, separate declarations");
    assert_eq!(store.get_kind(first), Some(DefKind::Interface));
}

#[test]
fn test_set_body_patches_self_reference_and_drops_variance() {
    // interface Node { next: Node }
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let id = store.register(DefinitionInfo::interface(
        interner.intern_string("Node"),
        vec![],
        TypeId::ERROR,
    ));
    store.store_variance(id, Arc::from(vec![Variance::COVARIANT]));
    let body = interner.object(vec![PropertyInfo::new(
        interner.intern_string("next"),
        interner.lazy(id),
    )]);
    store.set_body(id, body);
    assert_eq!(store.get_body(id), Some(body));
    assert!(store.get_variance(id).is_none(), "variance of the old body is stale");
}

#[test]
fn test_lib_aliases() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let lib = store.register_lib_aliases(&interner);
    assert_eq!(store.len(), 2);
    assert_eq!(
        store.get_name(lib.extract).map(|a| interner.resolve_atom(a)),
        Some("Extract".to_string())
    );
    let Some(body) = store.get_body(lib.exclude) else {
        panic!("Exclude has a body");
    };
    let Some(TypeData::Conditional(cond)) = interner.lookup(body) else {
        panic!("Exclude is a conditional");
    };
    let cond = interner.conditional_type(cond);
    assert!(cond.is_distributive);
    assert_eq!(cond.true_type, TypeId::NEVER);
}

#[test]
fn test_clear_resets_ids() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let name = interner.intern_string("A");
    let first = store.register(DefinitionInfo::type_alias(name, vec![], TypeId::STRING));
    store.clear();
    assert!(store.is_empty());
    assert!(store.get(first).is_none());
    let again = store.register(DefinitionInfo::type_alias(name, vec![], TypeId::STRING));
    assert_eq!(first, again);
}

#[test]
fn test_noop_resolver() {
    let interner = TypeInterner::new();
    assert!(NoopResolver.resolve_lazy(DefId(1), &interner).is_none());
    assert!(NoopResolver.get_def_name(DefId(1)).is_none());
}
