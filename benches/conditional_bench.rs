//! Conditional type resolution benchmarks.
//!
//! Measures distribution over growing unions, the alias cache hit path, and
//! assignability between alias instantiations.

use condtype::{
    DefId, DefinitionInfo, DefinitionStore, PropertyInfo, QueryCache, TypeId, TypeInterner,
    TypeParamInfo,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// `type IsNumber<T> = T extends number ? "n" : "s"`
fn register_is_number(interner: &TypeInterner, defs: &DefinitionStore) -> DefId {
    let t_name = interner.intern_string("T");
    let t = interner.type_param(TypeParamInfo::unconstrained(t_name));
    let body = interner.declare_conditional(
        t,
        TypeId::NUMBER,
        interner.literal_string("n"),
        interner.literal_string("s"),
    );
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("IsNumber"),
        vec![TypeParamInfo::unconstrained(t_name)],
        body,
    ))
}

/// A union of `n` alternating string and number literals.
fn literal_union(interner: &TypeInterner, n: usize) -> TypeId {
    let members = (0..n)
        .map(|i| {
            if i % 2 == 0 {
                interner.literal_string(&format!("k{i}"))
            } else {
                interner.literal_number(i as f64)
            }
        })
        .collect();
    interner.union(members)
}

fn bench_distribution(c: &mut Criterion) {
    let mut group = c.benchmark_group("distribution");
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();
    let is_number = register_is_number(&interner, &defs);

    for &n in &[2usize, 16, 128, 1024] {
        let applied = interner.application(interner.lazy(is_number), vec![literal_union(&interner, n)]);
        group.bench_with_input(BenchmarkId::new("cold", n), &applied, |b, &applied| {
            b.iter(|| {
                let db = QueryCache::new(&interner, &defs);
                black_box(db.evaluate_type(applied))
            })
        });
    }

    group.finish();
}

fn bench_cache_hit(c: &mut Criterion) {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();
    let is_number = register_is_number(&interner, &defs);
    let applied = interner.application(interner.lazy(is_number), vec![literal_union(&interner, 128)]);
    let db = QueryCache::new(&interner, &defs);
    db.evaluate_type(applied);

    c.bench_function("alias_cache_hit", |b| {
        b.iter(|| black_box(db.evaluate_type(black_box(applied))))
    });
}

fn bench_alias_assignability(c: &mut Criterion) {
    // interface Box<T> { value: T extends string ? T : number }
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();
    let t_name = interner.intern_string("T");
    let t = interner.type_param(TypeParamInfo::unconstrained(t_name));
    let body = interner.object(vec![PropertyInfo::new(
        interner.intern_string("value"),
        interner.declare_conditional(t, TypeId::STRING, t, TypeId::NUMBER),
    )]);
    let boxed = defs.register(DefinitionInfo::interface(
        interner.intern_string("Box"),
        vec![TypeParamInfo::unconstrained(t_name)],
        body,
    ));
    let narrow = interner.application(interner.lazy(boxed), vec![interner.literal_string("a")]);
    let wide = interner.application(interner.lazy(boxed), vec![TypeId::STRING]);

    c.bench_function("alias_assignability_uncached", |b| {
        b.iter(|| {
            let db = QueryCache::new(&interner, &defs);
            black_box(db.is_assignable(narrow, wide))
        })
    });
}

criterion_group!(
    conditional_benches,
    bench_distribution,
    bench_cache_hit,
    bench_alias_assignability
);
criterion_main!(conditional_benches);
