use super::*;
use crate::diagnostics::SolverDiagnostic;
use rayon::prelude::*;
use std::sync::atomic::AtomicUsize;

fn key(def: u32, app: u32) -> ResolutionKey {
    ResolutionKey {
        def_id: DefId(def),
        application: TypeId(app),
    }
}

#[test]
fn test_claim_then_publish_then_hit() {
    let cache = ResolutionCache::new();
    let k = key(1, 100);

    match cache.claim(k, 1) {
        Claim::Owned(guard) => {
            assert_eq!(guard.key(), k);
            guard.publish(TypeId::STRING, &[]);
        }
        _ => panic!("first claim should own the key"),
    }
    assert_eq!(cache.get(&k), Some(TypeId::STRING));
    assert!(matches!(cache.claim(k, 2), Claim::Hit(hit) if hit.type_id == TypeId::STRING));

    let stats = cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_hit_carries_published_diagnostics() {
    let cache = ResolutionCache::new();
    let k = key(2, 40);
    let reported = vec![SolverDiagnostic::recursion_limit()];
    if let Claim::Owned(guard) = cache.claim(k, 1) {
        guard.publish(TypeId::UNKNOWN, &reported);
    }

    for owner in [2, 3] {
        let Claim::Hit(hit) = cache.claim(k, owner) else {
            panic!("published key should hit");
        };
        assert_eq!(hit.type_id, TypeId::UNKNOWN);
        assert_eq!(&*hit.diagnostics, reported.as_slice());
    }
}

#[test]
fn test_in_flight_key_is_contended() {
    let cache = ResolutionCache::new();
    let k = key(1, 100);
    let Claim::Owned(guard) = cache.claim(k, 1) else {
        panic!("first claim should own the key");
    };
    assert_eq!(cache.in_flight(), 1);
    assert!(matches!(cache.claim(k, 2), Claim::Contended));
    assert_eq!(cache.get(&k), None, "in-flight keys have no value yet");
    guard.publish(TypeId::NUMBER, &[]);
    assert_eq!(cache.in_flight(), 0);
    assert_eq!(cache.stats().contended, 1);
}

#[test]
fn test_dropped_claim_releases_marker() {
    let cache = ResolutionCache::new();
    let k = key(3, 7);
    {
        let claim = cache.claim(k, 9);
        assert!(matches!(claim, Claim::Owned(_)));
    }
    assert_eq!(cache.in_flight(), 0, "abandoned claim leaves nothing behind");
    assert!(cache.is_empty());
    assert!(
        matches!(cache.claim(k, 10), Claim::Owned(_)),
        "the key can be claimed again"
    );
}

#[test]
fn test_clear_resets_entries_and_counters() {
    let cache = ResolutionCache::new();
    if let Claim::Owned(guard) = cache.claim(key(1, 1), 1) {
        guard.publish(TypeId::ANY, &[]);
    }
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats(), ResolutionCacheStats::default());
}

#[test]
fn test_concurrent_claims_compute_at_most_once() {
    let cache = ResolutionCache::new();
    let computed = AtomicUsize::new(0);
    let keys: Vec<ResolutionKey> = (0..32).map(|i| key(1, 1000 + i)).collect();

    (0..8u64).into_par_iter().for_each(|owner| {
        for &k in &keys {
            match cache.claim(k, owner) {
                Claim::Owned(guard) => {
                    computed.fetch_add(1, Ordering::SeqCst);
                    guard.publish(TypeId(k.application.0 + 1), &[]);
                }
                Claim::Hit(hit) => {
                    assert_eq!(hit.type_id, TypeId(k.application.0 + 1), "published value is stable");
                }
                Claim::Contended => {}
            }
        }
    });

    assert_eq!(computed.load(Ordering::SeqCst), keys.len(), "each key is published once");
    assert_eq!(cache.len(), keys.len());
    assert_eq!(cache.in_flight(), 0);
}
