//! Concurrent memoization of alias instantiations.
//!
//! `ResolutionCache` maps `(alias, evaluated arguments)` to the resolved type,
//! together with the diagnostics its expansion reported, and is shared by every evaluator working on the same program, possibly
//! from several threads. Each key is computed at most once:
//!
//! - the first evaluator to reach a key claims it and leaves an in-flight
//!   marker carrying its owner id;
//! - another evaluator that meets the marker computes the value privately and
//!   does not publish (it never waits, so two claims on each other's keys
//!   cannot deadlock);
//! - the owner publishes on success; dropping an unpublished claim removes the
//!   marker, so an abandoned resolution leaves the cache as it found it.

use crate::def::DefId;
use crate::diagnostics::SolverDiagnostic;
use crate::types::TypeId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Identity of one alias instantiation: the alias and the interned
/// application of it to its evaluated arguments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub def_id: DefId,
    pub application: TypeId,
}

/// A finished expansion. A hit replays `diagnostics` so every query that
/// reaches the key reports the same failures as the one that computed it.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedResolution {
    pub type_id: TypeId,
    pub diagnostics: Arc<[SolverDiagnostic]>,
}

impl CachedResolution {
    pub fn new(type_id: TypeId, diagnostics: &[SolverDiagnostic]) -> Self {
        Self {
            type_id,
            diagnostics: Arc::from(diagnostics),
        }
    }
}

#[derive(Clone, Debug)]
enum Slot {
    InFlight { owner: u64 },
    Resolved(CachedResolution),
}

/// Outcome of [`ResolutionCache::claim`].
pub enum Claim<'c> {
    /// Already resolved.
    Hit(CachedResolution),
    /// The caller owns the key and should publish through the guard.
    Owned(ClaimGuard<'c>),
    /// Another evaluator is resolving this key.
    Contended,
}

/// Exclusive right to publish one key. Dropping it unpublished releases the
/// in-flight marker.
pub struct ClaimGuard<'c> {
    cache: &'c ResolutionCache,
    key: ResolutionKey,
    owner: u64,
    published: bool,
}

impl ClaimGuard<'_> {
    pub fn key(&self) -> ResolutionKey {
        self.key
    }

    pub fn publish(mut self, result: TypeId, diagnostics: &[SolverDiagnostic]) {
        self.cache.slots.insert(
            self.key,
            Slot::Resolved(CachedResolution::new(result, diagnostics)),
        );
        self.published = true;
        debug!(
            def_id = self.key.def_id.0,
            application = self.key.application.0,
            result = result.0,
            diagnostics = diagnostics.len(),
            "resolution cache: published"
        );
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if self.published {
            return;
        }
        let owner = self.owner;
        self.cache
            .slots
            .remove_if(&self.key, |_, slot| {
                matches!(slot, Slot::InFlight { owner: current } if *current == owner)
            });
        debug!(
            def_id = self.key.def_id.0,
            application = self.key.application.0,
            "resolution cache: claim released without result"
        );
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub contended: u64,
}

#[derive(Default)]
pub struct ResolutionCache {
    slots: DashMap<ResolutionKey, Slot>,
    hits: AtomicU64,
    misses: AtomicU64,
    contended: AtomicU64,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resolved key without claiming it.
    pub fn get(&self, key: &ResolutionKey) -> Option<TypeId> {
        match self.slots.get(key).as_deref() {
            Some(Slot::Resolved(resolved)) => Some(resolved.type_id),
            _ => None,
        }
    }

    pub fn claim(&self, key: ResolutionKey, owner: u64) -> Claim<'_> {
        match self.slots.entry(key) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Resolved(resolved) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Claim::Hit(resolved.clone())
                }
                Slot::InFlight { .. } => {
                    self.contended.fetch_add(1, Ordering::Relaxed);
                    Claim::Contended
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(Slot::InFlight { owner });
                self.misses.fetch_add(1, Ordering::Relaxed);
                Claim::Owned(ClaimGuard {
                    cache: self,
                    key,
                    owner,
                    published: false,
                })
            }
        }
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| matches!(entry.value(), Slot::Resolved(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_flight(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| matches!(entry.value(), Slot::InFlight { .. }))
            .count()
    }

    pub fn stats(&self) -> ResolutionCacheStats {
        ResolutionCacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            contended: self.contended.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.slots.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.contended.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[path = "../../tests/resolution_cache_tests.rs"]
mod tests;
