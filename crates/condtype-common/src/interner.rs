//! Name interning.
//!
//! Type parameter names, property names and string literal values are stored
//! once and referred to by [`Atom`]. Substitution environments are keyed by
//! atom, so two parameters with the same spelling are the same parameter.

use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// Handle to an interned string. The low bits select the shard that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    fn shard(self) -> usize {
        (self.0 & SLOT_MASK) as usize
    }

    #[inline]
    fn slot(self) -> usize {
        (self.0 >> SLOT_SHIFT) as usize
    }
}

const SLOT_SHIFT: u32 = 6;
const SHARDS: usize = 1 << SLOT_SHIFT;
const SLOT_MASK: u32 = SHARDS as u32 - 1;

/// Seeded by [`ShardedInterner::intern_common`].
const PRELUDE: &[&str] = &[
    "T",
    "U",
    "V",
    "K",
    "P",
    "Q",
    "E",
    "A",
    "B",
    "R",
    "Extract",
    "Exclude",
    "Function",
    "length",
    "prototype",
    "constructor",
    "name",
    "value",
];

#[derive(Default)]
struct Pool {
    by_text: FxHashMap<Arc<str>, Atom>,
    texts: Vec<Arc<str>>,
}

impl Pool {
    fn insert(&mut self, text: &str, shard: usize) -> Atom {
        let slot = self.texts.len() as u32;
        if slot > u32::MAX >> SLOT_SHIFT {
            return Atom::NONE;
        }
        let atom = Atom((slot << SLOT_SHIFT) | shard as u32);
        let text: Arc<str> = Arc::from(text);
        self.texts.push(Arc::clone(&text));
        self.by_text.insert(text, atom);
        atom
    }
}

/// Thread-safe interner split into independently locked pools.
pub struct ShardedInterner {
    pools: [RwLock<Pool>; SHARDS],
}

impl ShardedInterner {
    pub fn new() -> Self {
        let pools: [RwLock<Pool>; SHARDS] = std::array::from_fn(|_| RwLock::default());
        // Slot 0 of pool 0 is `Atom::NONE`.
        pools[0]
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert("", 0);
        Self { pools }
    }

    pub fn intern(&self, text: &str) -> Atom {
        if text.is_empty() {
            return Atom::NONE;
        }
        let shard = pool_of(text);
        let pool = &self.pools[shard];
        if let Some(&atom) = pool.read().unwrap_or_else(|e| e.into_inner()).by_text.get(text) {
            return atom;
        }
        let mut pool = pool.write().unwrap_or_else(|e| e.into_inner());
        match pool.by_text.get(text) {
            Some(&atom) => atom,
            None => pool.insert(text, shard),
        }
    }

    /// Unknown atoms resolve to the empty string.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let pool = self.pools.get(atom.shard())?;
        pool.read()
            .unwrap_or_else(|e| e.into_inner())
            .texts
            .get(atom.slot())
            .cloned()
    }

    /// Number of interned strings, counting the empty string.
    pub fn len(&self) -> usize {
        self.pools
            .iter()
            .map(|pool| pool.read().unwrap_or_else(|e| e.into_inner()).texts.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    pub fn intern_common(&self) {
        PRELUDE.iter().for_each(|name| {
            self.intern(name);
        });
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

fn pool_of(text: &str) -> usize {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish() as usize & (SHARDS - 1)
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
