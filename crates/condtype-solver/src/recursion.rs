//! Bounded re-entrancy tracking for the evaluator and the subtype checker.
//!
//! A `RecursionGuard` answers one question per step: may the computation for
//! this key start? It refuses when the key is already on the active path (a
//! cycle), when the path is as long as the configured depth, or when the
//! total number of steps has run out. Depth and step limits come from
//! `SolverOptions`; hitting either one is remembered for the rest of the
//! query so callers can avoid caching truncated answers.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    /// The key is now active; pair with [`RecursionGuard::leave`].
    Entered,
    /// The key is already active further up the path.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        self == Self::Entered
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        self == Self::Cycle
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

pub struct RecursionGuard<K: Hash + Eq + Copy> {
    active: FxHashSet<K>,
    steps: u32,
    max_depth: u32,
    max_steps: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_steps: u32) -> Self {
        Self {
            active: FxHashSet::default(),
            steps: 0,
            max_depth,
            max_steps,
            exceeded: false,
        }
    }

    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.steps = self.steps.saturating_add(1);
        let result = if self.steps > self.max_steps {
            RecursionResult::IterationExceeded
        } else if self.active.contains(&key) {
            RecursionResult::Cycle
        } else if self.depth() >= self.max_depth {
            RecursionResult::DepthExceeded
        } else {
            self.active.insert(key);
            RecursionResult::Entered
        };
        self.exceeded |= result.is_exceeded();
        result
    }

    pub fn leave(&mut self, key: K) {
        let removed = self.active.remove(&key);
        debug_assert!(removed, "RecursionGuard::leave without a matching enter");
    }

    #[inline]
    pub fn is_active(&self, key: &K) -> bool {
        self.active.contains(key)
    }

    /// Length of the active path.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.active.len() as u32
    }

    #[inline]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Set by the first refused `enter` due to a limit; never cleared.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.active.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries",
                self.active.len()
            );
        }
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
