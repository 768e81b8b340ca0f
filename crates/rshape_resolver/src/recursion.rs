//! Cycle detection and depth limiting for recursive evaluation.

use std::hash::Hash;

use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecursionResult {
    Entered,
    /// The key is already being evaluated further up the stack.
    Cycle,
    DepthExceeded,
}

/// Tracks which keys are on the current evaluation stack.
///
/// Every successful `enter` must be paired with a `leave` of the same key.
#[derive(Debug)]
pub(crate) struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    max_depth: u32,
    /// Number of cycles hit since creation. Results computed while a cycle
    /// was cut short are incomplete and must not be memoized.
    cycles: u32,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub(crate) fn new(max_depth: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            max_depth,
            cycles: 0,
        }
    }

    pub(crate) fn enter(&mut self, key: K) -> RecursionResult {
        if self.depth >= self.max_depth {
            return RecursionResult::DepthExceeded;
        }
        if !self.visiting.insert(key) {
            self.cycles += 1;
            return RecursionResult::Cycle;
        }
        self.depth += 1;
        RecursionResult::Entered
    }

    pub(crate) fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(was_present, "RecursionGuard::leave() without a matching enter()");
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn cycles(&self) -> u32 {
        self.cycles
    }

    pub(crate) fn clear(&mut self) {
        self.visiting.clear();
        self.depth = 0;
    }
}
