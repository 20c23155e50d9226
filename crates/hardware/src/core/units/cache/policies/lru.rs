//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the way that has not been hit or filled for the longest
//! time. It maintains a usage stack for each set. When a way is accessed, it is
//! moved to the top (Most Recently Used position). The bottom of the stack is
//! the victim.
//!
//! A fresh set's stack is ordered so that way 0 sits at the bottom, then way 1,
//! and so on: an untouched set fills its ways in index order.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `update()`: O(W) where W is the number of ways (associativity)
//!   - `get_victim()`: O(1)
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Hardware Cost:** High - requires priority encoding and shifting

use super::ReplacementPolicy;

/// LRU Policy state.
#[derive(Debug, Clone)]
pub struct LruPolicy {
    /// A vector of usage stacks (one per set).
    /// Index 0 is MRU, last index is LRU.
    usage: Vec<Vec<usize>>,
    ways: usize,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        let usage = (0..sets).map(|_| Self::initial_stack(ways)).collect();
        Self { usage, ways }
    }

    fn initial_stack(ways: usize) -> Vec<usize> {
        (0..ways).rev().collect()
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Moves the accessed `way` to the front of the usage stack (MRU position).
    fn update(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&x| x == way) {
            let _ = stack.remove(pos);
        }
        stack.insert(0, way);
    }

    /// Returns the way at the bottom of the usage stack (LRU position).
    fn get_victim(&self, set: usize) -> usize {
        self.usage[set].last().copied().unwrap_or(0)
    }

    fn reset(&mut self) {
        for stack in &mut self.usage {
            *stack = Self::initial_stack(self.ways);
        }
    }
}
