//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! Evicts the oldest line in a set regardless of how recently it was hit: a
//! round-robin pointer per set. Hits never move the pointer; it only advances
//! when the way it points at is filled.
//!
//! # Performance
//!
//! - **Time Complexity:** O(1) for both operations
//! - **Space Complexity:** O(S) where S is the number of sets
//! - **Hardware Cost:** Minimal - single counter per set

use super::ReplacementPolicy;

/// FIFO Policy state.
#[derive(Debug, Clone)]
pub struct FifoPolicy {
    /// Tracks the next way to be evicted for each set.
    next_way: Vec<usize>,
    /// Number of ways in the cache.
    ways: usize,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_way: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    /// Hits carry no ordering information.
    fn update(&mut self, _set: usize, _way: usize) {}

    /// Advances the pointer when the way it designates is filled.
    fn fill(&mut self, set: usize, way: usize) {
        if self.next_way[set] == way {
            self.next_way[set] = (self.next_way[set] + 1) % self.ways;
        }
    }

    /// Returns the current round-robin pointer for the specified set.
    fn get_victim(&self, set: usize) -> usize {
        self.next_way[set]
    }

    fn reset(&mut self) {
        self.next_way.fill(0);
    }
}
