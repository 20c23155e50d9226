//! Bit Pseudo-LRU (PLRU) Replacement Policy.
//!
//! Approximates LRU with one MRU bit per way. An access sets the way's bit;
//! when every bit would be set, all others are cleared so the most recent way
//! stays protected. The victim is the lowest way whose bit is clear.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `update()`: O(1)
//!   - `get_victim()`: O(W)
//! - **Space Complexity:** W bits per set
//! - **Hardware Cost:** Low - simple bit operations
//! - **Worst Case:** Pathological cases can cause premature eviction of useful lines

use super::ReplacementPolicy;

/// PLRU Policy state.
#[derive(Debug, Clone)]
pub struct PlruPolicy {
    /// MRU bits for each set.
    usage: Vec<u64>,
    /// Number of ways in the cache.
    ways: usize,
}

impl PlruPolicy {
    /// Creates a new PLRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: vec![0; sets],
            ways,
        }
    }

    const fn all_ones(&self) -> u64 {
        if self.ways >= 64 {
            u64::MAX
        } else {
            (1 << self.ways) - 1
        }
    }
}

impl ReplacementPolicy for PlruPolicy {
    /// Sets the MRU bit of `way`, restarting the epoch once all bits are set.
    fn update(&mut self, set: usize, way: usize) {
        let mask = 1 << way;
        let all_ones = self.all_ones();
        self.usage[set] |= mask;
        if (self.usage[set] & all_ones) == all_ones {
            self.usage[set] = mask;
        }
    }

    /// Lowest way whose MRU bit is clear.
    fn get_victim(&self, set: usize) -> usize {
        (0..self.ways)
            .find(|i| (self.usage[set] >> i) & 1 == 0)
            .unwrap_or(0)
    }

    fn reset(&mut self) {
        self.usage.fill(0);
    }
}
