//! Cache Replacement Policies.
//!
//! Implements victim selection for the instruction cache. Every policy is
//! deterministic and breaks ties toward way 0, so a replayed access sequence
//! reproduces the same victims.
//!
//! # Policies
//!
//! - `Lru`: True Least Recently Used.
//! - `Plru`: Bit pseudo-LRU (one MRU bit per way).
//! - `Fifo`: Round-robin in fill order.

/// First-In, First-Out (round-robin) replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

/// Bit pseudo-LRU replacement policy.
pub mod plru;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use plru::PlruPolicy;

use super::datapath::WayMask;
use crate::config::ReplacementPolicy as PolicyType;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage state and selecting victim lines.
pub trait ReplacementPolicy: Send + Sync + std::fmt::Debug {
    /// Updates the policy state when a way is hit or filled.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was accessed.
    fn update(&mut self, set: usize, way: usize);

    /// Updates the policy state when a line is committed into `way`.
    ///
    /// Defaults to [`ReplacementPolicy::update`]; policies that only track fill
    /// order override it.
    fn fill(&mut self, set: usize, way: usize) {
        self.update(set, way);
    }

    /// Selects the way to evict from `set`.
    fn get_victim(&self, set: usize) -> usize;

    /// Returns every set to its power-on order.
    fn reset(&mut self);
}

/// Victim selection in front of a boxed policy.
///
/// Produces the one-hot `victimWay` signal and applies the `policyUpdate`
/// pulse. Invalid ways are preferred over the policy's choice, lowest first.
#[derive(Debug)]
pub struct Replacement {
    policy: Box<dyn ReplacementPolicy>,
    ways: usize,
}

impl Replacement {
    /// Builds the configured policy for a `sets` × `ways` cache.
    pub fn new(kind: PolicyType, sets: usize, ways: usize) -> Self {
        let policy: Box<dyn ReplacementPolicy> = match kind {
            PolicyType::Lru => Box::new(LruPolicy::new(sets, ways)),
            PolicyType::Plru => Box::new(PlruPolicy::new(sets, ways)),
            PolicyType::Fifo => Box::new(FifoPolicy::new(sets, ways)),
        };
        Self { policy, ways }
    }

    /// One-hot victim for `set` given its current valid bits.
    pub fn victim(&self, set: usize, valid: WayMask) -> WayMask {
        let way = valid
            .first_clear(self.ways)
            .unwrap_or_else(|| self.policy.get_victim(set));
        WayMask::one_hot(way)
    }

    /// Records a hit on `way` of `set`.
    pub fn touch(&mut self, set: usize, way: usize) {
        self.policy.update(set, way);
    }

    /// Records a fill commit into `way` of `set`.
    pub fn commit(&mut self, set: usize, way: usize) {
        self.policy.fill(set, way);
    }

    /// Clears all recency state.
    pub fn reset(&mut self) {
        self.policy.reset();
    }
}
