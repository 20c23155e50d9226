//! Cache Replacement Policy Tests.
//!
//! Verifies victim selection for LRU, PLRU, and FIFO in isolation, then the
//! `Replacement` front end that prefers invalid ways.

use icache_core::config::ReplacementPolicy as PolicyType;
use icache_core::core::units::cache::WayMask;
use icache_core::core::units::cache::policies::{
    FifoPolicy, LruPolicy, PlruPolicy, Replacement, ReplacementPolicy,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. LRU Policy
// ══════════════════════════════════════════════════════════

/// An untouched set evicts way 0 first.
#[test]
fn lru_initial_victim_is_way_zero() {
    let policy = LruPolicy::new(1, 4);
    assert_eq!(policy.get_victim(0), 0);
}

/// Accessing ways in order 0,1,2,3 makes 0 the LRU.
#[test]
fn lru_sequential_access_reorders() {
    let mut policy = LruPolicy::new(1, 4);
    for way in 0..4 {
        policy.update(0, way);
    }
    assert_eq!(policy.get_victim(0), 0);
}

/// Access 0,1,2,3 then re-access 0 → LRU becomes 1.
#[test]
fn lru_evicts_true_lru_after_reaccess() {
    let mut policy = LruPolicy::new(1, 4);
    for way in 0..4 {
        policy.update(0, way);
    }
    policy.update(0, 0);
    assert_eq!(policy.get_victim(0), 1);
    policy.update(0, 1);
    assert_eq!(policy.get_victim(0), 2);
}

#[test]
fn lru_sets_are_independent() {
    let mut policy = LruPolicy::new(2, 2);
    policy.update(0, 0);
    assert_eq!(policy.get_victim(0), 1);
    assert_eq!(policy.get_victim(1), 0);
}

#[test]
fn lru_reset_restores_power_on_order() {
    let mut policy = LruPolicy::new(1, 4);
    policy.update(0, 0);
    policy.update(0, 1);
    policy.reset();
    assert_eq!(policy.get_victim(0), 0);
}

#[test]
fn lru_direct_mapped_always_way_zero() {
    let mut policy = LruPolicy::new(4, 1);
    policy.update(2, 0);
    assert_eq!(policy.get_victim(2), 0);
}

// ══════════════════════════════════════════════════════════
// 2. PLRU Policy
// ══════════════════════════════════════════════════════════

#[test]
fn plru_victim_is_lowest_clear_bit() {
    let mut policy = PlruPolicy::new(1, 4);
    assert_eq!(policy.get_victim(0), 0);
    policy.update(0, 0);
    assert_eq!(policy.get_victim(0), 1);
    policy.update(0, 1);
    policy.update(0, 2);
    assert_eq!(policy.get_victim(0), 3);
}

/// Setting the last bit clears the others; the newest way stays protected.
#[test]
fn plru_epoch_restarts_when_all_bits_set() {
    let mut policy = PlruPolicy::new(1, 4);
    for way in 0..4 {
        policy.update(0, way);
    }
    assert_eq!(policy.get_victim(0), 0);
    policy.update(0, 0);
    assert_eq!(policy.get_victim(0), 1);
}

#[test]
fn plru_supports_sixty_four_ways() {
    let mut policy = PlruPolicy::new(1, 64);
    for way in 0..63 {
        policy.update(0, way);
    }
    assert_eq!(policy.get_victim(0), 63);
    policy.update(0, 63);
    assert_eq!(policy.get_victim(0), 0);
}

// ══════════════════════════════════════════════════════════
// 3. FIFO Policy
// ══════════════════════════════════════════════════════════

#[test]
fn fifo_round_robin_on_fills() {
    let mut policy = FifoPolicy::new(1, 3);
    let mut order = Vec::new();
    for _ in 0..5 {
        let victim = policy.get_victim(0);
        order.push(victim);
        policy.fill(0, victim);
    }
    assert_eq!(order, vec![0, 1, 2, 0, 1]);
}

#[test]
fn fifo_hits_do_not_move_pointer() {
    let mut policy = FifoPolicy::new(1, 4);
    policy.fill(0, 0);
    policy.update(0, 1);
    policy.update(0, 3);
    assert_eq!(policy.get_victim(0), 1);
}

#[test]
fn fifo_fill_elsewhere_keeps_pointer() {
    let mut policy = FifoPolicy::new(1, 4);
    policy.fill(0, 2);
    assert_eq!(policy.get_victim(0), 0);
}

// ══════════════════════════════════════════════════════════
// 4. Replacement front end
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(PolicyType::Lru)]
#[case(PolicyType::Plru)]
#[case(PolicyType::Fifo)]
fn invalid_ways_are_filled_first(#[case] kind: PolicyType) {
    let replacement = Replacement::new(kind, 1, 4);
    let valid = WayMask::NONE.with(0).with(1);
    assert_eq!(replacement.victim(0, valid), WayMask::one_hot(2));
}

#[rstest]
#[case(PolicyType::Lru)]
#[case(PolicyType::Plru)]
#[case(PolicyType::Fifo)]
fn victim_is_one_hot(#[case] kind: PolicyType) {
    let mut replacement = Replacement::new(kind, 2, 4);
    let full = WayMask::from_bits(0b1111);
    for way in [3, 1, 2, 0, 1] {
        replacement.commit(1, way);
        let victim = replacement.victim(1, full);
        assert!(victim.is_one_hot());
        assert!(victim.first().unwrap() < 4);
    }
}

#[test]
fn lru_full_set_evicts_least_recently_touched() {
    let mut replacement = Replacement::new(PolicyType::Lru, 1, 4);
    for way in 0..4 {
        replacement.commit(0, way);
    }
    replacement.touch(0, 0);
    assert_eq!(
        replacement.victim(0, WayMask::from_bits(0b1111)),
        WayMask::one_hot(1)
    );
}

#[rstest]
#[case(PolicyType::Lru)]
#[case(PolicyType::Plru)]
#[case(PolicyType::Fifo)]
fn same_history_same_victims(#[case] kind: PolicyType) {
    let history = [(0, 1), (0, 3), (1, 0), (0, 1), (0, 2), (1, 3)];
    let run = || {
        let mut replacement = Replacement::new(kind, 2, 4);
        history
            .iter()
            .map(|&(set, way)| {
                replacement.commit(set, way);
                replacement.victim(set, WayMask::from_bits(0b1111))
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn reset_clears_recency() {
    let mut replacement = Replacement::new(PolicyType::Lru, 1, 2);
    replacement.commit(0, 0);
    assert_eq!(replacement.victim(0, WayMask::from_bits(0b11)), WayMask::one_hot(1));
    replacement.reset();
    assert_eq!(replacement.victim(0, WayMask::from_bits(0b11)), WayMask::one_hot(0));
}
