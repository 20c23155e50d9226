//! Property-based tests for the cache as a whole.
//!
//! Random geometries, policies, latencies, fetch sequences and control events;
//! every delivered word must match backing memory, no set may ever hold a tag
//! twice, and identical inputs must give identical runs.

use icache_core::config::{CacheConfig, Config, FillConfig, GeneralConfig, MemoryConfig, ReplacementPolicy};
use icache_core::core::pipeline::signals::{FetchRequest, SystemControl};
use icache_core::core::units::cache::{FetchController, InstructionWindow};
use icache_core::sim::{FetchStream, SimEvent, Simulator};
use icache_core::soc::Memory;
use proptest::prelude::*;

use crate::common::harness::CacheHarness;
use crate::common::patterned_memory;

const MEMORY_BYTES: usize = 8 * 1024;

fn policy() -> impl Strategy<Value = ReplacementPolicy> {
    prop_oneof![
        Just(ReplacementPolicy::Lru),
        Just(ReplacementPolicy::Plru),
        Just(ReplacementPolicy::Fifo),
    ]
}

fn cache_config() -> impl Strategy<Value = CacheConfig> {
    (0u32..5, 1usize..=4, 2u32..6, policy()).prop_map(|(set_bits, ways, line_bits, policy)| {
        CacheConfig {
            sets: 1 << set_bits,
            ways,
            line_bytes: 1 << line_bits,
            policy,
        }
    })
}

/// Halfword-aligned fetch addresses in the first 4 KiB, biased toward runs.
fn fetch_addrs() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec((0u64..2048, 1usize..6), 1..24).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(start, len)| (0..len as u64).map(move |i| (start * 2 + i * 4) % 4096))
            .collect()
    })
}

fn events() -> impl Strategy<Value = Vec<(u64, SimEvent)>> {
    let event = prop_oneof![
        Just(SimEvent::Flush { redirect: None }),
        Just(SimEvent::InvalidateAll),
        (1u64..4).prop_map(|cycles| SimEvent::Busy { cycles }),
    ];
    prop::collection::vec((0u64..600, event), 0..12)
}

fn config(cache: CacheConfig, latency: u64) -> Config {
    Config {
        general: GeneralConfig {
            trace_fetches: false,
            max_cycles: 200_000,
        },
        cache,
        fill: FillConfig {
            latency,
            ..FillConfig::default()
        },
        memory: MemoryConfig {
            base: 0,
            size: MEMORY_BYTES,
        },
    }
}

fn expected(memory: &Memory, pc: u64, line_bytes: u64) -> InstructionWindow {
    let lower = memory.read_u16(pc).unwrap();
    let upper_valid = pc % line_bytes + 2 < line_bytes;
    let upper = if upper_valid {
        memory.read_u16(pc + 2).unwrap()
    } else {
        0
    };
    InstructionWindow {
        bits: u32::from(lower) | (u32::from(upper) << 16),
        upper_valid,
    }
}

fn run(
    cache: &CacheConfig,
    latency: u64,
    addrs: &[u64],
    schedule: &[(u64, SimEvent)],
) -> Simulator {
    let memory = patterned_memory(0, MEMORY_BYTES);
    let mut sim = Simulator::new(
        &config(cache.clone(), latency),
        memory,
        FetchStream::from_addrs(addrs.iter().copied()),
    )
    .unwrap();
    for &(cycle, event) in schedule {
        sim.schedule(cycle, event);
    }
    sim.run().unwrap();
    sim
}

fn assert_no_duplicate_tags(ctrl: &FetchController) -> Result<(), TestCaseError> {
    let store = ctrl.line_store();
    for set in 0..store.sets() {
        let mut tags: Vec<u64> = store.read(set).filter(|v| v.valid).map(|v| v.tag).collect();
        let before = tags.len();
        tags.sort_unstable();
        tags.dedup();
        prop_assert_eq!(tags.len(), before, "set {} holds a tag twice", set);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every delivered window equals memory at its address.
    #[test]
    fn delivered_words_match_memory(
        cache in cache_config(),
        latency in 0u64..6,
        addrs in fetch_addrs(),
    ) {
        let sim = run(&cache, latency, &addrs, &[]);
        let memory = patterned_memory(0, MEMORY_BYTES);
        prop_assert!(sim.is_done());
        prop_assert_eq!(sim.records().len(), addrs.len());
        for (record, &pc) in sim.records().iter().zip(&addrs) {
            prop_assert_eq!(record.pc.val(), pc);
            prop_assert_eq!(record.window, expected(&memory, pc, cache.line_bytes as u64));
        }
        assert_no_duplicate_tags(sim.controller())?;
    }

    /// Flushes, invalidations and busy cycles never corrupt delivered data or
    /// lose a fetch.
    #[test]
    fn control_events_preserve_correctness(
        cache in cache_config(),
        latency in 0u64..6,
        addrs in fetch_addrs(),
        schedule in events(),
    ) {
        let sim = run(&cache, latency, &addrs, &schedule);
        let memory = patterned_memory(0, MEMORY_BYTES);
        prop_assert!(sim.is_done());
        prop_assert_eq!(sim.records().len(), addrs.len());
        for record in sim.records() {
            prop_assert_eq!(
                record.window,
                expected(&memory, record.pc.val(), cache.line_bytes as u64)
            );
        }
        let stats = sim.stats();
        prop_assert!(stats.fills_committed <= stats.fills_requested);
        prop_assert!(stats.fills_requested <= stats.misses);
        assert_no_duplicate_tags(sim.controller())?;
    }

    /// The same inputs give the same cycle count, deliveries and counters.
    #[test]
    fn runs_are_deterministic(
        cache in cache_config(),
        latency in 0u64..6,
        addrs in fetch_addrs(),
        schedule in events(),
    ) {
        let a = run(&cache, latency, &addrs, &schedule);
        let b = run(&cache, latency, &addrs, &schedule);
        prop_assert_eq!(a.cycle(), b.cycle());
        prop_assert_eq!(a.records(), b.records());
        prop_assert_eq!(
            serde_json::to_value(a.stats()).unwrap(),
            serde_json::to_value(b.stats()).unwrap()
        );
        let tags = |sim: &Simulator| {
            let store = sim.controller().line_store();
            (0..store.sets())
                .flat_map(|set| store.read(set).map(|v| (v.valid, v.tag)).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(tags(&a), tags(&b));
    }

    /// Each cycle either delivers a word or stalls; nothing in between.
    #[test]
    fn every_cycle_delivers_or_stalls(
        cache in cache_config(),
        latency in 0u64..6,
        addrs in fetch_addrs(),
    ) {
        let mut h = CacheHarness::new(&cache, latency);
        h.prime(addrs[0]);
        for (i, &pc) in addrs.iter().enumerate() {
            let next = addrs.get(i + 1).copied().unwrap_or(pc + 4);
            // `fetch` asserts stall on every cycle without a word.
            let (word, _) = h.fetch(pc, next);
            prop_assert_eq!(word, h.expected_window(pc));
        }
    }

    /// After an accepted invalidate-all no line is valid and the next
    /// lookup of a previously cached address misses.
    #[test]
    fn invalidate_all_leaves_nothing_valid(
        cache in cache_config(),
        addrs in fetch_addrs(),
    ) {
        let mut h = CacheHarness::new(&cache, 1);
        h.prime(addrs[0]);
        for (i, &pc) in addrs.iter().enumerate() {
            let next = addrs.get(i + 1).copied().unwrap_or(addrs[0]);
            h.fetch(pc, next);
        }
        prop_assert!(h.ctrl.line_store().occupancy() > 0);

        let first = addrs[0];
        let resp = h.step(FetchRequest::identity(first, first), SystemControl::INVALIDATE);
        prop_assert!(resp.invalidate_accepted);
        prop_assert_eq!(h.ctrl.line_store().occupancy(), 0);

        let after = h.step(FetchRequest::identity(first, first + 4), SystemControl::NONE);
        prop_assert!(!after.hit);
        prop_assert!(after.stall);
    }
}
