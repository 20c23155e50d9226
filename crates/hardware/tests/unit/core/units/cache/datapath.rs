//! Hit/select datapath tests.

use icache_core::common::error::CacheError;
use icache_core::core::units::cache::datapath::{
    compare_tags, extract_window, resolve, select_line,
};
use icache_core::core::units::cache::{InstructionWindow, LineStore, LineWrite, WayMask};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn store_with(tags: &[(usize, u64)]) -> LineStore {
    let mut store = LineStore::new(1, 4, 16);
    for &(way, tag) in tags {
        let data: Vec<u8> = (0..16).map(|i| (way as u8) << 4 | i).collect();
        store
            .write(&LineWrite {
                set: 0,
                way,
                tag,
                data: &data,
            })
            .unwrap();
    }
    store
}

#[test]
fn compare_produces_hit_vector() {
    let store = store_with(&[(0, 5), (2, 9)]);
    assert_eq!(compare_tags(store.read(0), 9), WayMask::one_hot(2));
    assert_eq!(compare_tags(store.read(0), 7), WayMask::NONE);
}

#[test]
fn compare_ignores_invalid_ways_with_matching_tag() {
    let mut store = store_with(&[(1, 0)]);
    store.invalidate_all();
    assert_eq!(compare_tags(store.read(0), 0), WayMask::NONE);
}

#[test]
fn compare_reports_every_matching_way() {
    let store = store_with(&[(0, 3), (3, 3)]);
    assert_eq!(compare_tags(store.read(0), 3), WayMask::from_bits(0b1001));
}

#[test]
fn select_is_masked_or() {
    let store = store_with(&[(0, 1), (1, 2)]);
    let mut out = [0xEE; 16];
    select_line(store.read(0), WayMask::one_hot(1), &mut out);
    assert_eq!(out[0], 0x10);
    assert_eq!(out[15], 0x1F);

    select_line(store.read(0), WayMask::NONE, &mut out);
    assert_eq!(out, [0; 16]);
}

#[rstest]
#[case(0, 0x0302_0100, true)]
#[case(4, 0x0706_0504, true)]
#[case(5, 0x0706_0504, true)]
#[case(12, 0x0f0e_0d0c, true)]
#[case(14, 0x0000_0f0e, false)]
fn window_extraction(#[case] offset: usize, #[case] bits: u32, #[case] upper_valid: bool) {
    let line: Vec<u8> = (0..16).collect();
    assert_eq!(
        extract_window(&line, offset),
        InstructionWindow { bits, upper_valid }
    );
}

#[test]
fn compressed_instruction_complete_without_upper() {
    // c.nop = 0x0001
    let window = InstructionWindow {
        bits: 0x0001,
        upper_valid: false,
    };
    assert!(window.is_compressed());
    assert!(window.is_complete());
    assert_eq!(window.instruction(), Some(0x0001));
}

#[test]
fn full_width_instruction_needs_upper_half() {
    // addi x0, x0, 0 = 0x00000013
    let split = InstructionWindow {
        bits: 0x0013,
        upper_valid: false,
    };
    assert!(!split.is_compressed());
    assert_eq!(split.instruction(), None);

    let whole = InstructionWindow {
        bits: 0x0000_0013,
        upper_valid: true,
    };
    assert_eq!(whole.instruction(), Some(0x13));
}

#[test]
fn resolve_hit_returns_window_from_hitting_way() {
    let store = store_with(&[(0, 4), (1, 8)]);
    let mut scratch = vec![0; 16];
    let lookup = resolve(&store, 0, 8, 2, &mut scratch).unwrap();
    assert!(lookup.hit());
    assert_eq!(lookup.way(), Some(1));
    assert_eq!(lookup.window.unwrap().bits, 0x1514_1312);
}

#[test]
fn resolve_miss_has_no_window() {
    let store = store_with(&[(0, 4)]);
    let mut scratch = vec![0; 16];
    let lookup = resolve(&store, 0, 5, 0, &mut scratch).unwrap();
    assert!(!lookup.hit());
    assert_eq!(lookup.window, None);
}

#[test]
fn resolve_rejects_double_hit() {
    let store = store_with(&[(1, 6), (2, 6)]);
    let mut scratch = vec![0; 16];
    assert_eq!(
        resolve(&store, 0, 6, 0, &mut scratch),
        Err(CacheError::MultipleHits {
            set: 0,
            mask: 0b110
        })
    );
}
