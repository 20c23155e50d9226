//! Line Store tests.

use icache_core::common::error::CacheError;
use icache_core::core::units::cache::{LineStore, LineWrite, WayMask};
use pretty_assertions::assert_eq;

fn line(fill: u8) -> Vec<u8> {
    vec![fill; 16]
}

#[test]
fn new_store_is_all_invalid() {
    let store = LineStore::new(8, 2, 16);
    assert_eq!(store.occupancy(), 0);
    for set in 0..8 {
        assert_eq!(store.valid_mask(set), WayMask::NONE);
        assert!(store.read(set).all(|view| !view.valid));
    }
}

#[test]
fn write_sets_tag_valid_and_data_together() {
    let mut store = LineStore::new(4, 2, 16);
    let data = line(0xAB);
    store
        .write(&LineWrite {
            set: 2,
            way: 1,
            tag: 0x55,
            data: &data,
        })
        .unwrap();
    let view = store.way(2, 1);
    assert!(view.valid);
    assert_eq!(view.tag, 0x55);
    assert_eq!(view.data, data.as_slice());
    assert_eq!(store.valid_mask(2), WayMask::one_hot(1));
}

#[test]
fn write_touches_only_addressed_slot() {
    let mut store = LineStore::new(4, 2, 16);
    let data = line(0x11);
    store
        .write(&LineWrite {
            set: 1,
            way: 0,
            tag: 7,
            data: &data,
        })
        .unwrap();
    assert_eq!(store.occupancy(), 1);
    assert!(!store.way(1, 1).valid);
    assert!(!store.way(0, 0).valid);
    assert_eq!(store.way(2, 0).data, line(0).as_slice());
}

#[test]
fn short_write_is_rejected_and_leaves_slot_untouched() {
    let mut store = LineStore::new(4, 2, 16);
    let err = store
        .write(&LineWrite {
            set: 0,
            way: 0,
            tag: 1,
            data: &[0; 8],
        })
        .unwrap_err();
    assert_eq!(
        err,
        CacheError::ShortFill {
            expected: 16,
            actual: 8
        }
    );
    assert!(!store.way(0, 0).valid);
}

#[test]
fn invalidate_all_clears_every_valid_bit() {
    let mut store = LineStore::new(4, 4, 16);
    let data = line(0x22);
    for set in 0..4 {
        for way in 0..4 {
            store
                .write(&LineWrite {
                    set,
                    way,
                    tag: (set * 4 + way) as u64,
                    data: &data,
                })
                .unwrap();
        }
    }
    assert_eq!(store.occupancy(), 16);
    store.invalidate_all();
    assert_eq!(store.occupancy(), 0);
}

#[test]
fn read_yields_ways_in_order() {
    let mut store = LineStore::new(1, 3, 16);
    for way in 0..3 {
        let data = line(way as u8);
        store
            .write(&LineWrite {
                set: 0,
                way,
                tag: 100 + way as u64,
                data: &data,
            })
            .unwrap();
    }
    let tags: Vec<u64> = store.read(0).map(|view| view.tag).collect();
    assert_eq!(tags, vec![100, 101, 102]);
    assert_eq!(store.read(0).len(), 3);
}
