//! Line Store.
//!
//! Tag, valid, and data arrays for every (set, way) slot, laid out as flat
//! arenas indexed by `set * ways + way`. Storage is allocated once at
//! construction; reads hand out borrowed views, writes replace one slot whole.

use super::datapath::WayMask;
use crate::common::error::CacheError;

/// Read view of one way of a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WayView<'a> {
    /// Stored tag.
    pub tag: u64,
    /// Slot holds a committed line.
    pub valid: bool,
    /// Line data.
    pub data: &'a [u8],
}

/// A single-way write: the commit of one filled line.
#[derive(Clone, Copy, Debug)]
pub struct LineWrite<'a> {
    /// Target set.
    pub set: usize,
    /// Target way (the asserted write enable).
    pub way: usize,
    /// Tag to store.
    pub tag: u64,
    /// Complete line data.
    pub data: &'a [u8],
}

/// Per-way storage of tag, valid bit, and line data.
#[derive(Debug, Clone)]
pub struct LineStore {
    sets: usize,
    ways: usize,
    line_bytes: usize,
    tags: Vec<u64>,
    valid: Vec<bool>,
    data: Vec<u8>,
}

impl LineStore {
    /// Creates an empty store; every slot starts invalid.
    pub fn new(sets: usize, ways: usize, line_bytes: usize) -> Self {
        let slots = sets * ways;
        Self {
            sets,
            ways,
            line_bytes,
            tags: vec![0; slots],
            valid: vec![false; slots],
            data: vec![0; slots * line_bytes],
        }
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.sets
    }

    /// Number of ways per set.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    #[inline]
    const fn slot(&self, set: usize, way: usize) -> usize {
        set * self.ways + way
    }

    /// Returns the view of one way.
    ///
    /// # Panics
    ///
    /// Panics if `set` or `way` is out of range; indices always come from a
    /// validated `CacheGeometry`.
    pub fn way(&self, set: usize, way: usize) -> WayView<'_> {
        let slot = self.slot(set, way);
        let start = slot * self.line_bytes;
        WayView {
            tag: self.tags[slot],
            valid: self.valid[slot],
            data: &self.data[start..start + self.line_bytes],
        }
    }

    /// Returns every way of `set` in way order.
    pub fn read(&self, set: usize) -> impl ExactSizeIterator<Item = WayView<'_>> + '_ {
        (0..self.ways).map(move |way| self.way(set, way))
    }

    /// Valid bits of `set` as a way vector.
    pub fn valid_mask(&self, set: usize) -> WayMask {
        let base = self.slot(set, 0);
        self.valid[base..base + self.ways]
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .fold(WayMask::NONE, |mask, (way, _)| mask.with(way))
    }

    /// Atomically replaces tag, valid bit, and data of one slot.
    ///
    /// The slot is untouched unless `data` is exactly one line long.
    pub fn write(&mut self, write: &LineWrite<'_>) -> Result<(), CacheError> {
        if write.data.len() != self.line_bytes {
            return Err(CacheError::ShortFill {
                expected: self.line_bytes,
                actual: write.data.len(),
            });
        }
        let slot = self.slot(write.set, write.way);
        let start = slot * self.line_bytes;
        self.data[start..start + self.line_bytes].copy_from_slice(write.data);
        self.tags[slot] = write.tag;
        self.valid[slot] = true;
        Ok(())
    }

    /// Clears every valid bit. Tags and data are left in place.
    pub fn invalidate_all(&mut self) {
        self.valid.fill(false);
    }

    /// Number of valid slots across the whole cache.
    pub fn occupancy(&self) -> usize {
        self.valid.iter().filter(|v| **v).count()
    }
}
