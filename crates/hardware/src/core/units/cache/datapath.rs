//! Hit/Select Datapath.
//!
//! Purely combinational logic between the Line Store read port and the fetch
//! stage. It performs:
//! 1. **Tag Compare:** Every way is compared in parallel, producing a hit vector.
//! 2. **Line Select:** The hitting way's line is chosen as the OR of AND-masked lines.
//! 3. **Extraction:** The instruction window at the intra-line offset is sliced out.
//!
//! The compare is a fold over all ways, never an early-exit search, so a second
//! matching way shows up in the vector instead of being hidden by scan order.

use std::fmt;

use super::line_store::{LineStore, WayView};
use crate::common::constants::{COMPRESSED_INSTRUCTION_MASK, UNCOMPRESSED_INSTRUCTION_VALUE};
use crate::common::error::CacheError;

/// A per-way bit vector (hit vector, one-hot victim, write enable).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WayMask(u64);

impl WayMask {
    /// No way selected.
    pub const NONE: Self = Self(0);

    /// Wraps a raw bit vector.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// A vector with only `way` set.
    pub const fn one_hot(way: usize) -> Self {
        Self(1 << way)
    }

    /// Raw bit vector.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns this vector with `way` also set.
    #[must_use]
    pub const fn with(self, way: usize) -> Self {
        Self(self.0 | (1 << way))
    }

    /// Whether `way` is set.
    pub const fn contains(self, way: usize) -> bool {
        (self.0 >> way) & 1 == 1
    }

    /// Whether any way is set (the OR-reduction).
    pub const fn any(self) -> bool {
        self.0 != 0
    }

    /// Number of ways set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Exactly one way is set.
    pub const fn is_one_hot(self) -> bool {
        self.0.is_power_of_two()
    }

    /// Lowest set way.
    pub const fn first(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// Lowest way below `ways` that is not set.
    pub const fn first_clear(self, ways: usize) -> Option<usize> {
        let clear = !self.0;
        if clear == 0 {
            return None;
        }
        let way = clear.trailing_zeros() as usize;
        if way < ways { Some(way) } else { None }
    }
}

impl fmt::Debug for WayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WayMask({:#b})", self.0)
    }
}

/// Compares every way against `tag`; a way hits when valid and tags match.
pub fn compare_tags<'a, I>(ways: I, tag: u64) -> WayMask
where
    I: IntoIterator<Item = WayView<'a>>,
{
    ways.into_iter()
        .enumerate()
        .fold(WayMask::NONE, |mask, (way, view)| {
            if view.valid && view.tag == tag {
                mask.with(way)
            } else {
                mask
            }
        })
}

/// Multiplexes line data by hit vector into `out`.
///
/// Each way's line is ANDed with its hit bit and the results ORed together.
/// With at most one hit this yields exactly that way's line; with none, zeros.
pub fn select_line<'a, I>(ways: I, hits: WayMask, out: &mut [u8])
where
    I: IntoIterator<Item = WayView<'a>>,
{
    out.fill(0);
    for (way, view) in ways.into_iter().enumerate() {
        let keep = if hits.contains(way) { 0xFF } else { 0x00 };
        for (dst, src) in out.iter_mut().zip(view.data) {
            *dst |= src & keep;
        }
    }
}

/// A 32-bit window into a line, starting at a halfword boundary.
///
/// The low halfword is always present. The high halfword is only present when
/// it lies inside the same line; a full-width instruction whose second parcel
/// spills into the next line is reported with `upper_valid == false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstructionWindow {
    /// Little-endian window; the upper 16 bits are zero when `upper_valid` is false.
    pub bits: u32,
    /// The upper halfword came from this line.
    pub upper_valid: bool,
}

impl InstructionWindow {
    /// First 16-bit parcel.
    pub const fn lower(&self) -> u16 {
        self.bits as u16
    }

    /// The first parcel encodes a compressed instruction.
    pub const fn is_compressed(&self) -> bool {
        (self.lower() & COMPRESSED_INSTRUCTION_MASK) != UNCOMPRESSED_INSTRUCTION_VALUE
    }

    /// Every parcel of the instruction is present.
    pub const fn is_complete(&self) -> bool {
        self.is_compressed() || self.upper_valid
    }

    /// The instruction encoding, if complete.
    pub const fn instruction(&self) -> Option<u32> {
        if self.is_compressed() {
            Some(self.lower() as u32)
        } else if self.upper_valid {
            Some(self.bits)
        } else {
            None
        }
    }
}

/// Slices the instruction window at `offset` out of `line`.
///
/// Bit 0 of the offset is ignored: instructions are halfword aligned.
pub fn extract_window(line: &[u8], offset: usize) -> InstructionWindow {
    let offset = offset & !1;
    let parcel = |at: usize| {
        line.get(at..at + 2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
    };
    let lower = parcel(offset).unwrap_or(0);
    let upper = parcel(offset + 2);
    InstructionWindow {
        bits: u32::from(lower) | (u32::from(upper.unwrap_or(0)) << 16),
        upper_valid: upper.is_some(),
    }
}

/// Result of one datapath evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lookup {
    /// Per-way hit vector.
    pub hits: WayMask,
    /// Extracted window, present on a hit.
    pub window: Option<InstructionWindow>,
}

impl Lookup {
    /// OR-reduction of the hit vector.
    pub const fn hit(&self) -> bool {
        self.hits.any()
    }

    /// The hitting way.
    pub const fn way(&self) -> Option<usize> {
        self.hits.first()
    }
}

/// Evaluates the full datapath for one set.
///
/// `scratch` must be one line long; it receives the selected line.
/// Returns [`CacheError::MultipleHits`] if the at-most-one-hit invariant is broken.
pub fn resolve(
    store: &LineStore,
    set: usize,
    tag: u64,
    offset: usize,
    scratch: &mut [u8],
) -> Result<Lookup, CacheError> {
    let hits = compare_tags(store.read(set), tag);
    if hits.count() > 1 {
        return Err(CacheError::MultipleHits {
            set,
            mask: hits.bits(),
        });
    }
    if !hits.any() {
        return Ok(Lookup { hits, window: None });
    }
    select_line(store.read(set), hits, scratch);
    Ok(Lookup {
        hits,
        window: Some(extract_window(scratch, offset)),
    })
}
