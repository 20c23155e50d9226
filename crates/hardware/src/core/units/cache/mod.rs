//! Set-Associative Instruction Cache.
//!
//! This module implements a read-only, line-fill-only instruction cache with a
//! cycle-accurate fetch/fill controller. It is split leaf-first into:
//! 1. **Line Store:** sets × ways arena of tag, valid bit, and line data.
//! 2. **Replacement:** deterministic victim selection (LRU, bit-PLRU, FIFO).
//! 3. **Datapath:** tag compare, masked line select, and instruction extraction.
//! 4. **Controller:** the ACCESS / MISS-STALL / FILL-* state machine.

/// Fetch/fill controller state machine.
pub mod controller;

/// Hit/select datapath (tag compare, line mux, instruction extraction).
pub mod datapath;

/// Tag, valid, and data storage.
pub mod line_store;

/// Cache replacement policy implementations (LRU, PLRU, FIFO).
pub mod policies;

pub use self::controller::{FetchController, FetchState, FillTransaction};
pub use self::datapath::{InstructionWindow, Lookup, WayMask};
pub use self::line_store::{LineStore, LineWrite, WayView};

use crate::common::constants::{MAX_WAYS, MIN_LINE_BYTES, PAGE_SIZE};
use crate::common::error::ConfigError;
use crate::common::{PhysAddr, VirtAddr};
use crate::config::CacheConfig;

/// Validated cache shape and the address field split derived from it.
///
/// An address decomposes as `[ tag | set index | line offset ]`. The set index
/// is always read from the untranslated fetch address; validation guarantees
/// that index and offset together fit inside the page offset, so the
/// translated address yields the same index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheGeometry {
    sets: usize,
    ways: usize,
    line_bytes: usize,
    offset_bits: u32,
    index_bits: u32,
}

impl CacheGeometry {
    /// Validates `config` and derives the address field widths.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        if config.ways == 0 {
            return Err(ConfigError::ZeroWays);
        }
        if config.ways > MAX_WAYS {
            return Err(ConfigError::TooManyWays {
                ways: config.ways,
                max: MAX_WAYS,
            });
        }
        if !config.sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "sets",
                value: config.sets,
            });
        }
        if !config.line_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "line_bytes",
                value: config.line_bytes,
            });
        }
        if config.line_bytes < MIN_LINE_BYTES {
            return Err(ConfigError::LineTooSmall {
                line_bytes: config.line_bytes,
                min: MIN_LINE_BYTES,
            });
        }
        let span = config.sets.saturating_mul(config.line_bytes);
        if span as u64 > PAGE_SIZE {
            return Err(ConfigError::IndexExceedsPage {
                sets: config.sets,
                line_bytes: config.line_bytes,
                span,
                page: PAGE_SIZE,
            });
        }

        Ok(Self {
            sets: config.sets,
            ways: config.ways,
            line_bytes: config.line_bytes,
            offset_bits: config.line_bytes.trailing_zeros(),
            index_bits: config.sets.trailing_zeros(),
        })
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

    /// Set index of a fetch address.
    #[inline]
    pub const fn set_index(&self, addr: VirtAddr) -> usize {
        ((addr.val() >> self.offset_bits) as usize) & (self.sets - 1)
    }

    /// Tag field of a physical address.
    #[inline]
    pub const fn tag(&self, addr: PhysAddr) -> u64 {
        addr.val() >> (self.offset_bits + self.index_bits)
    }

    /// Byte offset of an address within its line.
    #[inline]
    pub const fn line_offset(&self, addr: PhysAddr) -> usize {
        (addr.val() as usize) & (self.line_bytes - 1)
    }

    /// Line-aligned base of a physical address.
    #[inline]
    pub const fn line_base(&self, addr: PhysAddr) -> PhysAddr {
        addr.align_down(self.line_bytes as u64)
    }
}
