//! Physical and Virtual Address types.
//!
//! The fetch stage hands the cache virtual program-counter values, while the
//! translator produces physical addresses for tag comparison and line fills.
//! Keeping the two as distinct types stops a set index from being taken from
//! the wrong side of translation by accident.

use std::fmt;

use super::constants::PAGE_OFFSET_MASK;

/// A virtual (untranslated) fetch address, as produced by the fetch stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A physical address, as produced by the translator and driven onto the fill bus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Extracts the page offset (lower 12 bits).
    ///
    /// The cache set index must come from these bits so that indexing with the
    /// untranslated address agrees with the translated one.
    pub const fn page_offset(&self) -> u64 {
        self.0 & PAGE_OFFSET_MASK
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Rounds this address down to a multiple of `line_bytes`.
    ///
    /// `line_bytes` must be a power of two.
    #[inline]
    pub const fn align_down(&self, line_bytes: u64) -> Self {
        Self(self.0 & !(line_bytes - 1))
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "va:{:#x}", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pa:{:#x}", self.0)
    }
}
