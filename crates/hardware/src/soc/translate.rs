//! Address translation in front of the tag compare.
//!
//! The controller indexes with the virtual fetch address and tags with the
//! translated one. Translators here only ever move whole pages, so the page
//! offset (and with it the set index) is the same on both sides.

use std::fmt::Debug;

use crate::common::constants::PAGE_SHIFT;
use crate::common::{PhysAddr, VirtAddr};

/// Produces the physical address for a fetch.
pub trait AddressTranslator: Send + Sync + Debug {
    /// Translates `vaddr`. Must preserve the page offset.
    fn translate(&self, vaddr: VirtAddr) -> PhysAddr;
}

/// Physical address equals virtual address.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl AddressTranslator for IdentityTranslator {
    fn translate(&self, vaddr: VirtAddr) -> PhysAddr {
        PhysAddr::new(vaddr.val())
    }
}

/// Adds a fixed, page-aligned displacement to every address.
#[derive(Debug, Clone, Copy)]
pub struct OffsetTranslator {
    offset: i64,
}

impl OffsetTranslator {
    /// Creates a translator for `offset`; bits below the page size are dropped.
    pub const fn new(offset: i64) -> Self {
        Self {
            offset: (offset >> PAGE_SHIFT) << PAGE_SHIFT,
        }
    }

    /// The page-aligned displacement in use.
    pub const fn offset(&self) -> i64 {
        self.offset
    }
}

impl AddressTranslator for OffsetTranslator {
    fn translate(&self, vaddr: VirtAddr) -> PhysAddr {
        PhysAddr::new(vaddr.val().wrapping_add_signed(self.offset))
    }
}
