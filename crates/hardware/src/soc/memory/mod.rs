//! Backing Instruction Memory.
//!
//! This module implements the memory the fill engine reads lines from. It provides:
//! 1. **Memory:** A flat byte array mapped at a physical base address.
//! 2. **Controller:** Latency models (fixed or DRAM row-buffer) for fill timing.

/// Memory controller implementations for fill latency modeling.
pub mod controller;

use tracing::warn;

use crate::common::PhysAddr;
use crate::common::error::SimError;
use crate::config::MemoryConfig;

/// Flat physical memory.
#[derive(Clone)]
pub struct Memory {
    bytes: Vec<u8>,
    base_addr: u64,
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("base_addr", &format_args!("{:#x}", self.base_addr))
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl Memory {
    /// Creates zero-filled memory of `size` bytes mapped at `base_addr`.
    pub fn new(base_addr: u64, size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            base_addr,
        }
    }

    /// Creates memory from the configured map.
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(config.base, config.size)
    }

    /// Physical base address.
    pub const fn base(&self) -> u64 {
        self.base_addr
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Returns (base_address, size_in_bytes).
    pub fn address_range(&self) -> (u64, u64) {
        (self.base_addr, self.bytes.len() as u64)
    }

    /// True if `[addr, addr + len)` lies inside memory.
    pub fn contains(&self, addr: u64, len: usize) -> bool {
        self.offset_of(addr, len).is_some()
    }

    fn offset_of(&self, addr: u64, len: usize) -> Option<usize> {
        let offset = usize::try_from(addr.checked_sub(self.base_addr)?).ok()?;
        let end = offset.checked_add(len)?;
        (end <= self.bytes.len()).then_some(offset)
    }

    /// Copies `data` into memory at physical address `addr`.
    ///
    /// Used for loading program images during setup.
    pub fn load_at(&mut self, addr: u64, data: &[u8]) -> Result<(), SimError> {
        let offset = self
            .offset_of(addr, data.len())
            .ok_or(SimError::ImageOutOfRange {
                addr,
                len: data.len(),
            })?;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Reads one little-endian halfword, `None` outside memory.
    pub fn read_u16(&self, addr: u64) -> Option<u16> {
        let offset = self.offset_of(addr, 2)?;
        Some(u16::from_le_bytes([self.bytes[offset], self.bytes[offset + 1]]))
    }

    /// Fills `out` with the bytes starting at `addr`.
    ///
    /// Returns `false` and zero-fills `out` if any byte lies outside memory.
    pub fn read_line(&self, addr: PhysAddr, out: &mut [u8]) -> bool {
        if let Some(offset) = self.offset_of(addr.val(), out.len()) {
            out.copy_from_slice(&self.bytes[offset..offset + out.len()]);
            true
        } else {
            warn!(addr = %addr, len = out.len(), "line read outside backing memory");
            out.fill(0);
            false
        }
    }
}
