//! Global Model Constants.
//!
//! This module defines constants shared by the cache model. It includes:
//! 1. **Memory Constants:** Page size and offset mask bounding the set index.
//! 2. **Instruction Constants:** Parcel sizes and the compressed-encoding test.
//! 3. **Structural Limits:** Associativity and line-size bounds.

/// Page size in bytes (4KB).
pub const PAGE_SIZE: u64 = 4096;

/// log2 of the page size.
pub const PAGE_SHIFT: u32 = 12;

/// Mask for extracting the page offset from an address.
pub const PAGE_OFFSET_MASK: u64 = PAGE_SIZE - 1;

/// Size of a compressed (16-bit) instruction parcel in bytes.
pub const INSTRUCTION_SIZE_16: u64 = 2;

/// Size of a standard (32-bit) instruction in bytes.
pub const INSTRUCTION_SIZE_32: u64 = 4;

/// Bit mask for checking if an instruction is compressed.
pub const COMPRESSED_INSTRUCTION_MASK: u16 = 0x3;

/// Low-bit pattern of a full-width (non-compressed) instruction.
pub const UNCOMPRESSED_INSTRUCTION_VALUE: u16 = 0x3;

/// Maximum associativity; hit and victim vectors are carried in a `u64`.
pub const MAX_WAYS: usize = 64;

/// Minimum line size: one full-width instruction.
pub const MIN_LINE_BYTES: usize = INSTRUCTION_SIZE_32 as usize;
