//! Program Image and Fetch Trace Loading.
//!
//! This module prepares what a run fetches. It performs:
//! 1. **Image loading:** Raw binaries at the memory base, or ELF files by program header.
//! 2. **Trace parsing:** One fetch address per line (hex or decimal, `#` comments).
//! 3. **Stream generation:** Sequential address runs, or a walk over code in memory
//!    that steps 2 or 4 bytes by instruction length.

use std::fs;
use std::path::Path;

use object::read::elf::{ElfFile32, ElfFile64};
use object::{Endianness, FileKind, Object, ObjectSegment};
use tracing::{debug, info};

use crate::common::constants::{
    COMPRESSED_INSTRUCTION_MASK, INSTRUCTION_SIZE_16, INSTRUCTION_SIZE_32,
    UNCOMPRESSED_INSTRUCTION_VALUE,
};
use crate::common::error::SimError;
use crate::soc::memory::Memory;

/// Reads a file from disk into a byte vector.
pub fn load_binary(path: &Path) -> Result<Vec<u8>, SimError> {
    Ok(fs::read(path)?)
}

/// Loads a program image into `memory` and returns its entry address.
///
/// ELF files are placed by their loadable segments and report their entry
/// point; anything else is copied verbatim to the memory base.
pub fn load_image(memory: &mut Memory, path: &Path) -> Result<u64, SimError> {
    let data = load_binary(path)?;
    if data.starts_with(b"\x7fELF") {
        return load_elf(memory, &data);
    }
    let base = memory.base();
    memory.load_at(base, &data)?;
    info!(path = %path.display(), bytes = data.len(), base = format_args!("{base:#x}"), "raw image loaded");
    Ok(base)
}

fn elf_error(err: object::Error) -> SimError {
    SimError::Elf(err.to_string())
}

/// Loads every non-empty segment of an ELF image; returns the entry point.
pub fn load_elf(memory: &mut Memory, data: &[u8]) -> Result<u64, SimError> {
    match FileKind::parse(data).map_err(elf_error)? {
        FileKind::Elf64 => {
            let file = ElfFile64::<Endianness>::parse(data).map_err(elf_error)?;
            load_segments(memory, &file)
        }
        FileKind::Elf32 => {
            let file = ElfFile32::<Endianness>::parse(data).map_err(elf_error)?;
            load_segments(memory, &file)
        }
        other => Err(SimError::Elf(format!("unsupported object format {other:?}"))),
    }
}

fn load_segments<'data, O: Object<'data>>(memory: &mut Memory, file: &O) -> Result<u64, SimError> {
    for segment in file.segments() {
        let bytes = segment.data().map_err(elf_error)?;
        if bytes.is_empty() {
            continue;
        }
        memory.load_at(segment.address(), bytes)?;
        debug!(
            addr = format_args!("{:#x}", segment.address()),
            bytes = bytes.len(),
            "ELF segment loaded"
        );
    }
    Ok(file.entry())
}

/// Parses a fetch trace.
///
/// Each non-blank line holds one address, `0x`-prefixed hex or decimal.
/// Everything after `#` is ignored.
pub fn parse_trace(text: &str) -> Result<Vec<u64>, SimError> {
    let mut addrs = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let parsed = match content
            .strip_prefix("0x")
            .or_else(|| content.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
            None => content.replace('_', "").parse::<u64>(),
        };
        let addr = parsed.map_err(|_| SimError::Trace {
            line: idx + 1,
            content: content.to_string(),
        })?;
        addrs.push(addr);
    }
    Ok(addrs)
}

/// Reads and parses a fetch trace file.
pub fn read_trace(path: &Path) -> Result<Vec<u64>, SimError> {
    let text = fs::read_to_string(path)?;
    let addrs = parse_trace(&text)?;
    info!(path = %path.display(), fetches = addrs.len(), "fetch trace loaded");
    Ok(addrs)
}

/// `count` addresses from `start`, `step` bytes apart.
pub fn sequential(start: u64, count: usize, step: u64) -> Vec<u64> {
    (0..count as u64)
        .map(|i| start.wrapping_add(i.wrapping_mul(step)))
        .collect()
}

/// Walks `count` instructions of straight-line code from `start`.
///
/// Each step is 2 bytes for a compressed parcel and 4 otherwise. The walk
/// stops early at the end of memory.
pub fn walk_program(memory: &Memory, start: u64, count: usize) -> Vec<u64> {
    let mut addrs = Vec::with_capacity(count);
    let mut pc = start;
    while addrs.len() < count {
        let Some(parcel) = memory.read_u16(pc) else {
            break;
        };
        addrs.push(pc);
        let size = if parcel & COMPRESSED_INSTRUCTION_MASK == UNCOMPRESSED_INSTRUCTION_VALUE {
            INSTRUCTION_SIZE_32
        } else {
            INSTRUCTION_SIZE_16
        };
        pc = pc.wrapping_add(size);
    }
    addrs
}
