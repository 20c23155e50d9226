//! Error definitions.
//!
//! Misses are not errors: they are absorbed by the fill path and only ever
//! surface to the fetch stage as a stall. What remains here:
//! 1. **Protocol violations:** Invariant breaches the hardware could not recover from.
//! 2. **Configuration errors:** Geometry that cannot be built or indexed correctly.
//! 3. **Simulation errors:** Wrapping the above plus I/O and loader failures.

use thiserror::Error;

use crate::core::units::cache::FetchState;

/// Fatal protocol or invariant violations detected by the controller.
///
/// Real hardware has no way to report these; the model returns them so that
/// tests and the simulator can stop at the first inconsistent cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The fill engine asserted acknowledge while no fill was outstanding.
    #[error("fill acknowledge received with no outstanding request (state {state})")]
    SpuriousAcknowledge {
        /// Controller state on the offending cycle.
        state: FetchState,
    },

    /// More than one way of a set matched the requested tag.
    #[error("set {set} reported multiple tag hits (way mask {mask:#b})")]
    MultipleHits {
        /// Set index that was looked up.
        set: usize,
        /// Raw per-way hit vector.
        mask: u64,
    },

    /// Acknowledged fill data did not cover exactly one line.
    #[error("fill delivered {actual} bytes, expected a {expected}-byte line")]
    ShortFill {
        /// Configured line size in bytes.
        expected: usize,
        /// Number of bytes presented on the bus.
        actual: usize,
    },
}

/// Configuration validation and parsing failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Associativity of zero.
    #[error("cache must have at least one way")]
    ZeroWays,

    /// Associativity above what the way vectors can carry.
    #[error("cache has {ways} ways, at most {max} are supported")]
    TooManyWays {
        /// Requested associativity.
        ways: usize,
        /// Supported maximum.
        max: usize,
    },

    /// A geometry field that must be a non-zero power of two was not.
    #[error("{field} must be a non-zero power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was supplied.
        value: usize,
    },

    /// Line too small to hold one full-width instruction.
    #[error("line size {line_bytes} is smaller than the minimum of {min} bytes")]
    LineTooSmall {
        /// Requested line size.
        line_bytes: usize,
        /// Minimum line size.
        min: usize,
    },

    /// Index and offset bits extend beyond the page offset.
    ///
    /// The set index is taken from the untranslated fetch address, so every
    /// index bit must be unaffected by translation.
    #[error("{sets} sets of {line_bytes}-byte lines span {span} bytes, exceeding the {page}-byte page")]
    IndexExceedsPage {
        /// Number of sets.
        sets: usize,
        /// Line size in bytes.
        line_bytes: usize,
        /// `sets * line_bytes`.
        span: usize,
        /// Page size.
        page: u64,
    },

    /// Backing memory of zero bytes.
    #[error("backing memory size must be non-zero")]
    EmptyMemory,

    /// The JSON document could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the simulator and loader.
#[derive(Debug, Error)]
pub enum SimError {
    /// Controller protocol violation.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// File could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A trace file line was not a valid address.
    #[error("trace line {line}: cannot parse `{content}` as an address")]
    Trace {
        /// One-based line number.
        line: usize,
        /// Offending text.
        content: String,
    },

    /// An image does not fit in backing memory.
    #[error("image of {len} bytes at {addr:#x} does not fit in backing memory")]
    ImageOutOfRange {
        /// Load address.
        addr: u64,
        /// Image length in bytes.
        len: usize,
    },

    /// The ELF image could not be parsed.
    #[error("invalid ELF image: {0}")]
    Elf(String),

    /// A run report could not be serialized.
    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}
