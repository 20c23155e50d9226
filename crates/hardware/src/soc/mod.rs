//! System-on-Chip (SoC) Components.
//!
//! Everything outside the cache that the simulator drives each cycle: the
//! backing memory, the fill engine that answers line requests, and the
//! address translation feeding the physical tag.

/// Latency-modeled fill engine.
pub mod fill;

/// Backing instruction memory.
pub mod memory;

/// Address translation in front of the tag compare.
pub mod translate;

/// Trait definitions for components driven by the simulator.
pub mod traits;

pub use fill::LatencyFillEngine;
pub use memory::Memory;
pub use translate::{AddressTranslator, IdentityTranslator, OffsetTranslator};
pub use traits::FillEngine;
