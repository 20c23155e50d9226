//! Common types shared across the cache model.
//!
//! This module provides the building blocks used by every other component:
//! 1. **Address Types:** Strong types for virtual (fetch) and physical (bus) addresses.
//! 2. **Constants:** Page geometry, instruction sizes, and structural limits.
//! 3. **Error Handling:** Protocol, configuration, and simulation error types.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Common constants used throughout the model.
pub mod constants;

/// Error types for the controller, configuration, and simulator.
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{MAX_WAYS, PAGE_SIZE};
pub use error::{CacheError, ConfigError, SimError};
