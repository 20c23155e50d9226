//! Cache core.
//!
//! This module contains the instruction cache proper and the signal bundles it
//! exchanges with the fetch stage, the system controller, and the fill bus.

/// Per-cycle signal bundles exchanged with the fetch stage and the fill bus.
pub mod pipeline;

/// Functional units (line store, replacement, datapath, controller).
pub mod units;
