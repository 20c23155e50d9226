//! Instruction-fetch cache controller model.
//!
//! This crate implements a cycle-accurate model of a set-associative, read-only
//! instruction cache sitting between a CPU fetch stage and a slow line-fill bus:
//! 1. **Core:** Line store, replacement policies, hit/select datapath, and the fetch/fill controller.
//! 2. **Pipeline signals:** Per-cycle request, control, bus, and response bundles.
//! 3. **SoC:** Backing memory, a fixed-latency fill engine, and address translators.
//! 4. **Simulation:** Fetch-stream model, trace/image loader, and the cycle driver.
//! 5. **Configuration and statistics:** JSON-deserialized config and hit/miss/stall counters.

/// Common types and constants (addresses, errors, instruction sizes).
pub mod common;
/// Model configuration (defaults, enums, validation).
pub mod config;
/// Cache core (line store, policies, datapath, controller) and pipeline signals.
pub mod core;
/// Fetch-stream model, loader, and cycle-level simulator.
pub mod sim;
/// Bus-side collaborators (memory, fill engine, translators).
pub mod soc;
/// Cache statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// The fetch/fill controller; owns the line store and replacement state.
pub use crate::core::units::cache::FetchController;
/// Cycle driver wiring controller, fill engine, translator, and fetch stream.
pub use crate::sim::Simulator;
