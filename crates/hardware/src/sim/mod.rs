//! Simulation harness.
//!
//! Drives the fetch/fill controller against a fill engine and a trace-driven
//! fetch stage, and loads the programs and traces it runs.

/// Trace-driven fetch stage model.
pub mod fetch;

/// Program image and fetch trace loading.
pub mod loader;

/// Cycle-by-cycle wiring of fetch stage, controller and fill engine.
pub mod simulator;

pub use fetch::FetchStream;
pub use simulator::{FetchRecord, SimEvent, Simulator};
