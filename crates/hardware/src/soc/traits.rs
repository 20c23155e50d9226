//! Fill engine trait.
//!
//! The fill engine is the memory side of the fill handshake. Each cycle the
//! simulator:
//! 1. **Samples:** reads [`FillEngine::signals`] and hands them to the controller.
//! 2. **Clocks:** passes the controller's request strobe to [`FillEngine::tick`].
//!
//! All implementors must be `Send + Sync` so a simulator can be moved across threads.

use std::fmt::Debug;

use crate::core::pipeline::signals::{BusSignals, FillRequest};

/// Memory-side responder for line fill requests.
///
/// Exactly one request is outstanding at a time. `ack` must be asserted for
/// one cycle per accepted request, with `data` holding the full line.
pub trait FillEngine: Send + Sync + Debug {
    /// Signals driven toward the controller in the current cycle.
    fn signals(&self) -> BusSignals<'_>;

    /// Clock edge: `request` is the controller's strobe for this cycle.
    fn tick(&mut self, request: Option<FillRequest>);

    /// Drops any transaction in flight and returns to idle.
    fn reset(&mut self);
}
