//! Pipeline-facing signals.
//!
//! Everything the controller samples or drives in one clock cycle is grouped
//! into plain value types here, so a cycle is a pure function of its inputs and
//! the controller's registered state.

/// Request, control, bus, and response bundles.
pub mod signals;

pub use signals::{
    AddressSelect, BusSignals, FetchRequest, FetchResponse, FillRequest, SystemControl,
};
