//! Functional units.
//!
//! The only unit modeled here is the instruction cache; its submodules split it
//! into storage, replacement, the combinational datapath, and the controller.

/// Set-associative instruction cache with its fetch/fill controller.
pub mod cache;
