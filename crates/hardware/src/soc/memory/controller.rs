//! Memory controller latency models.
//!
//! This module provides:
//! 1. **SimpleController:** Fixed latency per line fill.
//! 2. **DramController:** Row-buffer-aware latency (CAS, RAS, precharge).
//!
//! Models are `Send + Sync` so the fill engine that owns one can be.

use std::fmt::Debug;

use crate::common::PhysAddr;
use crate::config::{FillConfig, MemoryController};

/// Row size modeled by [`DramController`] (2 KiB).
const DRAM_ROW_MASK: u64 = !2047;

/// Reports how many busy cycles a line fill takes.
pub trait MemoryTiming: Send + Sync + Debug {
    /// Busy cycles for a fill of the line at `addr`. May update row state.
    fn access_latency(&mut self, addr: PhysAddr) -> u64;

    /// Forgets any open row.
    fn reset(&mut self) {}
}

/// Builds the model selected by `config.controller`.
pub fn from_config(config: &FillConfig) -> Box<dyn MemoryTiming> {
    match config.controller {
        MemoryController::Simple => Box::new(SimpleController::new(config.latency)),
        MemoryController::Dram => Box::new(DramController::new(
            config.t_cas,
            config.t_ras,
            config.t_pre,
        )),
    }
}

/// Fixed-latency model; every fill takes the same number of cycles.
#[derive(Debug, Clone, Copy)]
pub struct SimpleController {
    latency: u64,
}

impl SimpleController {
    /// Creates a simple controller with the given fixed latency in cycles.
    pub const fn new(latency: u64) -> Self {
        Self { latency }
    }
}

impl MemoryTiming for SimpleController {
    fn access_latency(&mut self, _addr: PhysAddr) -> u64 {
        self.latency
    }
}

/// DRAM-style model with one open row.
#[derive(Debug, Clone)]
pub struct DramController {
    last_row: Option<u64>,
    t_cas: u64,
    t_ras: u64,
    t_pre: u64,
}

impl DramController {
    /// Creates a DRAM controller with the given timing parameters (in cycles).
    ///
    /// # Arguments
    ///
    /// * `t_cas` - Column access strobe latency.
    /// * `t_ras` - Row access strobe latency.
    /// * `t_pre` - Precharge latency.
    pub const fn new(t_cas: u64, t_ras: u64, t_pre: u64) -> Self {
        Self {
            last_row: None,
            t_cas,
            t_ras,
            t_pre,
        }
    }
}

impl MemoryTiming for DramController {
    fn access_latency(&mut self, addr: PhysAddr) -> u64 {
        let row = addr.val() & DRAM_ROW_MASK;
        match self.last_row {
            Some(open_row) if open_row == row => self.t_cas,
            Some(_) => {
                self.last_row = Some(row);
                self.t_pre + self.t_ras + self.t_cas
            }
            None => {
                self.last_row = Some(row);
                self.t_ras + self.t_cas
            }
        }
    }

    fn reset(&mut self) {
        self.last_row = None;
    }
}
