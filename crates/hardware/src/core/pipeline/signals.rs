//! Cycle-level signal bundles.
//!
//! This module defines the boundary of the cache controller. It provides:
//! 1. **Fetch Request:** Next/current PC, translated address, and the upstream busy hint.
//! 2. **System Control:** Invalidate-all, ignore-request (flush), and reset.
//! 3. **Bus Signals:** Fill engine ready/acknowledge/data as seen this cycle.
//! 4. **Fetch Response:** Stall, instruction window, fill strobe, and Line Store write signals.

use crate::common::{PhysAddr, VirtAddr};
use crate::core::units::cache::{InstructionWindow, WayMask};

/// Which fetch address indexes the Line Store at the end of this cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressSelect {
    /// Advance: index with the next PC so its data is ready next cycle.
    #[default]
    Next,
    /// Hold: re-index with the current (or latched miss) address.
    Current,
}

/// Inputs from the fetch stage and translator for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Address the fetch stage will present as current if this cycle advances.
    pub next_pc: VirtAddr,
    /// Address being fetched this cycle.
    pub current_pc: VirtAddr,
    /// Translation of `current_pc`.
    pub paddr: PhysAddr,
    /// The pipeline cannot accept an instruction this cycle.
    pub pipeline_busy: bool,
}

impl FetchRequest {
    /// Builds a request where the physical address equals the virtual one.
    pub const fn identity(current_pc: u64, next_pc: u64) -> Self {
        Self {
            next_pc: VirtAddr::new(next_pc),
            current_pc: VirtAddr::new(current_pc),
            paddr: PhysAddr::new(current_pc),
            pipeline_busy: false,
        }
    }

    /// Returns the same request with the busy hint set.
    #[must_use]
    pub const fn busy(mut self) -> Self {
        self.pipeline_busy = true;
        self
    }
}

/// System control inputs for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemControl {
    /// Clear every valid bit (cache maintenance); only accepted in `Access`.
    pub invalidate_all: bool,
    /// Abort the in-flight access (pipeline redirect or flush).
    pub ignore_request: bool,
    /// Synchronous reset.
    pub reset: bool,
}

impl SystemControl {
    /// No control signal asserted.
    pub const NONE: Self = Self {
        invalidate_all: false,
        ignore_request: false,
        reset: false,
    };

    /// Only `ignore_request` asserted.
    pub const IGNORE: Self = Self {
        invalidate_all: false,
        ignore_request: true,
        reset: false,
    };

    /// Only `invalidate_all` asserted.
    pub const INVALIDATE: Self = Self {
        invalidate_all: true,
        ignore_request: false,
        reset: false,
    };
}

/// Fill engine outputs as sampled by the controller this cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusSignals<'a> {
    /// The engine will accept a request strobe at the coming clock edge.
    pub ready: bool,
    /// `data` holds a complete line for the outstanding request.
    pub ack: bool,
    /// Line data; meaningful only while `ack` is asserted.
    pub data: &'a [u8],
}

impl BusSignals<'static> {
    /// An idle bus: not ready, nothing acknowledged.
    pub const IDLE: Self = Self {
        ready: false,
        ack: false,
        data: &[],
    };

    /// A bus that will accept a request this cycle.
    pub const READY: Self = Self {
        ready: true,
        ack: false,
        data: &[],
    };
}

/// Fill request strobe driven toward the fill engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillRequest {
    /// Line-aligned physical address to fetch.
    pub line_addr: PhysAddr,
}

/// Controller outputs for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// Hold the fetch stage.
    pub stall: bool,
    /// Some way hit this cycle.
    pub hit: bool,
    /// Per-way hit vector from the tag comparison (zero when no lookup ran).
    pub hit_ways: WayMask,
    /// Instruction window; present only on a hit that is not stalled.
    pub word: Option<InstructionWindow>,
    /// Address-select for the Line Store index latched at the clock edge.
    pub address_select: AddressSelect,
    /// Fill request strobe and address.
    pub fill_request: Option<FillRequest>,
    /// One-hot victim way chosen for the pending fill.
    pub victim: WayMask,
    /// One-hot Line Store write enable (fill commit).
    pub write_enable: WayMask,
    /// Replacement state is updated at the clock edge.
    pub policy_update: bool,
    /// An `invalidate_all` request was accepted this cycle.
    pub invalidate_accepted: bool,
}
