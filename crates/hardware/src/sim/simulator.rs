//! Simulator: owns the controller, its fill engine, and the fetch stage side-by-side.
//!
//! One [`Simulator::tick`] is one clock cycle:
//! 1. Scheduled events for the cycle are applied (invalidate, flush, busy, reset).
//! 2. The fill engine's signals and the fetch request are handed to the controller.
//! 3. The controller's fill strobe clocks the engine.
//! 4. A delivered word retires the current fetch address.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::common::VirtAddr;
use crate::common::error::SimError;
use crate::config::Config;
use crate::core::pipeline::signals::{FetchRequest, FetchResponse, SystemControl};
use crate::core::units::cache::{FetchController, InstructionWindow};
use crate::sim::fetch::FetchStream;
use crate::soc::fill::LatencyFillEngine;
use crate::soc::memory::Memory;
use crate::soc::memory::controller as timing;
use crate::soc::traits::FillEngine;
use crate::soc::translate::{AddressTranslator, IdentityTranslator};
use crate::stats::CacheStats;

/// Externally driven control applied at a given cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimEvent {
    /// Request invalidate-all; held until the controller accepts it.
    InvalidateAll,
    /// Assert ignore-request for one cycle, optionally redirecting the fetch stage.
    Flush {
        /// New fetch address; `None` retries the current one.
        redirect: Option<VirtAddr>,
    },
    /// Hold the pipeline busy for this many cycles.
    Busy {
        /// Number of busy cycles.
        cycles: u64,
    },
    /// Synchronous reset of the controller and fill engine.
    Reset,
}

/// One instruction window handed to the fetch stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchRecord {
    /// Cycle the word was delivered.
    pub cycle: u64,
    /// Fetch address.
    pub pc: VirtAddr,
    /// Delivered window.
    pub window: InstructionWindow,
}

/// Top-level simulator.
#[derive(Debug)]
pub struct Simulator {
    controller: FetchController,
    engine: Box<dyn FillEngine>,
    translator: Box<dyn AddressTranslator>,
    stream: FetchStream,
    events: BTreeMap<u64, Vec<SimEvent>>,
    cycle: u64,
    busy_until: u64,
    invalidate_pending: bool,
    records: Vec<FetchRecord>,
    max_cycles: u64,
    trace_fetches: bool,
}

impl Simulator {
    /// Builds a simulator with a latency fill engine over `memory` and identity translation.
    pub fn new(config: &Config, memory: Memory, stream: FetchStream) -> Result<Self, SimError> {
        config.validate()?;
        let controller = FetchController::new(&config.cache)?;
        let engine = LatencyFillEngine::new(
            memory,
            timing::from_config(&config.fill),
            controller.geometry().line_bytes(),
        );
        Ok(Self {
            controller,
            engine: Box::new(engine),
            translator: Box::new(IdentityTranslator),
            stream,
            events: BTreeMap::new(),
            cycle: 0,
            busy_until: 0,
            invalidate_pending: false,
            records: Vec::new(),
            max_cycles: config.general.max_cycles,
            trace_fetches: config.general.trace_fetches,
        })
    }

    /// Replaces the address translator.
    #[must_use]
    pub fn with_translator(mut self, translator: Box<dyn AddressTranslator>) -> Self {
        self.translator = translator;
        self
    }

    /// Replaces the fill engine.
    #[must_use]
    pub fn with_fill_engine(mut self, engine: Box<dyn FillEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Queues `event` for `cycle`.
    pub fn schedule(&mut self, cycle: u64, event: SimEvent) {
        self.events.entry(cycle).or_default().push(event);
    }

    /// Requests invalidate-all starting at `cycle`.
    pub fn invalidate_at(&mut self, cycle: u64) {
        self.schedule(cycle, SimEvent::InvalidateAll);
    }

    /// Flushes the in-flight fetch at `cycle`.
    pub fn flush_at(&mut self, cycle: u64, redirect: Option<VirtAddr>) {
        self.schedule(cycle, SimEvent::Flush { redirect });
    }

    /// Holds the pipeline busy for `cycles` cycles from `cycle`.
    pub fn busy_at(&mut self, cycle: u64, cycles: u64) {
        self.schedule(cycle, SimEvent::Busy { cycles });
    }

    /// Resets the controller at `cycle`.
    pub fn reset_at(&mut self, cycle: u64) {
        self.schedule(cycle, SimEvent::Reset);
    }

    /// Cycles simulated so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The cache controller.
    pub const fn controller(&self) -> &FetchController {
        &self.controller
    }

    /// Mutable controller access (preloading lines).
    pub const fn controller_mut(&mut self) -> &mut FetchController {
        &mut self.controller
    }

    /// The fetch stage.
    pub const fn stream(&self) -> &FetchStream {
        &self.stream
    }

    /// Every delivered window, in order.
    pub fn records(&self) -> &[FetchRecord] {
        &self.records
    }

    /// Controller statistics.
    pub const fn stats(&self) -> &CacheStats {
        self.controller.stats()
    }

    /// True once the fetch stream is exhausted.
    pub fn is_done(&self) -> bool {
        self.stream.is_done()
    }

    /// Advances one clock cycle. Returns `false` once the stream is exhausted.
    pub fn tick(&mut self) -> Result<bool, SimError> {
        let Some(current) = self.stream.current() else {
            return Ok(false);
        };
        let cycle = self.cycle;

        let mut flush = None;
        let mut reset = false;
        for event in self.events.remove(&cycle).unwrap_or_default() {
            match event {
                SimEvent::InvalidateAll => self.invalidate_pending = true,
                SimEvent::Flush { redirect } => flush = Some(redirect),
                SimEvent::Busy { cycles } => self.busy_until = cycle.saturating_add(cycles),
                SimEvent::Reset => reset = true,
            }
        }

        // A flush announces its target so the Line Store is indexed with it.
        let next_pc = match flush {
            Some(Some(target)) => target,
            Some(None) => current,
            None => self.stream.peek_next(),
        };
        let busy = cycle < self.busy_until;
        let req = FetchRequest {
            next_pc,
            current_pc: current,
            paddr: self.translator.translate(current),
            pipeline_busy: busy,
        };
        let ctrl = SystemControl {
            invalidate_all: self.invalidate_pending,
            ignore_request: flush.is_some(),
            reset,
        };

        let resp = {
            let bus = self.engine.signals();
            self.controller.tick(&req, ctrl, &bus)?
        };
        self.engine.tick(resp.fill_request);
        if reset {
            self.engine.reset();
        }
        if resp.invalidate_accepted {
            self.invalidate_pending = false;
        }

        trace!(
            cycle,
            pc = %current,
            state = %self.controller.state(),
            stall = resp.stall,
            "sim cycle"
        );
        self.retire(cycle, current, flush, busy, &resp);
        self.cycle += 1;
        Ok(!self.stream.is_done())
    }

    fn retire(
        &mut self,
        cycle: u64,
        pc: VirtAddr,
        flush: Option<Option<VirtAddr>>,
        busy: bool,
        resp: &FetchResponse,
    ) {
        if let Some(Some(target)) = flush {
            self.stream.redirect(target);
            return;
        }
        if flush.is_some() || busy || resp.stall {
            return;
        }
        if let Some(window) = resp.word {
            if self.trace_fetches {
                debug!(cycle, pc = %pc, bits = format_args!("{:#010x}", window.bits), "fetch delivered");
            }
            self.records.push(FetchRecord { cycle, pc, window });
            self.stream.advance();
        }
    }

    /// Runs until the stream is exhausted or the cycle limit is reached.
    ///
    /// Returns the number of cycles simulated.
    pub fn run(&mut self) -> Result<u64, SimError> {
        while self.cycle < self.max_cycles && self.tick()? {}
        if !self.stream.is_done() {
            debug!(
                cycles = self.cycle,
                remaining = self.stream.remaining(),
                "cycle limit reached"
            );
        }
        Ok(self.cycle)
    }
}
