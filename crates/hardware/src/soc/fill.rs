//! Latency-modeled fill engine.
//!
//! Answers one line request at a time from [`Memory`]. The engine is `ready`
//! while idle; a request accepted at a clock edge keeps it busy for the
//! latency reported by its [`MemoryTiming`] model, after which `ack` is held
//! for exactly one cycle with the whole line on `data`.

use tracing::debug;

use super::memory::Memory;
use super::memory::controller::{MemoryTiming, SimpleController};
use super::traits::FillEngine;
use crate::common::PhysAddr;
use crate::core::pipeline::signals::{BusSignals, FillRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EngineState {
    Idle,
    Busy { line_addr: PhysAddr, remaining: u64 },
    Respond { line_addr: PhysAddr },
}

/// Fill engine with per-line latency.
#[derive(Debug)]
pub struct LatencyFillEngine {
    memory: Memory,
    timing: Box<dyn MemoryTiming>,
    state: EngineState,
    line: Vec<u8>,
    served: u64,
}

impl LatencyFillEngine {
    /// Creates an idle engine returning `line_bytes`-byte lines from `memory`.
    pub fn new(memory: Memory, timing: Box<dyn MemoryTiming>, line_bytes: usize) -> Self {
        Self {
            memory,
            timing,
            state: EngineState::Idle,
            line: vec![0; line_bytes],
            served: 0,
        }
    }

    /// Creates an engine with a fixed latency.
    pub fn with_latency(memory: Memory, latency: u64, line_bytes: usize) -> Self {
        Self::new(memory, Box::new(SimpleController::new(latency)), line_bytes)
    }

    /// Backing memory.
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable backing memory, e.g. to patch code between runs.
    pub const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// True when no request is in flight.
    pub fn is_idle(&self) -> bool {
        self.state == EngineState::Idle
    }

    /// Lines acknowledged so far.
    pub const fn lines_served(&self) -> u64 {
        self.served
    }
}

impl FillEngine for LatencyFillEngine {
    fn signals(&self) -> BusSignals<'_> {
        match self.state {
            EngineState::Idle => BusSignals {
                ready: true,
                ack: false,
                data: &[],
            },
            EngineState::Busy { .. } => BusSignals {
                ready: false,
                ack: false,
                data: &[],
            },
            EngineState::Respond { .. } => BusSignals {
                ready: false,
                ack: true,
                data: &self.line,
            },
        }
    }

    fn tick(&mut self, request: Option<FillRequest>) {
        self.state = match self.state {
            EngineState::Idle => match request {
                Some(req) => {
                    let latency = self.timing.access_latency(req.line_addr);
                    let in_memory = self.memory.read_line(req.line_addr, &mut self.line);
                    debug!(line = %req.line_addr, latency, in_memory, "fill engine accepted request");
                    if latency == 0 {
                        EngineState::Respond {
                            line_addr: req.line_addr,
                        }
                    } else {
                        EngineState::Busy {
                            line_addr: req.line_addr,
                            remaining: latency,
                        }
                    }
                }
                None => EngineState::Idle,
            },
            EngineState::Busy {
                line_addr,
                remaining: 1,
            } => EngineState::Respond { line_addr },
            EngineState::Busy {
                line_addr,
                remaining,
            } => EngineState::Busy {
                line_addr,
                remaining: remaining - 1,
            },
            EngineState::Respond { line_addr } => {
                self.served += 1;
                debug!(line = %line_addr, "fill engine acknowledged");
                EngineState::Idle
            }
        };
    }

    fn reset(&mut self) {
        self.state = EngineState::Idle;
        self.timing.reset();
    }
}
