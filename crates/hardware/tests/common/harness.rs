use icache_core::common::error::CacheError;
use icache_core::config::{CacheConfig, ReplacementPolicy};
use icache_core::core::pipeline::signals::{FetchRequest, FetchResponse, SystemControl};
use icache_core::core::units::cache::{FetchController, FetchState, InstructionWindow};
use icache_core::soc::fill::LatencyFillEngine;
use icache_core::soc::memory::Memory;
use icache_core::soc::traits::FillEngine;

use super::{init_tracing, patterned_memory};

/// Memory the harness fills from: 64 KiB of patterned bytes at address 0.
pub const HARNESS_MEMORY: usize = 64 * 1024;

/// Give up on a fetch after this many cycles.
const FETCH_TIMEOUT: u64 = 1_000;

/// A controller wired to a latency fill engine, stepped one cycle at a time.
///
/// Unlike the simulator there is no fetch stream: each step takes the exact
/// request and control signals the test wants on the wires.
pub struct CacheHarness {
    pub ctrl: FetchController,
    pub engine: LatencyFillEngine,
    pub cycle: u64,
}

impl CacheHarness {
    pub fn new(cache: &CacheConfig, latency: u64) -> Self {
        init_tracing();
        let ctrl = FetchController::new(cache).expect("valid geometry");
        let memory = patterned_memory(0, HARNESS_MEMORY);
        let engine = LatencyFillEngine::with_latency(memory, latency, cache.line_bytes);
        Self {
            ctrl,
            engine,
            cycle: 0,
        }
    }

    /// The 4-way, 16-set, 16-byte-line LRU cache with a 2-cycle fill.
    pub fn standard() -> Self {
        Self::new(&Self::cache(16, 4, 16, ReplacementPolicy::Lru), 2)
    }

    pub fn cache(sets: usize, ways: usize, line_bytes: usize, policy: ReplacementPolicy) -> CacheConfig {
        CacheConfig {
            sets,
            ways,
            line_bytes,
            policy,
        }
    }

    pub fn memory(&self) -> &Memory {
        self.engine.memory()
    }

    pub fn state(&self) -> FetchState {
        self.ctrl.state()
    }

    pub fn try_step(
        &mut self,
        req: FetchRequest,
        sys: SystemControl,
    ) -> Result<FetchResponse, CacheError> {
        let resp = {
            let bus = self.engine.signals();
            self.ctrl.tick(&req, sys, &bus)?
        };
        self.engine.tick(resp.fill_request);
        if sys.reset {
            self.engine.reset();
        }
        self.cycle += 1;
        Ok(resp)
    }

    pub fn step(&mut self, req: FetchRequest, sys: SystemControl) -> FetchResponse {
        self.try_step(req, sys).expect("protocol violation")
    }

    /// One ignored cycle announcing `pc`, so the next cycle's lookup is not a replay.
    pub fn prime(&mut self, pc: u64) {
        let resp = self.step(FetchRequest::identity(pc, pc), SystemControl::IGNORE);
        assert!(!resp.stall);
    }

    /// Presents `pc` (with `next` announced) until a word is delivered.
    ///
    /// Returns the window and the number of stall cycles spent.
    pub fn fetch(&mut self, pc: u64, next: u64) -> (InstructionWindow, u64) {
        let mut stalls = 0;
        for _ in 0..FETCH_TIMEOUT {
            let resp = self.step(FetchRequest::identity(pc, next), SystemControl::NONE);
            if let Some(word) = resp.word {
                assert!(!resp.stall, "word delivered under stall");
                return (word, stalls);
            }
            assert!(resp.stall, "no word and no stall at pc {pc:#x}");
            stalls += 1;
        }
        panic!("fetch of {pc:#x} did not complete in {FETCH_TIMEOUT} cycles");
    }

    /// Little-endian window the memory holds at `pc`, clipped to its line.
    pub fn expected_window(&self, pc: u64) -> InstructionWindow {
        let line_bytes = self.ctrl.geometry().line_bytes() as u64;
        let lower = self.memory().read_u16(pc).expect("in memory");
        let upper_in_line = (pc % line_bytes) + 2 < line_bytes;
        let upper = if upper_in_line {
            self.memory().read_u16(pc + 2).expect("in memory")
        } else {
            0
        };
        InstructionWindow {
            bits: u32::from(lower) | (u32::from(upper) << 16),
            upper_valid: upper_in_line,
        }
    }
}
