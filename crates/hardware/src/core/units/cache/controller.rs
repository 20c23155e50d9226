//! Fetch/Fill Controller.
//!
//! The cycle-accurate state machine in front of the Line Store. Each call to
//! [`FetchController::tick`] is one clock cycle: outputs are computed from the
//! registered state and this cycle's inputs, then the state, the latched read
//! index, and any Line Store write are updated as at the clock edge.
//!
//! States:
//! - `Access`: steady state. The lookup uses the set index latched at the last
//!   edge; a hit delivers the window, a miss latches a [`FillTransaction`].
//! - `MissStall`: miss confirmed; the victim way is chosen.
//! - `FillRequest`: request strobe held until the fill engine accepts it.
//! - `FillWait`: waiting for acknowledgment and line data.
//! - `FillCommit`: the line is written into the victim way.
//! - `Drain`: an aborted fill is still on the bus. Hits are served, misses
//!   stall, and the acknowledged data is discarded.
//!
//! The Line Store read is synchronous: address-select picks the index that is
//! read at the edge and compared next cycle. If the latched index does not
//! match the current fetch address (after reset, or a redirect that bypassed
//! `next_pc`), the cycle is an index replay: stall once and re-index with the
//! current address.

use std::fmt;

use tracing::{debug, trace};

use super::datapath::{self, WayMask};
use super::line_store::{LineStore, LineWrite};
use super::policies::Replacement;
use super::CacheGeometry;
use crate::common::error::{CacheError, ConfigError};
use crate::common::{PhysAddr, VirtAddr};
use crate::config::CacheConfig;
use crate::core::pipeline::signals::{
    AddressSelect, BusSignals, FetchRequest, FetchResponse, FillRequest, SystemControl,
};
use crate::stats::CacheStats;

/// Controller state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FetchState {
    /// Steady state; lookups are served.
    #[default]
    Access,
    /// A miss was detected last cycle.
    MissStall,
    /// Fill request strobe asserted, not yet accepted.
    FillRequest,
    /// Fill accepted, waiting for acknowledgment.
    FillWait,
    /// Committing the acknowledged line.
    FillCommit,
    /// Waiting out an aborted fill; its data will be discarded.
    Drain,
}

impl FetchState {
    /// States in which the controller owns an outstanding fill.
    pub const fn is_filling(self) -> bool {
        matches!(
            self,
            Self::MissStall | Self::FillRequest | Self::FillWait | Self::FillCommit
        )
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Access => "ACCESS",
            Self::MissStall => "MISS-STALL",
            Self::FillRequest => "FILL-REQUEST",
            Self::FillWait => "FILL-WAIT",
            Self::FillCommit => "FILL-COMMIT",
            Self::Drain => "DRAIN",
        };
        f.write_str(name)
    }
}

/// The one outstanding fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillTransaction {
    /// Fetch address latched on the miss; the held address-select source.
    pub fetch_addr: VirtAddr,
    /// Line-aligned physical address driven on the bus.
    pub line_addr: PhysAddr,
    /// Target set.
    pub set: usize,
    /// Tag to commit.
    pub tag: u64,
    /// Victim way, chosen when the miss is confirmed.
    pub way: Option<usize>,
}

impl FillTransaction {
    fn victim_mask(&self) -> WayMask {
        self.way.map_or(WayMask::NONE, WayMask::one_hot)
    }
}

/// Next-state decision for one cycle.
#[derive(Clone, Copy, Debug)]
struct Step {
    next: FetchState,
    select: AddressSelect,
    index: usize,
}

/// Outcome of a lookup in `Access` or `Drain`.
#[derive(Clone, Copy, Debug)]
enum Served {
    Replay { set: usize },
    Hit { set: usize },
    Miss(FillTransaction),
}

/// Set-associative instruction cache with its fetch/fill state machine.
#[derive(Debug)]
pub struct FetchController {
    geometry: CacheGeometry,
    store: LineStore,
    replacement: Replacement,
    state: FetchState,
    read_index: Option<usize>,
    pending: Option<FillTransaction>,
    fill_buf: Vec<u8>,
    line_buf: Vec<u8>,
    stats: CacheStats,
}

impl FetchController {
    /// Creates a controller in reset state: all lines invalid, `Access`.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let geometry = CacheGeometry::new(config)?;
        let (sets, ways, line_bytes) = (geometry.sets(), geometry.ways(), geometry.line_bytes());
        Ok(Self {
            geometry,
            store: LineStore::new(sets, ways, line_bytes),
            replacement: Replacement::new(config.policy, sets, ways),
            state: FetchState::Access,
            read_index: None,
            pending: None,
            fill_buf: vec![0; line_bytes],
            line_buf: vec![0; line_bytes],
            stats: CacheStats::default(),
        })
    }

    /// Current state.
    pub const fn state(&self) -> FetchState {
        self.state
    }

    /// Validated geometry.
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// The outstanding fill, if any.
    pub const fn pending(&self) -> Option<FillTransaction> {
        self.pending
    }

    /// Set index latched at the last clock edge.
    pub const fn read_index(&self) -> Option<usize> {
        self.read_index
    }

    /// Read access to the Line Store.
    pub const fn line_store(&self) -> &LineStore {
        &self.store
    }

    /// Direct Line Store access, bypassing the fill path (preloading and fault injection).
    pub const fn line_store_mut(&mut self) -> &mut LineStore {
        &mut self.store
    }

    /// Counters accumulated since construction.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Synchronous reset: invalidates every line, clears replacement state,
    /// drops any fill, and returns to `Access`. Statistics are kept.
    pub fn reset(&mut self) {
        let dropped_fill = self.state.is_filling();
        self.store.invalidate_all();
        self.replacement.reset();
        self.state = FetchState::Access;
        self.read_index = None;
        self.pending = None;
        self.stats.resets += 1;
        debug!(dropped_fill, "icache reset");
    }

    /// Advances the controller by one clock cycle.
    ///
    /// `bus` is what the fill engine drives this cycle; the returned
    /// [`FetchResponse::fill_request`] is sampled by the engine at the edge.
    pub fn tick(
        &mut self,
        req: &FetchRequest,
        ctrl: SystemControl,
        bus: &BusSignals<'_>,
    ) -> Result<FetchResponse, CacheError> {
        if ctrl.reset {
            self.reset();
            return Ok(FetchResponse::default());
        }
        self.stats.cycles += 1;

        if bus.ack && !matches!(self.state, FetchState::FillWait | FetchState::Drain) {
            return Err(CacheError::SpuriousAcknowledge { state: self.state });
        }

        let mut out = FetchResponse::default();
        let step = match self.state {
            FetchState::Access => self.access_cycle(req, ctrl, &mut out)?,
            FetchState::MissStall => self.miss_stall_cycle(req, ctrl, &mut out),
            FetchState::FillRequest => self.fill_request_cycle(req, ctrl, bus, &mut out),
            FetchState::FillWait => self.fill_wait_cycle(req, ctrl, bus, &mut out)?,
            FetchState::FillCommit => self.fill_commit_cycle(req, ctrl, &mut out)?,
            FetchState::Drain => self.drain_cycle(req, ctrl, bus, &mut out)?,
        };

        trace!(
            state = %self.state,
            pc = %req.current_pc,
            stall = out.stall,
            hit = out.hit,
            "icache cycle"
        );
        if step.next != self.state {
            debug!(from = %self.state, to = %step.next, "icache state transition");
        }
        out.address_select = step.select;
        self.state = step.next;
        self.read_index = Some(step.index);
        if out.stall {
            self.stats.stall_cycles += 1;
        }
        Ok(out)
    }

    /// Leave for `Access`, indexing with the next PC.
    fn advance(&self, req: &FetchRequest) -> Step {
        Step {
            next: FetchState::Access,
            select: AddressSelect::Next,
            index: self.geometry.set_index(req.next_pc),
        }
    }

    /// Stay in `next`, holding the index of the outstanding fill.
    const fn hold(next: FetchState, txn: &FillTransaction) -> Step {
        Step {
            next,
            select: AddressSelect::Current,
            index: txn.set,
        }
    }

    /// Runs the datapath for the current fetch.
    fn serve(&mut self, req: &FetchRequest, out: &mut FetchResponse) -> Result<Served, CacheError> {
        let set = self.geometry.set_index(req.current_pc);
        if self.read_index != Some(set) {
            self.stats.replays += 1;
            out.stall = true;
            return Ok(Served::Replay { set });
        }

        let tag = self.geometry.tag(req.paddr);
        let offset = self.geometry.line_offset(req.paddr);
        let lookup = datapath::resolve(&self.store, set, tag, offset, &mut self.line_buf)?;
        out.hit_ways = lookup.hits;
        out.hit = lookup.hit();

        if let Some(way) = lookup.way() {
            self.replacement.touch(set, way);
            out.policy_update = true;
            out.word = lookup.window;
            // A busy pipeline sees the same window again next cycle.
            if req.pipeline_busy {
                self.stats.busy_holds += 1;
            } else {
                self.stats.hits += 1;
            }
            return Ok(Served::Hit { set });
        }

        out.stall = true;
        Ok(Served::Miss(FillTransaction {
            fetch_addr: req.current_pc,
            line_addr: self.geometry.line_base(req.paddr),
            set,
            tag,
            way: None,
        }))
    }

    /// Index for a served hit: hold while the pipeline is busy, else advance.
    fn after_hit(&self, req: &FetchRequest, set: usize, next: FetchState) -> Step {
        if req.pipeline_busy {
            Step {
                next,
                select: AddressSelect::Current,
                index: set,
            }
        } else {
            Step {
                next,
                ..self.advance(req)
            }
        }
    }

    fn access_cycle(
        &mut self,
        req: &FetchRequest,
        ctrl: SystemControl,
        out: &mut FetchResponse,
    ) -> Result<Step, CacheError> {
        let step = if ctrl.ignore_request {
            self.advance(req)
        } else {
            match self.serve(req, out)? {
                Served::Replay { set } => Step {
                    next: FetchState::Access,
                    select: AddressSelect::Current,
                    index: set,
                },
                Served::Hit { set } => self.after_hit(req, set, FetchState::Access),
                Served::Miss(txn) => {
                    self.stats.misses += 1;
                    debug!(pc = %txn.fetch_addr, line = %txn.line_addr, set = txn.set, "icache miss");
                    self.pending = Some(txn);
                    Self::hold(FetchState::MissStall, &txn)
                }
            }
        };

        if ctrl.invalidate_all {
            self.store.invalidate_all();
            out.invalidate_accepted = true;
            self.stats.invalidations += 1;
            debug!("icache invalidate-all accepted");
        }
        Ok(step)
    }

    fn miss_stall_cycle(
        &mut self,
        req: &FetchRequest,
        ctrl: SystemControl,
        out: &mut FetchResponse,
    ) -> Step {
        let Some(mut txn) = self.pending else {
            return self.advance(req);
        };
        if ctrl.ignore_request {
            self.pending = None;
            self.stats.misses_dropped += 1;
            debug!(line = %txn.line_addr, "miss dropped by ignore-request");
            return self.advance(req);
        }

        out.stall = true;
        let victim = self
            .replacement
            .victim(txn.set, self.store.valid_mask(txn.set));
        out.victim = victim;
        txn.way = victim.first();
        self.pending = Some(txn);
        Self::hold(FetchState::FillRequest, &txn)
    }

    fn fill_request_cycle(
        &mut self,
        req: &FetchRequest,
        ctrl: SystemControl,
        bus: &BusSignals<'_>,
        out: &mut FetchResponse,
    ) -> Step {
        let Some(txn) = self.pending else {
            return self.advance(req);
        };
        if ctrl.ignore_request {
            self.pending = None;
            self.stats.fills_aborted += 1;
            debug!(line = %txn.line_addr, "fill request withdrawn before acceptance");
            return self.advance(req);
        }

        out.stall = true;
        out.victim = txn.victim_mask();
        out.fill_request = Some(FillRequest {
            line_addr: txn.line_addr,
        });
        if bus.ready {
            self.stats.fills_requested += 1;
            debug!(line = %txn.line_addr, way = ?txn.way, "fill request accepted");
            Self::hold(FetchState::FillWait, &txn)
        } else {
            Self::hold(FetchState::FillRequest, &txn)
        }
    }

    fn fill_wait_cycle(
        &mut self,
        req: &FetchRequest,
        ctrl: SystemControl,
        bus: &BusSignals<'_>,
        out: &mut FetchResponse,
    ) -> Result<Step, CacheError> {
        let Some(txn) = self.pending else {
            return Ok(self.advance(req));
        };
        if ctrl.ignore_request {
            self.pending = None;
            self.stats.fills_aborted += 1;
            if bus.ack {
                debug!(line = %txn.line_addr, "fill data discarded on abort");
                return Ok(self.advance(req));
            }
            debug!(line = %txn.line_addr, "fill aborted, draining bus");
            return Ok(Step {
                next: FetchState::Drain,
                ..self.advance(req)
            });
        }

        out.stall = true;
        out.victim = txn.victim_mask();
        if !bus.ack {
            return Ok(Self::hold(FetchState::FillWait, &txn));
        }
        if bus.data.len() != self.fill_buf.len() {
            return Err(CacheError::ShortFill {
                expected: self.fill_buf.len(),
                actual: bus.data.len(),
            });
        }
        self.fill_buf.copy_from_slice(bus.data);
        Ok(Self::hold(FetchState::FillCommit, &txn))
    }

    fn fill_commit_cycle(
        &mut self,
        req: &FetchRequest,
        ctrl: SystemControl,
        out: &mut FetchResponse,
    ) -> Result<Step, CacheError> {
        let Some(txn) = self.pending.take() else {
            return Ok(self.advance(req));
        };

        // A way already holding this tag is overwritten in place.
        let way = datapath::compare_tags(self.store.read(txn.set), txn.tag)
            .first()
            .or(txn.way)
            .unwrap_or(0);
        self.store.write(&LineWrite {
            set: txn.set,
            way,
            tag: txn.tag,
            data: &self.fill_buf,
        })?;
        self.replacement.commit(txn.set, way);
        out.write_enable = WayMask::one_hot(way);
        out.victim = WayMask::one_hot(way);
        out.policy_update = true;
        self.stats.fills_committed += 1;
        debug!(line = %txn.line_addr, set = txn.set, way, "fill committed");

        if ctrl.ignore_request {
            return Ok(self.advance(req));
        }
        out.stall = true;
        Ok(Self::hold(FetchState::Access, &txn))
    }

    fn drain_cycle(
        &mut self,
        req: &FetchRequest,
        ctrl: SystemControl,
        bus: &BusSignals<'_>,
        out: &mut FetchResponse,
    ) -> Result<Step, CacheError> {
        let next = if bus.ack {
            debug!("aborted fill drained");
            FetchState::Access
        } else {
            FetchState::Drain
        };
        if ctrl.ignore_request {
            return Ok(Step {
                next,
                ..self.advance(req)
            });
        }

        // No fill can start until the bus is free; a miss just stalls and is
        // detected again from `Access`.
        Ok(match self.serve(req, out)? {
            Served::Replay { set } => Step {
                next,
                select: AddressSelect::Current,
                index: set,
            },
            Served::Hit { set } => self.after_hit(req, set, next),
            Served::Miss(txn) => Step {
                next,
                select: AddressSelect::Current,
                index: txn.set,
            },
        })
    }
}
