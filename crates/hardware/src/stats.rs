//! Cache statistics collection and reporting.
//!
//! This module tracks what the fetch/fill controller did over a run. It provides:
//! 1. **Lookups:** Hits, misses, and index replays.
//! 2. **Fills:** Requests accepted, lines committed, and fills aborted or dropped.
//! 3. **Stalls:** Cycles the fetch stage was held.
//! 4. **Maintenance:** Invalidate-all and reset counts.

use std::time::Instant;

use serde::Serialize;

/// Counters for one controller instance.
///
/// Counters survive [`crate::FetchController::reset`]; only the Line Store and
/// replacement state are cleared there.
#[derive(Clone, Debug, Serialize)]
pub struct CacheStats {
    #[serde(skip)]
    start_time: Instant,
    /// Cycles ticked, excluding reset cycles.
    pub cycles: u64,
    /// Lookups that hit and delivered a window to a ready fetch stage.
    pub hits: u64,
    /// Hit cycles repeated because the pipeline was busy.
    pub busy_holds: u64,
    /// Lookups that missed and started a fill.
    pub misses: u64,
    /// Misses abandoned before a request was issued.
    pub misses_dropped: u64,
    /// Stall cycles spent re-indexing after a redirect or reset.
    pub replays: u64,
    /// Fill requests accepted by the fill engine.
    pub fills_requested: u64,
    /// Lines written into the Line Store.
    pub fills_committed: u64,
    /// Fills abandoned after the request was raised.
    pub fills_aborted: u64,
    /// Cycles with the stall output asserted.
    pub stall_cycles: u64,
    /// Accepted invalidate-all requests.
    pub invalidations: u64,
    /// Synchronous resets applied.
    pub resets: u64,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            hits: 0,
            busy_holds: 0,
            misses: 0,
            misses_dropped: 0,
            replays: 0,
            fills_requested: 0,
            fills_committed: 0,
            fills_aborted: 0,
            stall_cycles: 0,
            invalidations: 0,
            resets: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"lookup"`, `"fill"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "lookup", "fill"];

impl CacheStats {
    /// Lookups that produced a hit or a miss. Replays are not lookups.
    pub const fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of lookups that hit, `0.0` before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1) as f64;

        if want("summary") {
            let khz = if seconds > 0.0 {
                (self.cycles as f64 / seconds) / 1000.0
            } else {
                0.0
            };
            println!("\n==========================================================");
            println!("INSTRUCTION CACHE SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {khz:.2} kHz");
            println!(
                "stall_cycles             {} ({:.2}%)",
                self.stall_cycles,
                (self.stall_cycles as f64 / cyc) * 100.0
            );
            println!("----------------------------------------------------------");
        }
        if want("lookup") {
            println!("LOOKUP");
            println!("  accesses               {}", self.accesses());
            println!("  hits                   {}", self.hits);
            println!("  misses                 {}", self.misses);
            println!("  hit_rate               {:.2}%", self.hit_rate() * 100.0);
            println!("  replays                {}", self.replays);
            println!("  busy_holds             {}", self.busy_holds);
            println!("----------------------------------------------------------");
        }
        if want("fill") {
            println!("FILL");
            println!("  requested              {}", self.fills_requested);
            println!("  committed              {}", self.fills_committed);
            println!("  aborted                {}", self.fills_aborted);
            println!("  misses_dropped         {}", self.misses_dropped);
            println!("  invalidations          {}", self.invalidations);
            println!("  resets                 {}", self.resets);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
