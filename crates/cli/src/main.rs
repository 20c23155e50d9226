//! Instruction-fetch cache simulator CLI.
//!
//! This binary drives the cache model over a program image and a fetch stream. It performs:
//! 1. **Setup:** Loads a JSON configuration and a raw or ELF program image.
//! 2. **Stream selection:** A fetch trace file, a sequential run, or a walk over the loaded code.
//! 3. **Run:** Ticks the simulator to completion, with optional invalidate/flush events.
//! 4. **Report:** Prints the sectioned statistics report or a JSON summary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::{fs, num::ParseIntError};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use icache_core::common::error::SimError;
use icache_core::common::VirtAddr;
use icache_core::config::Config;
use icache_core::sim::loader;
use icache_core::sim::{FetchStream, Simulator};
use icache_core::soc::Memory;
use icache_core::stats::CacheStats;

#[derive(Parser, Debug)]
#[command(
    name = "icache-sim",
    author,
    version,
    about = "Cycle-accurate instruction-fetch cache simulator",
    long_about = "Run a fetch stream through a set-associative instruction cache and its fetch/fill controller.\n\nExamples:\n  icache-sim run --image prog.bin --walk 1000\n  icache-sim run --config cache.json --image prog.elf --trace fetches.txt --json\n  RUST_LOG=icache_core=debug icache-sim run --image prog.bin --sequential 64"
)]
struct Cli {
    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a fetch stream through the cache.
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// JSON configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Program image (raw binary at the memory base, or ELF).
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Fetch trace: one address per line.
    #[arg(short, long, conflicts_with_all = ["sequential", "walk"])]
    trace: Option<PathBuf>,

    /// Fetch this many sequential 4-byte-spaced addresses from `--start`.
    #[arg(long, conflicts_with = "walk")]
    sequential: Option<usize>,

    /// Walk this many instructions of the loaded code from `--start`.
    #[arg(long)]
    walk: Option<usize>,

    /// First fetch address; defaults to the image entry point.
    #[arg(long, value_parser = parse_addr)]
    start: Option<u64>,

    /// Request invalidate-all at these cycles.
    #[arg(long = "invalidate-at", value_name = "CYCLE")]
    invalidate_at: Vec<u64>,

    /// Flush (ignore-request) at these cycles, retrying the current fetch.
    #[arg(long = "flush-at", value_name = "CYCLE")]
    flush_at: Vec<u64>,

    /// Log every delivered fetch at debug level.
    #[arg(long)]
    trace_log: bool,

    /// Print a JSON summary instead of the text report.
    #[arg(long)]
    json: bool,

    /// Report sections to print (summary, lookup, fill); all when omitted.
    #[arg(long, value_delimiter = ',')]
    sections: Vec<String>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    cycles: u64,
    fetches: usize,
    remaining: usize,
    hit_rate: f64,
    stats: &'a CacheStats,
}

fn parse_addr(text: &str) -> Result<u64, ParseIntError> {
    let text = text.trim().replace('_', "");
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    }
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Run(args) => cmd_run(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n[!] FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, SimError> {
    match path {
        Some(path) => Ok(Config::from_json(&fs::read_to_string(path)?)?),
        None => Ok(Config::default()),
    }
}

/// Loads the image, builds the fetch stream, runs to completion, and reports.
fn cmd_run(args: RunArgs) -> Result<(), SimError> {
    let mut config = load_config(args.config.as_ref())?;
    config.general.trace_fetches |= args.trace_log;

    let mut memory = Memory::from_config(&config.memory);
    let entry = match &args.image {
        Some(path) => loader::load_image(&mut memory, path)?,
        None => memory.base(),
    };
    let start = args.start.unwrap_or(entry);

    let addrs = if let Some(path) = &args.trace {
        loader::read_trace(path)?
    } else if let Some(count) = args.sequential {
        loader::sequential(start, count, 4)
    } else {
        loader::walk_program(&memory, start, args.walk.unwrap_or(256))
    };

    println!(
        "Cache: {} sets x {} ways x {} B ({:?})  Fill: {:?} latency {}  Fetches: {}",
        config.cache.sets,
        config.cache.ways,
        config.cache.line_bytes,
        config.cache.policy,
        config.fill.controller,
        config.fill.latency,
        addrs.len()
    );

    let mut sim = Simulator::new(&config, memory, FetchStream::from_addrs(addrs))?;
    for &cycle in &args.invalidate_at {
        sim.invalidate_at(cycle);
    }
    for &cycle in &args.flush_at {
        sim.flush_at(cycle, None::<VirtAddr>);
    }

    let cycles = sim.run()?;
    info!(cycles, fetches = sim.records().len(), "run finished");

    if args.json {
        let report = RunReport {
            cycles,
            fetches: sim.records().len(),
            remaining: sim.stream().remaining(),
            hit_rate: sim.stats().hit_rate(),
            stats: sim.stats(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.sections.is_empty() {
        sim.stats().print();
    } else {
        sim.stats().print_sections(&args.sections);
    }
    Ok(())
}
