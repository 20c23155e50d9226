//! Configuration system for the cache model.
//!
//! This module defines the configuration structures used to parameterize the
//! model. It provides:
//! 1. **Defaults:** Baseline geometry, fill latency, and memory map constants.
//! 2. **Structures:** General, cache, fill, and memory configuration.
//! 3. **Validation:** Geometry checks that reject caches the controller cannot index.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built from `Config::default()`.

use serde::Deserialize;

use crate::common::error::ConfigError;
use crate::core::units::cache::CacheGeometry;

/// Default configuration constants for the model.
mod defaults {
    /// Number of sets (lines per way).
    pub const CACHE_SETS: usize = 16;

    /// Default associativity.
    pub const CACHE_WAYS: usize = 4;

    /// Default line size in bytes.
    pub const CACHE_LINE: usize = 16;

    /// Cycles the fill engine stays busy between accepting a request and acknowledging it.
    pub const FILL_LATENCY: u64 = 4;

    /// Base address of backing memory (2 GiB).
    pub const MEMORY_BASE: u64 = 0x8000_0000;

    /// Size of backing memory (64 KiB).
    pub const MEMORY_SIZE: usize = 64 * 1024;

    /// Cycle limit for a simulation run.
    pub const MAX_CYCLES: u64 = 1_000_000;

    /// Default DRAM column access strobe latency (cycles).
    pub const T_CAS: u64 = 14;

    /// Default DRAM row access strobe latency (cycles).
    pub const T_RAS: u64 = 14;

    /// Default DRAM precharge latency (cycles).
    pub const T_PRE: u64 = 14;
}

/// Memory controller models behind the fill engine.
///
/// Specifies how many busy cycles a line fill takes before acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum MemoryController {
    /// Every fill takes `FillConfig::latency` cycles.
    #[default]
    Simple,
    /// DRAM controller with row buffer modeling.
    ///
    /// A fill to the open row costs `t_cas`; a row change adds precharge and
    /// row activation.
    #[serde(alias = "DRAM")]
    Dram,
}

/// Cache replacement policy algorithms.
///
/// Every policy is deterministic: the same sequence of hits and fills to a set
/// always yields the same victim sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// True least-recently-used ordering per set.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Bit pseudo-LRU: one MRU bit per way, cleared when all are set.
    #[serde(alias = "Plru")]
    Plru,
    /// Round-robin replacement in fill order.
    #[serde(alias = "Fifo")]
    Fifo,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use icache_core::config::{Config, ReplacementPolicy};
///
/// let json = r#"{
///     "cache": { "sets": 32, "ways": 2, "line_bytes": 32, "policy": "Plru" },
///     "fill": { "latency": 10 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cache.sets, 32);
/// assert_eq!(config.cache.policy, ReplacementPolicy::Plru);
/// assert_eq!(config.fill.latency, 10);
/// assert_eq!(config.memory.base, 0x8000_0000);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General run settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Cache geometry and replacement policy
    #[serde(default)]
    pub cache: CacheConfig,
    /// Fill engine timing
    #[serde(default)]
    pub fill: FillConfig,
    /// Backing memory map
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses and validates a JSON configuration document.
    ///
    /// Missing sections and fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a buildable cache and memory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = CacheGeometry::new(&self.cache)?;
        if self.memory.size == 0 {
            return Err(ConfigError::EmptyMemory);
        }
        Ok(())
    }
}

/// General run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Log every delivered fetch at debug level.
    #[serde(default)]
    pub trace_fetches: bool,

    /// Stop a run after this many cycles even if the fetch stream has not drained.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_fetches: false,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// Cache geometry and replacement configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Number of sets (lines per way); power of two
    #[serde(default = "CacheConfig::default_sets")]
    pub sets: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Line size in bytes; power of two, at least one instruction
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Replacement policy
    #[serde(default)]
    pub policy: ReplacementPolicy,
}

impl CacheConfig {
    /// Returns the default number of sets.
    fn default_sets() -> usize {
        defaults::CACHE_SETS
    }

    /// Returns the default associativity.
    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Returns the default line size in bytes.
    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Total data capacity in bytes.
    pub const fn capacity_bytes(&self) -> usize {
        self.sets * self.ways * self.line_bytes
    }
}

impl Default for CacheConfig {
    /// 4-way, 16-set, 16-byte-line LRU cache (1 KiB).
    fn default() -> Self {
        Self {
            sets: defaults::CACHE_SETS,
            ways: defaults::CACHE_WAYS,
            line_bytes: defaults::CACHE_LINE,
            policy: ReplacementPolicy::default(),
        }
    }
}

/// Fill engine timing.
#[derive(Debug, Clone, Deserialize)]
pub struct FillConfig {
    /// Latency model
    #[serde(default)]
    pub controller: MemoryController,

    /// Busy cycles between request acceptance and the acknowledge cycle (`Simple`)
    #[serde(default = "FillConfig::default_latency")]
    pub latency: u64,

    /// Column access strobe latency (`Dram`)
    #[serde(default = "FillConfig::default_t_cas")]
    pub t_cas: u64,

    /// Row access strobe latency (`Dram`)
    #[serde(default = "FillConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency (`Dram`)
    #[serde(default = "FillConfig::default_t_pre")]
    pub t_pre: u64,
}

impl FillConfig {
    fn default_latency() -> u64 {
        defaults::FILL_LATENCY
    }

    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    fn default_t_pre() -> u64 {
        defaults::T_PRE
    }
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            controller: MemoryController::default(),
            latency: defaults::FILL_LATENCY,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
        }
    }
}

/// Backing memory map.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Physical base address of backing memory
    #[serde(default = "MemoryConfig::default_base")]
    pub base: u64,

    /// Size of backing memory in bytes
    #[serde(default = "MemoryConfig::default_size")]
    pub size: usize,
}

impl MemoryConfig {
    fn default_base() -> u64 {
        defaults::MEMORY_BASE
    }

    fn default_size() -> usize {
        defaults::MEMORY_SIZE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base: defaults::MEMORY_BASE,
            size: defaults::MEMORY_SIZE,
        }
    }
}
