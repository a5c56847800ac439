//! Configuration Module
//!
//! Cache options and demo server settings, loaded from environment variables
//! or deserialized from an options object.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::CacheError;

/// Freshness window of the demo server's cache.
pub const DEMO_DELAY_MS: u64 = 3000;

/// Interval between verbose map dumps when not configured otherwise.
pub const DEFAULT_DUMP_INTERVAL_MS: u64 = 400;

/// Upper bound a coalesced request waits on the in-flight leader.
pub const DEFAULT_COALESCE_TIMEOUT_MS: u64 = 5000;

// == Debug Mode ==
/// Diagnostic logging level of a cache instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DebugMode {
    /// No cache diagnostics
    #[default]
    Off,
    /// Log hits and commits
    On,
    /// Log hits and commits, and dump the whole map periodically
    Verbose,
}

impl DebugMode {
    pub fn is_enabled(self) -> bool {
        self != DebugMode::Off
    }

    pub fn is_verbose(self) -> bool {
        self == DebugMode::Verbose
    }
}

impl FromStr for DebugMode {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "off" | "false" | "0" | "no" => Ok(DebugMode::Off),
            "on" | "true" | "1" | "yes" => Ok(DebugMode::On),
            "verbose" => Ok(DebugMode::Verbose),
            other => Err(CacheError::InvalidConfig(format!(
                "unrecognized debug mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DebugMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DebugMode::Off => "off",
            DebugMode::On => "on",
            DebugMode::Verbose => "verbose",
        };
        f.write_str(name)
    }
}

/// Accepts `true`/`false` as well as the mode names.
impl<'de> Deserialize<'de> for DebugMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(DebugMode::On),
            Raw::Flag(false) => Ok(DebugMode::Off),
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

// == Cache Config ==
/// Options for one [`RequestCache`](crate::RequestCache) instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Freshness window in milliseconds; 0 means every lookup misses
    #[serde(alias = "delay", deserialize_with = "deserialize_delay")]
    pub delay_ms: u64,
    /// Diagnostic logging level
    pub debug: DebugMode,
    /// Interval between verbose map dumps
    pub dump_interval_ms: u64,
    /// Let concurrent misses on one key wait for a single handler run
    pub coalesce: bool,
    /// How long a coalesced request waits before running its own handler
    pub coalesce_timeout_ms: u64,
    /// Background removal of stale entries; `None` keeps expiration purely lazy
    pub sweep_interval_ms: Option<u64>,
}

impl CacheConfig {
    /// Creates a config with the given freshness window and default options.
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: DebugMode) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_coalescing(mut self, coalesce: bool) -> Self {
        self.coalesce = coalesce;
        self
    }

    pub fn with_sweep_interval_ms(mut self, interval_ms: u64) -> Self {
        self.sweep_interval_ms = Some(interval_ms);
        self
    }

    /// Loads cache options from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DELAY_MS` - Freshness window, negative values become 0 (default: 0)
    /// - `CACHE_DEBUG` - `off`, `on` or `verbose` (default: off)
    /// - `CACHE_DUMP_INTERVAL_MS` - Verbose dump interval (default: 400)
    /// - `CACHE_COALESCE` - Enable in-flight coalescing (default: false)
    /// - `CACHE_COALESCE_TIMEOUT_MS` - Coalescing wait bound (default: 5000)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Enable the stale-entry sweep (default: unset)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_env_or(Self::default())
    }

    /// Like [`CacheConfig::from_env`], falling back to `defaults` for unset
    /// or unparseable variables.
    pub fn from_env_or(defaults: CacheConfig) -> Self {
        Self {
            delay_ms: env::var("CACHE_DELAY_MS")
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .map(normalize_delay)
                .unwrap_or(defaults.delay_ms),
            debug: env::var("CACHE_DEBUG")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.debug),
            dump_interval_ms: env::var("CACHE_DUMP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.dump_interval_ms),
            coalesce: env::var("CACHE_COALESCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.coalesce),
            coalesce_timeout_ms: env::var("CACHE_COALESCE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.coalesce_timeout_ms),
            sweep_interval_ms: env::var("CACHE_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .or(defaults.sweep_interval_ms),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            delay_ms: 0,
            debug: DebugMode::Off,
            dump_interval_ms: DEFAULT_DUMP_INTERVAL_MS,
            coalesce: false,
            coalesce_timeout_ms: DEFAULT_COALESCE_TIMEOUT_MS,
            sweep_interval_ms: None,
        }
    }
}

/// Clamps a signed delay to the valid range.
pub fn normalize_delay(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

fn deserialize_delay<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(normalize_delay(raw))
}

// == Server Config ==
/// Settings for the demo server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port
    pub server_port: u16,
    /// Options for the cache installed in front of the demo routes
    pub cache: CacheConfig,
}

impl ServerConfig {
    /// Loads `SERVER_PORT` (default: 8080) and the cache options.
    ///
    /// Unset cache variables fall back to [`ServerConfig::demo_cache`] rather
    /// than the library defaults, so `GET /` is cached out of the box.
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            cache: CacheConfig::from_env_or(Self::demo_cache()),
        }
    }

    /// Cache options for the demo routes: 3s window with debug logging.
    pub fn demo_cache() -> CacheConfig {
        CacheConfig::new(DEMO_DELAY_MS).with_debug(DebugMode::On)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_port: 8080,
            cache: Self::demo_cache(),
        }
    }
}
