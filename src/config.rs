//! Centralized configuration and builder for the snapshot poller.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - PollerConfig::from_env() reads CHUNKSCOPE_* env vars; CLI flags override them.
//! - PollerBuilder for programmatic use (tests, embedding into a renderer).
//!
//! Defaults follow the producer's write cadence:
//! - short_backoff_ms = 10 (no new stamp yet; sub-frame re-check)
//! - long_backoff_ms = 200 (file missing or mid-rewrite)
//! - initial_capacity = 1024 records

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::consts::{
    DEFAULT_INITIAL_CAPACITY, DEFAULT_LONG_BACKOFF_MS, DEFAULT_SHORT_BACKOFF_MS, SNAPSHOT_FILE,
};

#[derive(Clone, Debug)]
pub struct PollerConfig {
    /// Snapshot file to tail.
    /// Env: CHUNKSCOPE_SNAPSHOT (default ./chunk-snapshot.bin)
    pub snapshot_path: PathBuf,

    /// Backoff when the stamp did not change.
    /// Env: CHUNKSCOPE_SHORT_BACKOFF_MS (default 10)
    pub short_backoff_ms: u64,

    /// Backoff after open failure or torn read.
    /// Env: CHUNKSCOPE_LONG_BACKOFF_MS (default 200)
    pub long_backoff_ms: u64,

    /// Records preallocated in the first working table.
    /// Env: CHUNKSCOPE_INITIAL_CAPACITY (default 1024)
    pub initial_capacity: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(SNAPSHOT_FILE),
            short_backoff_ms: DEFAULT_SHORT_BACKOFF_MS,
            long_backoff_ms: DEFAULT_LONG_BACKOFF_MS,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl PollerConfig {
    /// Config for the snapshot file inside a store home directory.
    pub fn for_home<P: AsRef<Path>>(home: P) -> Self {
        Self {
            snapshot_path: home.as_ref().join(SNAPSHOT_FILE),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables; invalid values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("CHUNKSCOPE_SNAPSHOT") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.snapshot_path = PathBuf::from(s);
            }
        }

        if let Ok(v) = std::env::var("CHUNKSCOPE_SHORT_BACKOFF_MS") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.short_backoff_ms = n;
            }
        }

        if let Ok(v) = std::env::var("CHUNKSCOPE_LONG_BACKOFF_MS") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.long_backoff_ms = n;
            }
        }

        if let Ok(v) = std::env::var("CHUNKSCOPE_INITIAL_CAPACITY") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.initial_capacity = n;
            }
        }

        cfg
    }

    pub fn short_backoff(&self) -> Duration {
        Duration::from_millis(self.short_backoff_ms)
    }

    pub fn long_backoff(&self) -> Duration {
        Duration::from_millis(self.long_backoff_ms)
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = path.into();
        self
    }

    pub fn with_short_backoff_ms(mut self, ms: u64) -> Self {
        self.short_backoff_ms = ms;
        self
    }

    pub fn with_long_backoff_ms(mut self, ms: u64) -> Self {
        self.long_backoff_ms = ms;
        self
    }

    pub fn with_initial_capacity(mut self, records: usize) -> Self {
        self.initial_capacity = records;
        self
    }
}

impl fmt::Display for PollerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PollerConfig {{ \
             snapshot_path: {}, \
             short_backoff_ms: {}, \
             long_backoff_ms: {}, \
             initial_capacity: {} \
             }}",
            self.snapshot_path.display(),
            self.short_backoff_ms,
            self.long_backoff_ms,
            self.initial_capacity,
        )
    }
}

/// Lightweight builder that produces a PollerConfig.
#[derive(Clone, Debug)]
pub struct PollerBuilder {
    cfg: PollerConfig,
}

impl Default for PollerBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            cfg: PollerConfig::from_env(),
        }
    }
}

impl PollerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: PollerConfig::default(),
        }
    }

    pub fn home<P: AsRef<Path>>(mut self, home: P) -> Self {
        self.cfg.snapshot_path = home.as_ref().join(SNAPSHOT_FILE);
        self
    }

    pub fn snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cfg.snapshot_path = path.into();
        self
    }

    pub fn short_backoff_ms(mut self, ms: u64) -> Self {
        self.cfg.short_backoff_ms = ms;
        self
    }

    pub fn long_backoff_ms(mut self, ms: u64) -> Self {
        self.cfg.long_backoff_ms = ms;
        self
    }

    pub fn initial_capacity(mut self, records: usize) -> Self {
        self.cfg.initial_capacity = records;
        self
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> PollerConfig {
        self.cfg
    }
}
