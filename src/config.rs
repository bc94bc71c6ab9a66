//! Centralized configuration and builder for snapshot inspection.
//!
//! Layers (lowest to highest precedence):
//! - defaults (`InspectConfig::default()`);
//! - environment (`InspectConfig::from_env()`), RAFTSNAP_* variables;
//! - optional TOML file (`FileConfig`, passed with --config);
//! - CLI flags (applied by `cli`).
//!
//! ENV:
//!   RAFTSNAP_DEPTH              - prefix depth (default 2, 0 = full key)
//!   RAFTSNAP_FILTER             - literal key prefix filter (default none)
//!   RAFTSNAP_DETAILS            - 0|1|true|false (default true)
//!   RAFTSNAP_FORMAT             - table|json (default table)
//!   RAFTSNAP_SPOOL_MEM_BYTES    - in-memory size of the state.bin scratch copy (default 32 MiB)
//!   RAFTSNAP_BACKGROUND_DECODE  - decode state.bin on a worker thread (default true)
//!   RAFTSNAP_MAX_FRAME_LEN      - frame size limit, at most 2^31-1
//!
//! Malformed env values are ignored with a warning, like the rest of the tool's env knobs.

use log::warn;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::consts::{DEFAULT_DEPTH, DEFAULT_SPOOL_MEM_BYTES, MAX_FRAME_LEN};
use crate::error::ConfigError;

/// Output encoding of the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct InspectConfig {
    /// Number of leading key segments used as the group name; 0 = full key.
    /// Signed so that a negative value coming from a flag is reported, not wrapped.
    pub depth: i64,

    /// Only keys starting with this literal prefix are counted.
    pub filter: Option<String>,

    /// Include the per-prefix breakdown in the report.
    pub details: bool,

    pub format: OutputFormat,

    /// state.bin scratch copy lives in memory up to this many bytes, then rolls to a temp file.
    pub spool_mem_bytes: usize,

    /// Run the frame decode loop on a dedicated worker thread.
    pub background_decode: bool,

    /// Largest accepted frame body.
    pub max_frame_len: u64,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH as i64,
            filter: None,
            details: true,
            format: OutputFormat::Table,
            spool_mem_bytes: DEFAULT_SPOOL_MEM_BYTES,
            background_decode: true,
            max_frame_len: MAX_FRAME_LEN,
        }
    }
}

fn env_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

impl InspectConfig {
    /// Defaults overridden by RAFTSNAP_* environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("RAFTSNAP_DEPTH") {
            match v.trim().parse::<i64>() {
                Ok(n) => cfg.depth = n,
                Err(_) => warn!("config: ignoring RAFTSNAP_DEPTH={:?}", v),
            }
        }

        if let Ok(v) = std::env::var("RAFTSNAP_FILTER") {
            if !v.is_empty() {
                cfg.filter = Some(v);
            }
        }

        if let Ok(v) = std::env::var("RAFTSNAP_DETAILS") {
            match env_flag(&v) {
                Some(on) => cfg.details = on,
                None => warn!("config: ignoring RAFTSNAP_DETAILS={:?}", v),
            }
        }

        if let Ok(v) = std::env::var("RAFTSNAP_FORMAT") {
            match v.parse::<OutputFormat>() {
                Ok(f) => cfg.format = f,
                Err(e) => warn!("config: ignoring RAFTSNAP_FORMAT: {}", e),
            }
        }

        if let Ok(v) = std::env::var("RAFTSNAP_SPOOL_MEM_BYTES") {
            match v.trim().parse::<usize>() {
                Ok(n) => cfg.spool_mem_bytes = n,
                Err(_) => warn!("config: ignoring RAFTSNAP_SPOOL_MEM_BYTES={:?}", v),
            }
        }

        if let Ok(v) = std::env::var("RAFTSNAP_BACKGROUND_DECODE") {
            match env_flag(&v) {
                Some(on) => cfg.background_decode = on,
                None => warn!("config: ignoring RAFTSNAP_BACKGROUND_DECODE={:?}", v),
            }
        }

        if let Ok(v) = std::env::var("RAFTSNAP_MAX_FRAME_LEN") {
            match v.trim().parse::<u64>() {
                Ok(n) => cfg.max_frame_len = n,
                Err(_) => warn!("config: ignoring RAFTSNAP_MAX_FRAME_LEN={:?}", v),
            }
        }

        cfg
    }

    /// Overlay values present in a parsed config file.
    pub fn apply_file(&mut self, file: &FileConfig) -> Result<(), ConfigError> {
        if let Some(d) = file.depth {
            self.depth = d;
        }
        if let Some(ref f) = file.filter {
            self.filter = if f.is_empty() { None } else { Some(f.clone()) };
        }
        if let Some(on) = file.details {
            self.details = on;
        }
        if let Some(ref f) = file.format {
            self.format = f.parse()?;
        }
        if let Some(n) = file.spool_mem_bytes {
            self.spool_mem_bytes = n;
        }
        if let Some(on) = file.background_decode {
            self.background_decode = on;
        }
        if let Some(n) = file.max_frame_len {
            self.max_frame_len = n;
        }
        Ok(())
    }

    /// Check settings before any file is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth < 0 {
            return Err(ConfigError::NegativeDepth(self.depth));
        }
        if self.max_frame_len > MAX_FRAME_LEN {
            return Err(ConfigError::FrameLimit(self.max_frame_len));
        }
        Ok(())
    }

    /// Depth as a segment count. Only meaningful after `validate()`.
    pub fn depth_segments(&self) -> usize {
        self.depth.max(0) as usize
    }

    pub fn with_depth(mut self, depth: i64) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_filter<S: Into<String>>(mut self, filter: Option<S>) -> Self {
        self.filter = filter.map(Into::into).filter(|s: &String| !s.is_empty());
        self
    }

    pub fn with_details(mut self, on: bool) -> Self {
        self.details = on;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_spool_mem_bytes(mut self, n: usize) -> Self {
        self.spool_mem_bytes = n;
        self
    }

    pub fn with_background_decode(mut self, on: bool) -> Self {
        self.background_decode = on;
        self
    }

    pub fn with_max_frame_len(mut self, n: u64) -> Self {
        self.max_frame_len = n;
        self
    }
}

impl fmt::Display for InspectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InspectConfig {{ \
             depth: {}, \
             filter: {}, \
             details: {}, \
             format: {}, \
             spool_mem_bytes: {}, \
             background_decode: {}, \
             max_frame_len: {} \
             }}",
            self.depth,
            self.filter.as_deref().unwrap_or("(none)"),
            self.details,
            self.format,
            self.spool_mem_bytes,
            self.background_decode,
            self.max_frame_len,
        )
    }
}

/// TOML config file. Every field is optional; present ones override env/defaults.
///
/// ```toml
/// depth = 3
/// filter = "logical/"
/// format = "json"
/// spool_mem_bytes = 8388608
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub depth: Option<i64>,
    pub filter: Option<String>,
    pub details: Option<bool>,
    pub format: Option<String>,
    pub spool_mem_bytes: Option<usize>,
    pub background_decode: Option<bool>,
    pub max_frame_len: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Lightweight builder that produces an InspectConfig.
#[derive(Clone, Debug)]
pub struct InspectBuilder {
    cfg: InspectConfig,
}

impl Default for InspectBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            cfg: InspectConfig::from_env(),
        }
    }
}

impl InspectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: InspectConfig::default(),
        }
    }

    pub fn depth(mut self, depth: i64) -> Self {
        self.cfg.depth = depth;
        self
    }

    pub fn filter<S: Into<String>>(self, filter: Option<S>) -> Self {
        Self {
            cfg: self.cfg.with_filter(filter),
        }
    }

    pub fn details(mut self, on: bool) -> Self {
        self.cfg.details = on;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.cfg.format = format;
        self
    }

    pub fn spool_mem_bytes(mut self, n: usize) -> Self {
        self.cfg.spool_mem_bytes = n;
        self
    }

    pub fn background_decode(mut self, on: bool) -> Self {
        self.cfg.background_decode = on;
        self
    }

    pub fn max_frame_len(mut self, n: u64) -> Self {
        self.cfg.max_frame_len = n;
        self
    }

    /// Finish the builder; fails on contradictory settings.
    pub fn build(self) -> Result<InspectConfig, ConfigError> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}
