//! Typed errors for the inspection pipeline.
//!
//! Library layers return these; the CLI wraps them into `anyhow` with context,
//! callers can still `downcast_ref` to match a variant.

use std::io;
use thiserror::Error;

/// SHA256SUMS verification failures. All of them are fatal.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("sha256 mismatch for {0}")]
    HashMismatch(String),

    #[error("manifest lists {0}, which is not a tracked archive member")]
    UnknownFile(String),

    #[error("{0} is missing from the manifest")]
    MissingFromManifest(String),

    #[error("manifest line {line}: {reason}")]
    ManifestParseError { line: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("read snapshot archive: {0}")]
    Io(#[from] io::Error),

    #[error("decode meta.json: {0}")]
    MetadataDecodeError(#[source] serde_json::Error),

    #[error("unexpected archive member {0:?}")]
    UnexpectedMember(String),

    #[error("archive member {name} is {size} bytes (max {max})")]
    MemberTooLarge {
        name: &'static str,
        size: u64,
        max: u64,
    },

    #[error("archive member {0} not found")]
    MissingMember(&'static str),

    #[error("integrity check failed: {0}")]
    IntegrityFailure(#[from] IntegrityError),

    #[error("{0} byte(s) of trailing data after the end of the archive")]
    TrailingData(u64),

    #[error("scratch payload: {0}")]
    Scratch(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("read state payload at offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("truncated frame at offset {offset}: expected {expected} byte(s), got {got}")]
    TruncatedFrame { offset: u64, expected: u64, got: u64 },

    #[error("frame at offset {offset} declares {len} bytes (max {max})")]
    FrameTooLarge { offset: u64, len: u64, max: u64 },

    #[error("malformed length prefix at offset {offset}")]
    InvalidVarint { offset: u64 },

    #[error("malformed record at offset {offset}: {reason}")]
    InvalidRecord { offset: u64, reason: String },

    #[error("record callback failed at offset {offset}: {source}")]
    CallbackFailed {
        offset: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("decode worker panicked")]
    WorkerPanicked,
}

/// Errors raised while folding records into prefix statistics.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("counter overflow in prefix group {0:?}")]
    CounterOverflow(String),
}

/// Invalid inspection settings (reported as a usage error).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("depth must be >= 0 (got {0})")]
    NegativeDepth(i64),

    #[error("unknown format {0:?}: use table|json")]
    UnknownFormat(String),

    #[error("max frame length {0} exceeds {max}", max = crate::consts::MAX_FRAME_LEN)]
    FrameLimit(u64),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("read config {path}: {reason}")]
    File { path: String, reason: String },
}
