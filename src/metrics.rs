//! Lightweight global metrics for snapshot inspection.
//!
//! Потокобезопасные атомарные счётчики для стадий:
//! - extraction (архив, члены, spool)
//! - decode (кадры state.bin)
//! - aggregation (записи, пропуски)
//! - integrity (ошибки проверки SHA256SUMS)

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Extraction -----
static ARCHIVES_OPENED: AtomicU64 = AtomicU64::new(0);
static MEMBERS_READ: AtomicU64 = AtomicU64::new(0);
static PAYLOAD_BYTES_SPOOLED: AtomicU64 = AtomicU64::new(0);
static SPOOL_ROLLOVERS: AtomicU64 = AtomicU64::new(0);

// ----- Decode -----
static FRAMES_DECODED: AtomicU64 = AtomicU64::new(0);
static FRAME_BYTES_DECODED: AtomicU64 = AtomicU64::new(0);

// ----- Aggregation -----
static RECORDS_AGGREGATED: AtomicU64 = AtomicU64::new(0);
static RECORDS_SKIPPED: AtomicU64 = AtomicU64::new(0);

// ----- Integrity -----
static INTEGRITY_FAILURES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub archives_opened: u64,
    pub members_read: u64,
    pub payload_bytes_spooled: u64,
    pub spool_rollovers: u64,

    pub frames_decoded: u64,
    pub frame_bytes_decoded: u64,

    pub records_aggregated: u64,
    pub records_skipped: u64,

    pub integrity_failures: u64,
}

impl MetricsSnapshot {
    pub fn avg_frame_bytes(&self) -> f64 {
        if self.frames_decoded == 0 {
            0.0
        } else {
            self.frame_bytes_decoded as f64 / self.frames_decoded as f64
        }
    }
}

// ----- Recorders (Extraction) -----
pub fn record_archive_opened() {
    ARCHIVES_OPENED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_member_read() {
    MEMBERS_READ.fetch_add(1, Ordering::Relaxed);
}

pub fn record_payload_spooled(bytes: u64, rolled_over: bool) {
    PAYLOAD_BYTES_SPOOLED.fetch_add(bytes, Ordering::Relaxed);
    if rolled_over {
        SPOOL_ROLLOVERS.fetch_add(1, Ordering::Relaxed);
    }
}

// ----- Recorders (Decode) -----
pub fn record_frame(wire_size: u64) {
    FRAMES_DECODED.fetch_add(1, Ordering::Relaxed);
    FRAME_BYTES_DECODED.fetch_add(wire_size, Ordering::Relaxed);
}

// ----- Recorders (Aggregation) -----
pub fn record_aggregated() {
    RECORDS_AGGREGATED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_skipped() {
    RECORDS_SKIPPED.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Integrity) -----
pub fn record_integrity_failure() {
    INTEGRITY_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        archives_opened: ARCHIVES_OPENED.load(Ordering::Relaxed),
        members_read: MEMBERS_READ.load(Ordering::Relaxed),
        payload_bytes_spooled: PAYLOAD_BYTES_SPOOLED.load(Ordering::Relaxed),
        spool_rollovers: SPOOL_ROLLOVERS.load(Ordering::Relaxed),
        frames_decoded: FRAMES_DECODED.load(Ordering::Relaxed),
        frame_bytes_decoded: FRAME_BYTES_DECODED.load(Ordering::Relaxed),
        records_aggregated: RECORDS_AGGREGATED.load(Ordering::Relaxed),
        records_skipped: RECORDS_SKIPPED.load(Ordering::Relaxed),
        integrity_failures: INTEGRITY_FAILURES.load(Ordering::Relaxed),
    }
}
