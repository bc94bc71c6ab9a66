//! inspect - end-to-end pipeline: extract → decode → aggregate → report.
//!
//! Стадии строго последовательны: извлечение (с проверкой SHA256SUMS) полностью
//! завершается до первого чтения кадров. Отчёт строится только при полном успехе;
//! частичные результаты при ошибке отбрасываются.

use anyhow::{Context, Result};
use log::{debug, info};
use std::convert::Infallible;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::InspectConfig;
use crate::frames::{decode_in_background, decode_into, DecodeSummary, RecordSink, StorageRecord};
use crate::snapshot::{extract, SnapshotMetadata};
use crate::stats::{PrefixAggregator, SnapshotReport};

/// Inspect an archive read from `archive`.
pub fn inspect_reader<R: Read>(archive: R, cfg: &InspectConfig) -> Result<SnapshotReport> {
    cfg.validate().context("invalid inspect settings")?;

    let (metadata, mut payload) =
        extract(archive, cfg.spool_mem_bytes).context("extract snapshot archive")?;
    payload.rewind().context("rewind scratch payload")?;

    let agg = PrefixAggregator::new(cfg.depth_segments(), cfg.filter.clone());
    let (agg, summary) = if cfg.background_decode {
        decode_in_background(payload, cfg.max_frame_len, agg).context("decode state.bin")?
    } else {
        let mut agg = agg;
        let summary = decode_into(payload, cfg.max_frame_len, &mut agg)
            .context("decode state.bin")?;
        (agg, summary)
    };

    info!(
        "inspect: id={}, frames={}, counted={}, groups={}, bytes={}",
        metadata.id,
        summary.frames,
        agg.total_count(),
        agg.group_count(),
        agg.total_bytes()
    );
    Ok(agg.into_report(metadata, cfg.details))
}

/// Inspect the archive at `path`.
pub fn inspect_file(path: &Path, cfg: &InspectConfig) -> Result<SnapshotReport> {
    cfg.validate().context("invalid inspect settings")?;
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    debug!("inspect: {}", path.display());
    inspect_reader(f, cfg).with_context(|| format!("inspect {}", path.display()))
}

/// Outcome of an integrity-only pass.
#[derive(Debug, Clone)]
pub struct VerifySummary {
    pub metadata: SnapshotMetadata,
    pub records: u64,
    pub state_bytes: u64,
}

#[derive(Default)]
struct CountingSink {
    records: u64,
}

impl RecordSink for CountingSink {
    type Error = Infallible;

    fn on_record(&mut self, _rec: StorageRecord, _wire_size: u64) -> Result<(), Infallible> {
        self.records += 1;
        Ok(())
    }
}

/// Verify the archive and walk every frame without aggregating.
pub fn verify_reader<R: Read>(archive: R, cfg: &InspectConfig) -> Result<VerifySummary> {
    cfg.validate().context("invalid inspect settings")?;
    let (metadata, mut payload) =
        extract(archive, cfg.spool_mem_bytes).context("extract snapshot archive")?;
    payload.rewind().context("rewind scratch payload")?;
    let state_bytes = payload.len();

    let mut sink = CountingSink::default();
    let DecodeSummary { frames, bytes } =
        decode_into(payload, cfg.max_frame_len, &mut sink).context("decode state.bin")?;
    debug!("verify: frames={}, bytes={}", frames, bytes);

    Ok(VerifySummary {
        metadata,
        records: sink.records,
        state_bytes,
    })
}

pub fn verify_file(path: &Path, cfg: &InspectConfig) -> Result<VerifySummary> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    verify_reader(f, cfg).with_context(|| format!("verify {}", path.display()))
}
