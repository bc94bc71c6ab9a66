//! Per-prefix statistics over decoded records.
//!
//! Группа записи - первые `depth` сегментов ключа (разделитель '/'), depth=0 - ключ целиком.
//! Записи с пустым ключом и не подходящие под фильтр пропускаются (не считаются и не
//! суммируются). Для каждой учтённой записи ровно одна группа получает +1 и +wire_size,
//! итоги растут так же, поэтому Σcount == total_count и Σbytes == total_bytes всегда.

use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::consts::KEY_SEPARATOR;
use crate::error::AggregateError;
use crate::frames::{RecordSink, StorageRecord};
use crate::metrics::{record_aggregated, record_skipped};
use crate::snapshot::SnapshotMetadata;
use crate::util::display_key;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefixStat {
    pub name: String,
    pub count: u64,
    pub total_bytes: u64,
}

/// Group name of `key` at `depth` segments.
pub fn group_name(key: &[u8], depth: usize) -> String {
    if depth == 0 {
        return display_key(key);
    }
    let cut = key
        .iter()
        .enumerate()
        .filter(|(_, &b)| b == KEY_SEPARATOR)
        .nth(depth - 1)
        .map(|(i, _)| i)
        .unwrap_or(key.len());
    display_key(&key[..cut])
}

#[derive(Debug, Clone)]
pub struct PrefixAggregator {
    depth: usize,
    filter: Option<Vec<u8>>,
    // (count, bytes) by group name; name order gives a stable tie-break later
    groups: BTreeMap<String, (u64, u64)>,
    total_count: u64,
    total_bytes: u64,
}

impl PrefixAggregator {
    pub fn new(depth: usize, filter: Option<String>) -> Self {
        Self {
            depth,
            filter: filter.filter(|f| !f.is_empty()).map(String::into_bytes),
            groups: BTreeMap::new(),
            total_count: 0,
            total_bytes: 0,
        }
    }

    /// Fold one record. Returns Ok(false) when the record is skipped.
    pub fn add(&mut self, key: &[u8], wire_size: u64) -> Result<bool, AggregateError> {
        if key.is_empty() {
            record_skipped();
            return Ok(false);
        }
        if let Some(ref f) = self.filter {
            if !key.starts_with(f) {
                record_skipped();
                return Ok(false);
            }
        }

        let name = group_name(key, self.depth);
        // групповые счётчики не больше итоговых: переполнение видно уже на итогах
        let (tc, tb) = match (
            self.total_count.checked_add(1),
            self.total_bytes.checked_add(wire_size),
        ) {
            (Some(tc), Some(tb)) => (tc, tb),
            _ => return Err(AggregateError::CounterOverflow(name)),
        };
        let slot = self.groups.entry(name).or_insert((0, 0));
        slot.0 += 1;
        slot.1 += wire_size;
        self.total_count = tc;
        self.total_bytes = tb;
        record_aggregated();
        Ok(true)
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Stats sorted by count (desc), then name (asc).
    pub fn sorted_stats(&self) -> Vec<PrefixStat> {
        let mut out: Vec<PrefixStat> = self
            .groups
            .iter()
            .map(|(name, &(count, total_bytes))| PrefixStat {
                name: name.clone(),
                count,
                total_bytes,
            })
            .collect();
        sort_stats(&mut out);
        out
    }

    /// Final report. Without `details` the per-prefix rows are dropped, totals stay.
    pub fn into_report(self, metadata: SnapshotMetadata, details: bool) -> SnapshotReport {
        let prefix_stats = if details { self.sorted_stats() } else { Vec::new() };
        debug!(
            "stats: groups={}, total_count={}, total_bytes={}",
            self.groups.len(),
            self.total_count,
            self.total_bytes
        );
        SnapshotReport {
            metadata,
            prefix_stats,
            total_count: self.total_count,
            total_bytes: self.total_bytes,
        }
    }
}

impl RecordSink for PrefixAggregator {
    type Error = AggregateError;

    fn on_record(&mut self, rec: StorageRecord, wire_size: u64) -> Result<(), AggregateError> {
        self.add(&rec.key, wire_size).map(|_| ())
    }
}

pub fn sort_stats(stats: &mut [PrefixStat]) {
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
}

/// Everything the formatter needs; built once after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotReport {
    pub metadata: SnapshotMetadata,
    pub prefix_stats: Vec<PrefixStat>,
    pub total_count: u64,
    pub total_bytes: u64,
}
