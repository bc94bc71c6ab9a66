//! Report rendering: aligned table or JSON.
//!
//! Порядок строк статистики задаётся SnapshotReport (count desc, name asc); здесь
//! он не меняется, чтобы таблица и JSON всегда совпадали.

use serde::Serialize;
use std::fmt::Write as _;

use crate::config::OutputFormat;
use crate::snapshot::SnapshotMetadata;
use crate::stats::{PrefixStat, SnapshotReport};

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Binary byte-size string: largest unit (powers of 1024) not exceeding the value,
/// one decimal, trailing ".0" stripped. Zero is the bare "0".
pub fn humanize_bytes(n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut unit = 0usize;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && n / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }
    let mut s = format!("{:.1}", n as f64 / scale as f64);
    if s.ends_with(".0") {
        s.truncate(s.len() - 2);
    }
    s.push_str(UNITS[unit]);
    s
}

/// Render `report` in the requested format. Only JSON encoding can fail.
pub fn render(report: &SnapshotReport, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => render_json(report),
    }
}

// ----- table -----

fn render_table(report: &SnapshotReport) -> String {
    let m = &report.metadata;
    let mut meta_rows: Vec<(&str, String)> = vec![
        ("ID", m.id.clone()),
        ("Size", m.size.to_string()),
        ("Index", m.index.to_string()),
        ("Term", m.term.to_string()),
        ("Version", m.version.to_string()),
    ];
    if let Some(ci) = m.configuration_index {
        meta_rows.push(("Configuration Index", ci.to_string()));
    }
    if let Some(n) = m.server_count() {
        meta_rows.push(("Servers", n.to_string()));
    }

    let key_w = meta_rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (k, v) in &meta_rows {
        let _ = writeln!(out, "{:<w$}  {}", k, v, w = key_w);
    }

    if !report.prefix_stats.is_empty() {
        out.push('\n');
        let mut rows: Vec<[String; 3]> = Vec::with_capacity(report.prefix_stats.len() + 3);
        rows.push(["Name".into(), "Count".into(), "Size".into()]);
        rows.push(["----".into(), "-----".into(), "----".into()]);
        for s in &report.prefix_stats {
            rows.push([s.name.clone(), s.count.to_string(), humanize_bytes(s.total_bytes)]);
        }
        rows.push([
            "Total Size".into(),
            String::new(),
            humanize_bytes(report.total_bytes),
        ]);
        write_rows(&mut out, &rows);
    }
    out
}

fn write_rows(out: &mut String, rows: &[[String; 3]]) {
    let mut widths = [0usize; 3];
    for r in rows {
        for (w, cell) in widths.iter_mut().zip(r.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    for r in rows {
        let line = format!(
            "{:<w0$}  {:<w1$}  {}",
            r[0],
            r[1],
            r[2],
            w0 = widths[0],
            w1 = widths[1]
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
}

// ----- json -----

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    meta: JsonMeta<'a>,
    stats_by_prefix: &'a [PrefixStat],
    total_count: u64,
    total_bytes: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonMeta<'a> {
    id: &'a str,
    size: i64,
    index: u64,
    term: u64,
    version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    configuration_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    servers: Option<Vec<JsonServer<'a>>>,
}

#[derive(Serialize)]
struct JsonServer<'a> {
    id: &'a str,
    address: &'a str,
    suffrage: i64,
}

impl<'a> From<&'a SnapshotMetadata> for JsonMeta<'a> {
    fn from(m: &'a SnapshotMetadata) -> Self {
        JsonMeta {
            id: &m.id,
            size: m.size,
            index: m.index,
            term: m.term,
            version: m.version,
            configuration_index: m.configuration_index,
            servers: m.configuration.as_ref().map(|c| {
                c.servers
                    .iter()
                    .map(|s| JsonServer {
                        id: &s.id,
                        address: &s.address,
                        suffrage: s.suffrage,
                    })
                    .collect()
            }),
        }
    }
}

fn render_json(report: &SnapshotReport) -> Result<String, serde_json::Error> {
    let view = JsonReport {
        meta: JsonMeta::from(&report.metadata),
        stats_by_prefix: &report.prefix_stats,
        total_count: report.total_count,
        total_bytes: report.total_bytes,
    };
    let mut s = serde_json::to_string_pretty(&view)?;
    s.push('\n');
    Ok(s)
}
