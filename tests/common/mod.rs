// Общие помощники интеграционных тестов: сборка архивов снапшота (gzip + tar + SHA256SUMS).
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};

use raftsnap::frames::encode_frame;
use raftsnap::StorageRecord;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("raftsnap-{prefix}-{pid}-{t}-{id}"))
}

pub const TEST_META: &str = r#"{"ID":"test","Size":100,"Index":5,"Term":2,"Version":1}"#;

/// 3 keys under a/b/ and 2 under c/d/.
pub fn sample_records() -> Vec<StorageRecord> {
    vec![
        StorageRecord::new("a/b/one", "v1"),
        StorageRecord::new("c/d/one", "value-1"),
        StorageRecord::new("a/b/two", "v22"),
        StorageRecord::new("a/b/three/deep", "v333"),
        StorageRecord::new("c/d/two", "value-22"),
    ]
}

pub fn state_bin(recs: &[StorageRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    for r in recs {
        encode_frame(r, &mut out);
    }
    out
}

pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// SHA256SUMS text in the `<hex>  <name>\n` layout.
pub fn sums(files: &[(&str, &[u8])]) -> String {
    files
        .iter()
        .map(|(name, data)| format!("{}  {}\n", sha256_hex(data), name))
        .collect()
}

/// Uncompressed tar of `members`, in the given order.
pub fn tar_bytes(members: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut b = tar::Builder::new(Vec::new());
    for (name, data) in members {
        let mut h = tar::Header::new_gnu();
        h.set_size(data.len() as u64);
        h.set_mode(0o644);
        h.set_mtime(0);
        h.set_cksum();
        b.append_data(&mut h, name, *data)?;
    }
    Ok(b.into_inner()?)
}

pub fn gzip(raw: &[u8]) -> Result<Vec<u8>> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(raw)?;
    Ok(enc.finish()?)
}

pub fn archive(members: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    gzip(&tar_bytes(members)?)
}

/// A well-formed archive: meta.json, state.bin, SHA256SUMS, SHA256SUMS.sealed.
pub fn snapshot_archive(meta: &str, state: &[u8]) -> Result<Vec<u8>> {
    let manifest = sums(&[("meta.json", meta.as_bytes()), ("state.bin", state)]);
    archive(&[
        ("meta.json", meta.as_bytes()),
        ("state.bin", state),
        ("SHA256SUMS", manifest.as_bytes()),
        ("SHA256SUMS.sealed", b"opaque-signature"),
    ])
}

pub fn write_file(root: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(root)?;
    let p = root.join(name);
    fs::write(&p, bytes)?;
    Ok(p)
}
