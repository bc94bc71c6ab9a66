//! snapshot/ledger - running SHA-256 per archive member + SHA256SUMS verification.
//!
//! Формат манифеста (sha256sum):
//!   `<64 hex>␠␠<file name>\n` - одна строка на файл; допускается и `<hex>␠*<name>` (binary mode).
//! Пустые строки пропускаются.
//!
//! Проверка - всё или ничего, и требует биекции: каждая строка манифеста ссылается на
//! отслеживаемый файл, и каждый отслеживаемый файл присутствует в манифесте.

use log::debug;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use crate::consts::SHA256_HEX_LEN;
use crate::error::IntegrityError;
use crate::util::{decode_hex, hex_encode};

#[derive(Default)]
pub struct HashLedger {
    // BTreeMap: MissingFromManifest is reported for the first name in sorted order.
    entries: BTreeMap<String, Sha256>,
}

impl HashLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with one fresh accumulator per name.
    pub fn with_files<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Self {
        let mut ledger = Self::new();
        for name in names {
            ledger.register(name);
        }
        ledger
    }

    /// Accumulator for `name`, created on first use.
    pub fn register(&mut self, name: &str) -> &mut Sha256 {
        self.entries.entry(name.to_string()).or_default()
    }

    /// Feed a whole buffer into the accumulator for `name`.
    pub fn feed(&mut self, name: &str, data: &[u8]) {
        self.register(name).update(data);
    }

    pub fn is_tracked(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Writer adapter that copies into `inner` and hashes under `name`.
    pub fn tee<'a, W: Write>(&'a mut self, name: &str, inner: W) -> HashingWriter<'a, W> {
        HashingWriter {
            inner,
            hasher: self.register(name),
        }
    }

    /// Compare final digests with a SHA256SUMS manifest. Consumes the ledger.
    pub fn verify(self, manifest: &str) -> Result<(), IntegrityError> {
        let mut digests: BTreeMap<String, [u8; 32]> = self
            .entries
            .into_iter()
            .map(|(name, h)| (name, h.finalize().into()))
            .collect();

        let mut seen = BTreeSet::new();
        for (i, raw) in manifest.lines().enumerate() {
            let line_no = i + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let (expected, name) = parse_line(raw, line_no)?;
            if !seen.insert(name.to_string()) {
                return Err(IntegrityError::ManifestParseError {
                    line: line_no,
                    reason: format!("duplicate entry for {}", name),
                });
            }
            let actual = digests
                .get(name)
                .ok_or_else(|| IntegrityError::UnknownFile(name.to_string()))?;
            if actual[..] != expected[..] {
                debug!(
                    "ledger: {} expected={} actual={}",
                    name,
                    hex_encode(&expected),
                    hex_encode(actual)
                );
                return Err(IntegrityError::HashMismatch(name.to_string()));
            }
        }

        digests.retain(|name, _| !seen.contains(name));
        if let Some(name) = digests.into_keys().next() {
            return Err(IntegrityError::MissingFromManifest(name));
        }
        Ok(())
    }
}

fn parse_line(raw: &str, line: usize) -> Result<([u8; 32], &str), IntegrityError> {
    let bad = |reason: &str| IntegrityError::ManifestParseError {
        line,
        reason: reason.to_string(),
    };
    let raw = raw.strip_suffix('\r').unwrap_or(raw);
    if raw.len() < SHA256_HEX_LEN + 3 || !raw.is_char_boundary(SHA256_HEX_LEN) {
        return Err(bad("expected `<sha256 hex>  <file name>`"));
    }
    let (hex, rest) = raw.split_at(SHA256_HEX_LEN);
    let name = rest
        .strip_prefix("  ")
        .or_else(|| rest.strip_prefix(" *"))
        .ok_or_else(|| bad("digest must be followed by two spaces"))?;
    if name.is_empty() {
        return Err(bad("empty file name"));
    }
    let digest = decode_hex(hex).ok_or_else(|| bad("digest is not 64 hex characters"))?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Ok((out, name))
}

/// Write adapter: bytes go to `inner` and into the ledger accumulator, in write order.
pub struct HashingWriter<'a, W> {
    inner: W,
    hasher: &'a mut Sha256,
}

impl<'a, W: Write> Write for HashingWriter<'a, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
