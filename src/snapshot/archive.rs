//! snapshot/archive - extraction of a snapshot archive (gzip + tar).
//!
//! Члены архива (в порядке потока):
//! - meta.json          - читается целиком (до MAX_SMALL_MEMBER_LEN), хэшируется, декодируется в SnapshotMetadata;
//! - state.bin          - копируется в ScratchPayload с одновременным хэшированием;
//! - SHA256SUMS         - буферизуется (до MAX_SMALL_MEMBER_LEN) для HashLedger::verify;
//! - SHA256SUMS.sealed  - читается и отбрасывается;
//! - всё остальное      - UnexpectedMember.
//!
//! После членов: проверка манифеста, затем контроль хвоста. tar-ридер останавливается на
//! первом нулевом блоке маркера конца, поэтому допускается ровно один оставшийся нулевой
//! блок (512 байт). Всё сверх него, ненулевые байты или любые байты после gzip-трейлера
//! - TrailingData.

use flate2::bufread::GzDecoder;
use log::{debug, info, warn};
use std::io::{self, BufRead, BufReader, Read, Write};

use crate::consts::{
    COPY_BUF_SIZE, HASHED_MEMBERS, MAX_SMALL_MEMBER_LEN, META_MEMBER, STATE_MEMBER, SUMS_MEMBER,
    SUMS_SEALED_MEMBER, TAR_BLOCK_SIZE,
};
use crate::error::{ExtractError, IntegrityError};
use crate::metrics::{
    record_archive_opened, record_integrity_failure, record_member_read, record_payload_spooled,
};

use super::ledger::HashLedger;
use super::meta::SnapshotMetadata;
use super::scratch::ScratchPayload;

/// Extract and verify a snapshot archive.
///
/// On success the returned payload is a verified copy of state.bin, ready to be read
/// from the start. On failure the scratch copy is dropped (and its temp file removed)
/// before the error is returned.
pub fn extract<R: Read>(
    archive: R,
    spool_mem_bytes: usize,
) -> Result<(SnapshotMetadata, ScratchPayload), ExtractError> {
    record_archive_opened();
    let gz = GzDecoder::new(BufReader::new(archive));
    let mut tar = tar::Archive::new(gz);

    let mut ledger = HashLedger::with_files(HASHED_MEMBERS);
    let mut payload = ScratchPayload::new(spool_mem_bytes);
    let mut metadata: Option<SnapshotMetadata> = None;
    let mut manifest: Option<String> = None;
    let mut state_seen = false;

    for entry in tar.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();
        let size = entry.size();
        record_member_read();
        debug!("extract: member {} ({} bytes)", name, size);

        match name.as_str() {
            META_MEMBER => {
                // Читаем целиком до декодирования: хэш не должен зависеть от того,
                // сколько байт потребит JSON-парсер.
                let buf = read_small(&mut entry, size, META_MEMBER)?;
                ledger.feed(META_MEMBER, &buf);
                let m = SnapshotMetadata::from_json(&buf)
                    .map_err(ExtractError::MetadataDecodeError)?;
                metadata = Some(m);
            }
            STATE_MEMBER => {
                let mut tee = ledger.tee(STATE_MEMBER, &mut payload);
                copy_member(&mut entry, &mut tee)?;
                tee.flush().map_err(ExtractError::Scratch)?;
                state_seen = true;
            }
            SUMS_MEMBER => {
                let buf = read_small(&mut entry, size, SUMS_MEMBER)?;
                let text = String::from_utf8(buf).map_err(|_| {
                    IntegrityError::ManifestParseError {
                        line: 0,
                        reason: "manifest is not valid UTF-8".to_string(),
                    }
                })?;
                manifest = Some(text);
            }
            SUMS_SEALED_MEMBER => {
                // TODO: verify the sealed manifest signature once a key source is defined.
                io::copy(&mut entry, &mut io::sink())?;
            }
            _ => return Err(ExtractError::UnexpectedMember(name)),
        }
    }

    let manifest = manifest.ok_or(ExtractError::MissingMember(SUMS_MEMBER))?;
    if let Err(e) = ledger.verify(&manifest) {
        record_integrity_failure();
        warn!("extract: integrity check failed: {}", e);
        return Err(e.into());
    }
    debug!("extract: SHA256SUMS verified");

    ensure_no_trailing(tar.into_inner())?;

    let metadata = metadata.ok_or(ExtractError::MissingMember(META_MEMBER))?;
    if !state_seen {
        return Err(ExtractError::MissingMember(STATE_MEMBER));
    }

    record_payload_spooled(payload.len(), payload.is_on_disk());
    info!(
        "extract: done id={}, index={}, term={}, state_bytes={}, spooled_to_disk={}",
        metadata.id,
        metadata.index,
        metadata.term,
        payload.len(),
        payload.is_on_disk()
    );
    Ok((metadata, payload))
}

// Whole member into memory, bounded by MAX_SMALL_MEMBER_LEN before any allocation.
fn read_small<E: Read>(
    entry: &mut E,
    size: u64,
    name: &'static str,
) -> Result<Vec<u8>, ExtractError> {
    let too_large = |size| ExtractError::MemberTooLarge {
        name,
        size,
        max: MAX_SMALL_MEMBER_LEN,
    };
    if size > MAX_SMALL_MEMBER_LEN {
        return Err(too_large(size));
    }
    let mut buf = Vec::with_capacity(size as usize);
    entry
        .by_ref()
        .take(MAX_SMALL_MEMBER_LEN + 1)
        .read_to_end(&mut buf)?;
    if buf.len() as u64 > MAX_SMALL_MEMBER_LEN {
        return Err(too_large(buf.len() as u64));
    }
    Ok(buf)
}

// Read errors belong to the archive; write errors to the scratch copy.
fn copy_member<R: Read, W: Write>(src: &mut R, dst: &mut W) -> Result<u64, ExtractError> {
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut total = 0u64;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExtractError::Io(e)),
        };
        dst.write_all(&buf[..n]).map_err(ExtractError::Scratch)?;
        total += n as u64;
    }
    Ok(total)
}

fn ensure_no_trailing<R: BufRead>(mut gz: GzDecoder<R>) -> Result<(), ExtractError> {
    // 1) остаток распакованного потока после конца tar: только второй нулевой блок маркера
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut tail = 0u64;
    let mut non_zero = false;
    loop {
        let n = gz.read(&mut buf)?;
        if n == 0 {
            break;
        }
        tail += n as u64;
        non_zero |= buf[..n].iter().any(|&b| b != 0);
    }
    if non_zero || tail > TAR_BLOCK_SIZE {
        return Err(ExtractError::TrailingData(tail));
    }

    // 2) сырые байты после gzip-трейлера
    let mut rest = gz.into_inner();
    let extra = io::copy(&mut rest, &mut io::sink())?;
    if extra > 0 {
        return Err(ExtractError::TrailingData(extra));
    }
    Ok(())
}
