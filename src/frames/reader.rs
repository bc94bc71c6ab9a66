//! frames/reader - последовательное чтение кадров state.bin.
//!
//! Кадр: [varint len][len байт тела]. Один кадр в памяти за раз: тело читается,
//! декодируется, отдаётся в callback и освобождается до чтения следующего.
//!
//! Завершение:
//! - EOF ровно на границе кадра - успех;
//! - EOF внутри префикса или тела - TruncatedFrame;
//! - len > max_frame_len - FrameTooLarge (до аллокации буфера).

use log::debug;
use std::error::Error as StdError;
use std::io::{BufReader, Read};

use crate::error::DecodeError;
use crate::metrics::record_frame;

use super::record::StorageRecord;
use super::varint::{read_varint, VarintRead};

/// Receiver of decoded records.
pub trait RecordSink {
    type Error: Into<Box<dyn StdError + Send + Sync>>;

    /// `wire_size` is the length prefix plus the body, in bytes.
    fn on_record(&mut self, rec: StorageRecord, wire_size: u64) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub frames: u64,
    pub bytes: u64,
}

/// Decode every frame of `payload`, in order, calling `on_record` for each.
///
/// A callback error stops decoding at once; whatever the callback already folded
/// into its own state stays there.
pub fn decode<R, F, E>(
    payload: R,
    max_frame_len: u64,
    mut on_record: F,
) -> Result<DecodeSummary, DecodeError>
where
    R: Read,
    F: FnMut(StorageRecord, u64) -> Result<(), E>,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    let mut r = BufReader::new(payload);
    let mut offset = 0u64;
    let mut summary = DecodeSummary::default();

    loop {
        let frame_start = offset;
        let (len, prefix_len) = match read_varint(&mut r).map_err(|source| DecodeError::Io {
            offset,
            source,
        })? {
            VarintRead::Eof => break,
            VarintRead::Value(v, n) => (v, n as u64),
            VarintRead::Truncated(n) => {
                return Err(DecodeError::TruncatedFrame {
                    offset: frame_start,
                    expected: n as u64 + 1,
                    got: n as u64,
                })
            }
            VarintRead::Invalid => return Err(DecodeError::InvalidVarint { offset: frame_start }),
        };
        if len > max_frame_len {
            return Err(DecodeError::FrameTooLarge {
                offset: frame_start,
                len,
                max: max_frame_len,
            });
        }
        offset += prefix_len;

        // take(): короткий поток не заставит аллоцировать заявленный len целиком
        let mut body = Vec::new();
        let got = (&mut r)
            .take(len)
            .read_to_end(&mut body)
            .map_err(|source| DecodeError::Io { offset, source })? as u64;
        if got < len {
            return Err(DecodeError::TruncatedFrame {
                offset: frame_start,
                expected: len,
                got,
            });
        }

        let rec = StorageRecord::decode(&body).map_err(|reason| DecodeError::InvalidRecord {
            offset: frame_start,
            reason,
        })?;
        drop(body);
        offset += len;

        let wire_size = prefix_len + len;
        record_frame(wire_size);
        on_record(rec, wire_size).map_err(|e| DecodeError::CallbackFailed {
            offset: frame_start,
            source: e.into(),
        })?;

        summary.frames += 1;
        summary.bytes += wire_size;
    }

    debug!(
        "decode: done frames={}, bytes={}",
        summary.frames, summary.bytes
    );
    Ok(summary)
}

/// `decode` with a `RecordSink` instead of a closure.
pub fn decode_into<R: Read, S: RecordSink>(
    payload: R,
    max_frame_len: u64,
    sink: &mut S,
) -> Result<DecodeSummary, DecodeError> {
    decode(payload, max_frame_len, |rec, wire| sink.on_record(rec, wire))
}
