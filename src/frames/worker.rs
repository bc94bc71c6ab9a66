//! frames/worker - decode loop on a dedicated thread.
//!
//! Поток владеет payload и sink на время декодирования и возвращает ровно один
//! терминальный результат: (sink, summary) либо первую ошибку. Вызывающий поток
//! блокируется в join(); JoinHandle и есть одноразовый канал завершения.

use log::debug;
use std::io::Read;
use std::thread;

use crate::error::DecodeError;

use super::reader::{decode_into, DecodeSummary, RecordSink};

/// Run `decode_into` on a worker thread and wait for it.
///
/// `payload` must already be positioned at the first frame. It is dropped on the
/// worker when decoding ends, which releases any temp file behind it.
pub fn decode_in_background<R, S>(
    payload: R,
    max_frame_len: u64,
    mut sink: S,
) -> Result<(S, DecodeSummary), DecodeError>
where
    R: Read + Send + 'static,
    S: RecordSink + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("state-decode".to_string())
        .spawn(move || -> Result<(S, DecodeSummary), DecodeError> {
            let summary = decode_into(payload, max_frame_len, &mut sink)?;
            Ok((sink, summary))
        })
        .map_err(|source| DecodeError::Io { offset: 0, source })?;
    debug!("decode: worker spawned");

    match handle.join() {
        Ok(res) => res,
        Err(_) => Err(DecodeError::WorkerPanicked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_FRAME_LEN;
    use crate::frames::record::{encode_frame, StorageRecord};
    use std::convert::Infallible;
    use std::io::Cursor;

    #[derive(Debug, Default)]
    struct Keys(Vec<Vec<u8>>);

    impl RecordSink for Keys {
        type Error = Infallible;
        fn on_record(&mut self, rec: StorageRecord, _wire: u64) -> Result<(), Infallible> {
            self.0.push(rec.key);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Panics;

    impl RecordSink for Panics {
        type Error = Infallible;
        fn on_record(&mut self, _rec: StorageRecord, _wire: u64) -> Result<(), Infallible> {
            panic!("sink failure");
        }
    }

    #[test]
    fn worker_returns_sink_and_summary() {
        let mut buf = Vec::new();
        for k in ["a", "b", "c"] {
            encode_frame(&StorageRecord::new(k, "v"), &mut buf);
        }
        let len = buf.len() as u64;
        let (keys, summary) =
            decode_in_background(Cursor::new(buf), MAX_FRAME_LEN, Keys::default()).unwrap();
        assert_eq!(keys.0, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.bytes, len);
    }

    #[test]
    fn worker_propagates_first_error() {
        let buf = vec![0x05u8, 0x0a];
        let err =
            decode_in_background(Cursor::new(buf), MAX_FRAME_LEN, Keys::default()).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedFrame { .. }));
    }

    #[test]
    fn worker_panic_is_reported() {
        let mut buf = Vec::new();
        encode_frame(&StorageRecord::new("a", "v"), &mut buf);
        let err = decode_in_background(Cursor::new(buf), MAX_FRAME_LEN, Panics).unwrap_err();
        assert!(matches!(err, DecodeError::WorkerPanicked));
    }
}
