//! frames - state.bin record stream.
//!
//! - varint: base-128 length prefixes;
//! - record: StorageRecord body codec;
//! - reader: streaming decode loop, RecordSink;
//! - worker: the same loop on a dedicated thread.

pub mod reader;
pub mod record;
pub mod varint;
pub mod worker;

pub use reader::{decode, decode_into, DecodeSummary, RecordSink};
pub use record::{encode_frame, StorageRecord};
pub use worker::decode_in_background;
