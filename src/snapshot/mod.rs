//! snapshot - reading a Raft snapshot archive.
//!
//! - meta:    SnapshotMetadata (meta.json);
//! - ledger:  HashLedger, SHA-256 per member + SHA256SUMS verification;
//! - scratch: ScratchPayload, spooled copy of state.bin;
//! - archive: extract(), gzip+tar walk that ties the three together.

pub mod archive;
pub mod ledger;
pub mod meta;
pub mod scratch;

pub use archive::extract;
pub use ledger::{HashLedger, HashingWriter};
pub use meta::{RaftConfiguration, RaftServer, SnapshotMetadata};
pub use scratch::ScratchPayload;
