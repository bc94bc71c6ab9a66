// Базовые модули
pub mod consts;
pub mod config;
pub mod error;
pub mod metrics;

// Утилиты (hex, отображение ключей)
pub mod util; // src/util/mod.rs

// Архив снапшота и поток кадров (папки с mod.rs)
pub mod snapshot; // src/snapshot/{mod,meta,ledger,scratch,archive}.rs
pub mod frames; // src/frames/{mod,varint,record,reader,worker}.rs

// Статистика, отчёт, конвейер
pub mod stats;
pub mod report;
pub mod inspect;

pub mod cli;

// Удобные реэкспорты
pub use config::{InspectBuilder, InspectConfig, OutputFormat};
pub use error::{AggregateError, ConfigError, DecodeError, ExtractError, IntegrityError};
pub use frames::{decode, decode_in_background, decode_into, RecordSink, StorageRecord};
pub use inspect::{inspect_file, inspect_reader, verify_file, verify_reader, VerifySummary};
pub use report::{humanize_bytes, render};
pub use snapshot::{extract, HashLedger, ScratchPayload, SnapshotMetadata};
pub use stats::{PrefixAggregator, PrefixStat, SnapshotReport};
