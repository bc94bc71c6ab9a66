//! Общие константы формата снапшота (архив, state.bin, отчёт).

// -------- Archive members --------
pub const META_MEMBER: &str = "meta.json";
pub const STATE_MEMBER: &str = "state.bin";
pub const SUMS_MEMBER: &str = "SHA256SUMS";
// Подпись манифеста: читаем и отбрасываем (проверка подписи не реализована).
pub const SUMS_SEALED_MEMBER: &str = "SHA256SUMS.sealed";

/// Members that get a SHA-256 accumulator in the ledger before extraction starts.
pub const HASHED_MEMBERS: [&str; 2] = [META_MEMBER, STATE_MEMBER];

// meta.json и SHA256SUMS читаются в память целиком; больше этого - ошибка
pub const MAX_SMALL_MEMBER_LEN: u64 = 1024 * 1024;

// -------- tar --------
pub const TAR_BLOCK_SIZE: u64 = 512;

// -------- SHA256SUMS --------
pub const SHA256_HEX_LEN: usize = 64;

// -------- state.bin frames --------
// [varint len][record bytes], len <= 2^31-1
pub const MAX_FRAME_LEN: u64 = i32::MAX as u64;
// u64 varint never needs more than 10 bytes
pub const MAX_VARINT_LEN: usize = 10;

// Record fields (protobuf numbering): Key = 1, Value = 2
pub const FIELD_KEY: u32 = 1;
pub const FIELD_VALUE: u32 = 2;

pub const WIRE_VARINT: u8 = 0;
pub const WIRE_FIXED64: u8 = 1;
pub const WIRE_LEN: u8 = 2;
pub const WIRE_FIXED32: u8 = 5;

// -------- Keys / report --------
pub const KEY_SEPARATOR: u8 = b'/';
pub const DEFAULT_DEPTH: usize = 2;

// -------- Scratch spool --------
/// state.bin stays in memory up to this size, then rolls over to a temp file.
pub const DEFAULT_SPOOL_MEM_BYTES: usize = 32 * 1024 * 1024;

pub const COPY_BUF_SIZE: usize = 64 * 1024;
