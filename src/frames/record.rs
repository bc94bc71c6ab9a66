//! frames/record - StorageRecord and its body encoding.
//!
//! Тело кадра - protobuf-сообщение из двух полей:
//!   1: Key   (bytes, wire type 2)
//!   2: Value (bytes, wire type 2)
//! Незнакомые поля пропускаются по wire type; повтор поля - побеждает последнее.
//!
//! Кодировщик нужен для фикстур и тестов; запись снапшотов этот крейт не делает.

use crate::consts::{FIELD_KEY, FIELD_VALUE, WIRE_FIXED32, WIRE_FIXED64, WIRE_LEN, WIRE_VARINT};

use super::varint::{decode_varint, encode_varint, varint_len};

/// One key/value entry of the state machine. Lives for a single callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageRecord {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl StorageRecord {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Decode a frame body. The error string says what is wrong; the caller adds the offset.
    pub fn decode(body: &[u8]) -> Result<Self, String> {
        let mut rec = StorageRecord::default();
        let mut pos = 0usize;

        while pos < body.len() {
            let (tag, n) = decode_varint(&body[pos..])
                .map_err(|e| format!("field tag at +{}: {:?}", pos, e))?;
            pos += n;
            let field = tag >> 3;
            let wire = (tag & 0x7) as u8;
            if field == 0 {
                return Err(format!("field number 0 at +{}", pos - n));
            }
            if (field == FIELD_KEY as u64 || field == FIELD_VALUE as u64) && wire != WIRE_LEN {
                return Err(format!(
                    "field {} has wire type {}, expected {}",
                    field, wire, WIRE_LEN
                ));
            }

            match wire {
                WIRE_VARINT => {
                    let (_, n) = decode_varint(&body[pos..])
                        .map_err(|e| format!("varint field {} at +{}: {:?}", field, pos, e))?;
                    pos += n;
                }
                WIRE_FIXED64 => pos = skip(body, pos, 8, field)?,
                WIRE_FIXED32 => pos = skip(body, pos, 4, field)?,
                WIRE_LEN => {
                    let (len, n) = decode_varint(&body[pos..])
                        .map_err(|e| format!("length of field {} at +{}: {:?}", field, pos, e))?;
                    pos += n;
                    let len = usize::try_from(len)
                        .map_err(|_| format!("field {} length {} too large", field, len))?;
                    let start = pos;
                    pos = skip(body, pos, len, field)?;
                    let data = &body[start..pos];
                    if field == FIELD_KEY as u64 {
                        rec.key = data.to_vec();
                    } else if field == FIELD_VALUE as u64 {
                        rec.value = data.to_vec();
                    }
                }
                other => return Err(format!("unsupported wire type {} for field {}", other, field)),
            }
        }
        Ok(rec)
    }

    /// Encoded body size (without the frame length prefix).
    pub fn encoded_len(&self) -> usize {
        field_len(FIELD_KEY, self.key.len()) + field_len(FIELD_VALUE, self.value.len())
    }

    /// Append the body. Empty fields are omitted, as proto3 does.
    pub fn encode(&self, out: &mut Vec<u8>) {
        put_bytes_field(FIELD_KEY, &self.key, out);
        put_bytes_field(FIELD_VALUE, &self.value, out);
    }
}

fn skip(body: &[u8], pos: usize, len: usize, field: u64) -> Result<usize, String> {
    match pos.checked_add(len) {
        Some(end) if end <= body.len() => Ok(end),
        _ => Err(format!(
            "field {} needs {} byte(s) at +{}, frame has {}",
            field,
            len,
            pos,
            body.len().saturating_sub(pos)
        )),
    }
}

fn field_len(field: u32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let tag = ((field as u64) << 3) | WIRE_LEN as u64;
    varint_len(tag) + varint_len(len as u64) + len
}

fn put_bytes_field(field: u32, data: &[u8], out: &mut Vec<u8>) {
    if data.is_empty() {
        return;
    }
    encode_varint(((field as u64) << 3) | WIRE_LEN as u64, out);
    encode_varint(data.len() as u64, out);
    out.extend_from_slice(data);
}

/// Append one frame `[varint len][body]`; returns its wire size.
pub fn encode_frame(rec: &StorageRecord, out: &mut Vec<u8>) -> usize {
    let body_len = rec.encoded_len();
    let before = out.len();
    encode_varint(body_len as u64, out);
    rec.encode(out);
    out.len() - before
}
