//! frames/varint - base-128 varint (protobuf wire format), u64, max 10 bytes.

use std::io::{self, Read};

use crate::consts::MAX_VARINT_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintError {
    /// Buffer ended inside the varint.
    Truncated,
    /// More than 10 bytes, or bits beyond u64.
    Overflow,
}

/// Result of reading a varint from a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintRead {
    /// (value, bytes consumed)
    Value(u64, usize),
    /// Clean end of stream before the first byte.
    Eof,
    /// Stream ended after this many bytes of an unfinished varint.
    Truncated(usize),
    Invalid,
}

pub fn encode_varint(mut v: u64, out: &mut Vec<u8>) {
    while v >= 0x80 {
        out.push((v as u8) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

pub fn varint_len(v: u64) -> usize {
    let bits = 64 - (v | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Decode from the head of `buf`. Returns (value, bytes consumed).
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize), VarintError> {
    let mut value = 0u64;
    for (i, &b) in buf.iter().enumerate().take(MAX_VARINT_LEN) {
        // 10-й байт несёт только бит 63
        if i == MAX_VARINT_LEN - 1 && b > 0x01 {
            return Err(VarintError::Overflow);
        }
        value |= u64::from(b & 0x7f) << (7 * i);
        if b & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    if buf.len() >= MAX_VARINT_LEN {
        Err(VarintError::Overflow)
    } else {
        Err(VarintError::Truncated)
    }
}

/// Read one varint from a stream, byte by byte (wrap the source in a BufReader).
pub fn read_varint<R: Read>(r: &mut R) -> io::Result<VarintRead> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        let mut byte = [0u8; 1];
        let n = loop {
            match r.read(&mut byte) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if n == 0 {
            return Ok(if i == 0 {
                VarintRead::Eof
            } else {
                VarintRead::Truncated(i)
            });
        }
        let b = byte[0];
        if i == MAX_VARINT_LEN - 1 && b > 0x01 {
            return Ok(VarintRead::Invalid);
        }
        value |= u64::from(b & 0x7f) << (7 * i);
        if b & 0x80 == 0 {
            return Ok(VarintRead::Value(value, i + 1));
        }
    }
    Ok(VarintRead::Invalid)
}
