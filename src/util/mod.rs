//! util - общие утилиты (hex для SHA256SUMS, печать ключей).

/// Lowercase hex of a byte slice.
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

/// Decode hex (either case). Returns None on odd length or a non-hex digit.
pub fn decode_hex(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    if bytes.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        let h = (pair[0] as char).to_digit(16)?;
        let l = (pair[1] as char).to_digit(16)?;
        out.push(((h << 4) | l) as u8);
    }
    Some(out)
}

/// Key bytes as text; invalid UTF-8 sequences are replaced, never rejected.
pub fn display_key(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let v = [0x00u8, 0x7f, 0xAB, 0xff];
        let s = hex_encode(&v);
        assert_eq!(s, "007fabff");
        assert_eq!(decode_hex(&s).unwrap(), v);
        assert_eq!(decode_hex("007FABFF").unwrap(), v);
    }

    #[test]
    fn hex_bad() {
        assert!(decode_hex("abc").is_none());
        assert!(decode_hex("zz").is_none());
    }

    #[test]
    fn display_key_lossy() {
        assert_eq!(display_key(b"a/b"), "a/b");
        assert_eq!(display_key(&[0x61, 0xff]), "a\u{fffd}");
    }
}
