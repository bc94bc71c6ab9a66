mod common;

use std::io::Cursor;

use anyhow::Result;

use raftsnap::{inspect_reader, ExtractError, InspectBuilder, InspectConfig, IntegrityError};

use common::{archive, sample_records, state_bin, sums, TEST_META};

fn cfg() -> InspectConfig {
    InspectBuilder::from_default().build().expect("valid config")
}

fn integrity_error(err: &anyhow::Error) -> Option<&IntegrityError> {
    match err.downcast_ref::<ExtractError>() {
        Some(ExtractError::IntegrityFailure(e)) => Some(e),
        _ => None,
    }
}

#[test]
fn payload_byte_flip_is_hash_mismatch() -> Result<()> {
    let state = state_bin(&sample_records());
    let manifest = sums(&[("meta.json", TEST_META.as_bytes()), ("state.bin", &state)]);

    let mut rng = oorandom::Rand32::new(0xdecade);
    for _ in 0..16 {
        let mut bad = state.clone();
        let pos = rng.rand_range(0..bad.len() as u32) as usize;
        let bit = 1u8 << rng.rand_range(0..8);
        bad[pos] ^= bit;

        let bytes = archive(&[
            ("meta.json", TEST_META.as_bytes()),
            ("state.bin", &bad),
            ("SHA256SUMS", manifest.as_bytes()),
        ])?;
        let err = inspect_reader(Cursor::new(bytes), &cfg()).unwrap_err();
        match integrity_error(&err) {
            Some(IntegrityError::HashMismatch(name)) => assert_eq!(name, "state.bin"),
            other => panic!("pos {}: unexpected {:?} ({:#})", pos, other, err),
        }
    }
    Ok(())
}

#[test]
fn metadata_change_is_hash_mismatch() -> Result<()> {
    let state = state_bin(&sample_records());
    let manifest = sums(&[("meta.json", TEST_META.as_bytes()), ("state.bin", &state)]);
    let other_meta = TEST_META.replace("\"Term\":2", "\"Term\":3");

    let bytes = archive(&[
        ("meta.json", other_meta.as_bytes()),
        ("state.bin", &state),
        ("SHA256SUMS", manifest.as_bytes()),
    ])?;
    let err = inspect_reader(Cursor::new(bytes), &cfg()).unwrap_err();
    assert!(matches!(
        integrity_error(&err),
        Some(IntegrityError::HashMismatch(name)) if name == "meta.json"
    ));
    Ok(())
}

#[test]
fn manifest_byte_flip_fails() -> Result<()> {
    let state = state_bin(&sample_records());
    let manifest = sums(&[("meta.json", TEST_META.as_bytes()), ("state.bin", &state)]);

    let mut rng = oorandom::Rand32::new(7);
    for _ in 0..16 {
        let mut bad = manifest.clone().into_bytes();
        let pos = rng.rand_range(0..bad.len() as u32) as usize;
        // printable replacement keeps the text UTF-8
        bad[pos] = if bad[pos] == b'0' { b'1' } else { b'0' };

        let bytes = archive(&[
            ("meta.json", TEST_META.as_bytes()),
            ("state.bin", &state),
            ("SHA256SUMS", &bad),
        ])?;
        let err = inspect_reader(Cursor::new(bytes), &cfg()).unwrap_err();
        assert!(
            integrity_error(&err).is_some(),
            "pos {}: expected integrity failure, got {:#}",
            pos,
            err
        );
    }
    Ok(())
}

#[test]
fn manifest_hex_flip_is_hash_mismatch() -> Result<()> {
    let state = state_bin(&sample_records());
    let manifest = sums(&[("meta.json", TEST_META.as_bytes()), ("state.bin", &state)]);
    let mut lines: Vec<String> = manifest.lines().map(str::to_string).collect();
    let first = if lines[1].starts_with('a') { "b" } else { "a" };
    lines[1].replace_range(0..1, first);
    let bad = lines.join("\n") + "\n";

    let bytes = archive(&[
        ("meta.json", TEST_META.as_bytes()),
        ("state.bin", &state),
        ("SHA256SUMS", bad.as_bytes()),
    ])?;
    let err = inspect_reader(Cursor::new(bytes), &cfg()).unwrap_err();
    assert!(matches!(
        integrity_error(&err),
        Some(IntegrityError::HashMismatch(name)) if name == "state.bin"
    ));
    Ok(())
}

#[test]
fn manifest_without_state_entry() -> Result<()> {
    let state = state_bin(&sample_records());
    let manifest = sums(&[("meta.json", TEST_META.as_bytes())]);
    let bytes = archive(&[
        ("meta.json", TEST_META.as_bytes()),
        ("state.bin", &state),
        ("SHA256SUMS", manifest.as_bytes()),
    ])?;
    let err = inspect_reader(Cursor::new(bytes), &cfg()).unwrap_err();
    assert!(matches!(
        integrity_error(&err),
        Some(IntegrityError::MissingFromManifest(name)) if name == "state.bin"
    ));
    Ok(())
}

#[test]
fn manifest_with_extra_entry() -> Result<()> {
    let state = state_bin(&sample_records());
    let manifest = sums(&[
        ("meta.json", TEST_META.as_bytes()),
        ("state.bin", &state),
        ("extra.bin", b"zzz"),
    ]);
    let bytes = archive(&[
        ("meta.json", TEST_META.as_bytes()),
        ("state.bin", &state),
        ("SHA256SUMS", manifest.as_bytes()),
    ])?;
    let err = inspect_reader(Cursor::new(bytes), &cfg()).unwrap_err();
    assert!(matches!(
        integrity_error(&err),
        Some(IntegrityError::UnknownFile(name)) if name == "extra.bin"
    ));
    Ok(())
}

#[test]
fn malformed_manifest_line() -> Result<()> {
    let state = state_bin(&sample_records());
    let bytes = archive(&[
        ("meta.json", TEST_META.as_bytes()),
        ("state.bin", &state),
        ("SHA256SUMS", b"not-a-digest meta.json\n"),
    ])?;
    let err = inspect_reader(Cursor::new(bytes), &cfg()).unwrap_err();
    assert!(matches!(
        integrity_error(&err),
        Some(IntegrityError::ManifestParseError { line: 1, .. })
    ));
    Ok(())
}
