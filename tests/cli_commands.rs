mod common;

use std::fs;

use anyhow::Result;
use clap::Parser;

use raftsnap::cli::{exec, Cli};
use raftsnap::{ConfigError, ExtractError};

use common::{
    archive, sample_records, snapshot_archive, state_bin, unique_root, write_file, TEST_META,
};

fn run(args: &[&str]) -> Result<String> {
    let mut argv = vec!["raftsnap"];
    argv.extend_from_slice(args);
    exec(Cli::try_parse_from(argv)?)
}

#[test]
fn inspect_table_and_json() -> Result<()> {
    let root = unique_root("cli");
    let path = write_file(
        &root,
        "snap.tar.gz",
        &snapshot_archive(TEST_META, &state_bin(&sample_records()))?,
    )?;
    let p = path.to_str().expect("utf-8 temp path");

    let table = run(&["inspect", p, "--depth", "2", "--format", "table"])?;
    assert!(table.starts_with("ID       test\n"));
    let a = table.find("a/b").expect("a/b row");
    let c = table.find("c/d").expect("c/d row");
    assert!(a < c);
    assert!(table.lines().last().unwrap_or_default().starts_with("Total Size"));

    let json = run(&["inspect", p, "--format", "json", "--filter", "c/"])?;
    let v: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(v["totalCount"], 2);
    assert_eq!(v["statsByPrefix"].as_array().map(|a| a.len()), Some(1));

    let plain = run(&["inspect", p, "--details", "false"])?;
    assert!(!plain.contains("Name"));

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn verify_prints_summary() -> Result<()> {
    let root = unique_root("cli-verify");
    let state = state_bin(&sample_records());
    let path = write_file(&root, "snap.tar.gz", &snapshot_archive(TEST_META, &state)?)?;
    let p = path.to_str().expect("utf-8 temp path");

    let out = run(&["verify", p])?;
    assert_eq!(out, format!("OK: 5 records, {}B in state.bin\n", state.len()));

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn config_file_layer() -> Result<()> {
    let root = unique_root("cli-config");
    let path = write_file(
        &root,
        "snap.tar.gz",
        &snapshot_archive(TEST_META, &state_bin(&sample_records()))?,
    )?;
    let conf = write_file(&root, "raftsnap.toml", b"depth = 1\nformat = \"json\"\n")?;
    let p = path.to_str().expect("utf-8 temp path");
    let c = conf.to_str().expect("utf-8 temp path");

    let out = run(&["inspect", p, "--config", c])?;
    let v: serde_json::Value = serde_json::from_str(&out)?;
    assert_eq!(v["statsByPrefix"][0]["name"], "a");
    assert_eq!(v["statsByPrefix"][0]["count"], 3);

    // flags win over the file
    let out = run(&["inspect", p, "--config", c, "--format", "table"])?;
    assert!(out.starts_with("ID"));

    let bad = write_file(&root, "bad.toml", b"colour = \"red\"\n")?;
    let err = run(&["inspect", p, "--config", bad.to_str().expect("utf-8")]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::File { .. })
    ));

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn usage_errors_before_opening_archive() -> Result<()> {
    // archive does not exist: validation must fail first
    let err = run(&["inspect", "/nonexistent/raftsnap.snap", "--depth", "-1"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::NegativeDepth(-1))
    ));
    let err = run(&["inspect", "/nonexistent/raftsnap.snap", "--format", "yaml"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::UnknownFormat(_))
    ));
    assert!(run(&["inspect"]).is_err());
    Ok(())
}

#[test]
fn failure_has_no_report() -> Result<()> {
    let root = unique_root("cli-fail");
    let state = state_bin(&sample_records());
    let bytes = archive(&[("meta.json", TEST_META.as_bytes()), ("state.bin", &state)])?;
    let path = write_file(&root, "snap.tar.gz", &bytes)?;

    let err = run(&["inspect", path.to_str().expect("utf-8")]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::MissingMember("SHA256SUMS"))
    ));
    // context names the file
    assert!(format!("{:#}", err).contains("snap.tar.gz"));

    fs::remove_dir_all(&root)?;
    Ok(())
}
