use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser, Subcommand};
use log::debug;
use std::path::{Path, PathBuf};

use crate::config::{FileConfig, InspectConfig, OutputFormat};
use crate::inspect::{inspect_file, verify_file};
use crate::metrics;
use crate::report::{humanize_bytes, render};

#[derive(Parser, Debug)]
#[command(
    name = "raftsnap",
    version,
    about = "Inspect and verify Raft snapshot archives",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Verify the archive and print metadata plus per-prefix key statistics.
    Inspect {
        /// Snapshot archive (.snap, gzip+tar)
        path: PathBuf,

        /// Include the per-prefix breakdown (true|false); bare --details means true
        #[arg(
            long,
            action = ArgAction::Set,
            num_args = 0..=1,
            default_missing_value = "true"
        )]
        details: Option<bool>,

        /// Prefix depth in key segments; 0 = full key
        #[arg(long, allow_negative_numbers = true)]
        depth: Option<i64>,

        /// Only count keys starting with this literal prefix
        #[arg(long)]
        filter: Option<String>,

        /// Output format: table|json
        #[arg(long)]
        format: Option<String>,

        /// Config file (TOML). CLI flags override config values.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Verify SHA256SUMS and every state.bin frame; print a one-line summary.
    Verify {
        path: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Parse argv. Help/version exit 0; any other usage error exits 1.
pub fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    }
}

pub fn run() -> Result<()> {
    let cli = parse_args();
    let out = exec(cli)?;
    print!("{}", out);

    let m = metrics::snapshot();
    debug!(
        "metrics: members={}, spooled={}B (rollovers={}), frames={} (avg {:.1}B), aggregated={}, skipped={}",
        m.members_read,
        m.payload_bytes_spooled,
        m.spool_rollovers,
        m.frames_decoded,
        m.avg_frame_bytes(),
        m.records_aggregated,
        m.records_skipped
    );
    Ok(())
}

/// Run a parsed command and return what goes to stdout.
pub fn exec(cli: Cli) -> Result<String> {
    match cli.cmd {
        Cmd::Inspect {
            path,
            details,
            depth,
            filter,
            format,
            config,
        } => {
            let cfg = resolve_config(config.as_deref(), details, depth, filter, format)?;
            cmd_inspect(&path, &cfg)
        }
        Cmd::Verify { path, config } => {
            let cfg = resolve_config(config.as_deref(), None, None, None, None)?;
            cmd_verify(&path, &cfg)
        }
    }
}

/// env → --config file → flags. Fails before the archive is opened.
pub fn resolve_config(
    config: Option<&Path>,
    details: Option<bool>,
    depth: Option<i64>,
    filter: Option<String>,
    format: Option<String>,
) -> Result<InspectConfig> {
    let mut cfg = InspectConfig::from_env();
    if let Some(p) = config {
        let file = FileConfig::load(p)?;
        cfg.apply_file(&file)
            .with_context(|| format!("apply config {}", p.display()))?;
    }

    if let Some(d) = details {
        cfg.details = d;
    }
    if let Some(d) = depth {
        cfg.depth = d;
    }
    if filter.is_some() {
        cfg = cfg.with_filter(filter);
    }
    if let Some(f) = format {
        cfg.format = f.parse::<OutputFormat>()?;
    }

    cfg.validate()?;
    debug!("config: {}", cfg);
    Ok(cfg)
}

fn cmd_inspect(path: &Path, cfg: &InspectConfig) -> Result<String> {
    let report = inspect_file(path, cfg)?;
    let out = render(&report, cfg.format).context("render report")?;
    Ok(out)
}

fn cmd_verify(path: &Path, cfg: &InspectConfig) -> Result<String> {
    let s = verify_file(path, cfg)?;
    Ok(format!(
        "OK: {} records, {} in state.bin\n",
        s.records,
        humanize_bytes(s.state_bytes)
    ))
}
