//! CLI argument definitions for datesync.

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Daily SFTP download and retention job.
///
/// Downloads today's traffic and backup files from the SFTP source into
/// their local directories, then deletes remote files whose date is
/// older than the run date.
///
/// ## Examples
///
/// Run for today with settings from ./datesync.toml and the environment:
///   datesync
///
/// Re-run a missed day without deleting anything:
///   datesync --date 2024-01-15 --dry-run
#[derive(Parser, Debug)]
#[command(name = "datesync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file (default: ./datesync.toml if present)
    #[arg(short, long, env = "DATESYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run date as YYYY-MM-DD (default: today, local time)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Report stale remote files without deleting them
    #[arg(long)]
    pub dry_run: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub summary_json: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date in YYYY-MM-DD form", s))
}
