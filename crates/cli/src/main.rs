mod args;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{debug, error, info, warn};

use datesync_core::{
    load_config, validate_config, Config, RemoteConnector, RunReport, SanitizedConfig,
    SftpConnector, TransferOrchestrator,
};

use args::Cli;

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "datesync.toml";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format);

    let result = run(cli).await;
    if let Err(e) = &result {
        error!("Fatal error: {:#}", e);
    }
    std::process::exit(exit_code(&result));
}

/// Process status for a run: 0 once the run completed, even with skipped
/// tasks, and 1 when it could not be configured or did not finish.
fn exit_code<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

async fn run(cli: Cli) -> Result<RunReport> {
    let (config, today) = prepare(&cli)?;
    let report = execute(config, SftpConnector::new(), today).await?;

    if cli.summary_json {
        println!(
            "{}",
            serde_json::to_string(&report).context("Failed to serialize run summary")?
        );
    }

    Ok(report)
}

/// Loads and validates the configuration and resolves the run date.
fn prepare(cli: &Cli) -> Result<(Config, NaiveDate)> {
    let config_path = cli.config.clone().or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    });

    match &config_path {
        Some(path) => info!("Loading configuration from {}", path.display()),
        None => info!("No configuration file, reading settings from the environment"),
    }
    let mut config = load_config(config_path.as_deref()).with_context(|| {
        format!(
            "Failed to load configuration{}",
            config_path
                .as_deref()
                .map(|p| format!(" from {}", p.display()))
                .unwrap_or_default()
        )
    })?;

    validate_config(&config).context("Configuration validation failed")?;

    if cli.dry_run {
        config.job.dry_run = true;
    }
    if config.job.dry_run {
        warn!("Dry run: stale remote files will be reported, not deleted");
    }

    debug!(
        "Effective configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());
    Ok((config, today))
}

async fn execute<C>(config: Config, connector: C, today: NaiveDate) -> Result<RunReport>
where
    C: RemoteConnector,
{
    info!("Starting run for {}", today);

    let orchestrator = TransferOrchestrator::new(config, connector);
    let report = orchestrator
        .run(today)
        .await
        .context("Transfer run failed")?;

    print_summary(&report);
    Ok(report)
}

fn print_summary(report: &RunReport) {
    for path in &report.downloaded {
        info!("Downloaded: {}", path.display());
    }
    info!(
        "Summary for {}: {} files downloaded, {} download failures, {} deleted, {} delete failures, {} unparseable names, {} directories skipped",
        report.run_date,
        report.files_downloaded(),
        report.download_failures,
        report.deleted,
        report.delete_failures,
        report.unparseable,
        report.directories_skipped
    );
    if report.has_failures() {
        warn!("Run completed with failures; see the log above");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datesync_core::testing::{fixtures, MockRemote};
    use figment::Jail;
    use std::time::Duration;
    use tempfile::TempDir;

    const NO_PASSWORD: &str = r#"
[source]
host = "sftp.example.com"
user = "collector"

[traffic]
source_dir = "/out/traffic"
dest_dir = "/data/traffic"
file_pattern = "traffic_%Y%m%d.csv"

[backup]
source_dir = "/out/backup"
dest_dir = "/data/backup"
file_pattern = "backup_%Y%m%d.zip"
"#;

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_missing_config_value_exits_nonzero() {
        Jail::expect_with(|jail| {
            jail.create_file("datesync.toml", NO_PASSWORD)?;
            let cli = Cli::try_parse_from(["datesync", "--config", "datesync.toml"]).unwrap();

            let result = prepare(&cli);

            let err = result.as_ref().unwrap_err();
            assert!(format!("{err:#}").contains("source.password"));
            assert_eq!(exit_code(&result), 1);
            Ok(())
        });
    }

    #[tokio::test]
    async fn test_connect_failure_exits_nonzero() {
        let temp = TempDir::new().unwrap();
        let remote = MockRemote::new();
        remote.fail_connect();
        let config = fixtures::config(temp.path(), "t_%Y%m%d.csv", "b_%Y%m%d.zip");

        let result = execute(config, remote.connector(), run_date()).await;

        assert!(result.is_err());
        assert_eq!(exit_code(&result), 1);
    }

    #[tokio::test]
    async fn test_skipped_directory_still_exits_zero() {
        let temp = TempDir::new().unwrap();
        let remote = MockRemote::new()
            .with_file(fixtures::TRAFFIC_DIR, "t_20240115.csv", b"rows")
            .with_file(fixtures::BACKUP_DIR, "b_20240115.zip", b"zip");
        remote.fail_change_dir(fixtures::TRAFFIC_DIR);
        let config = fixtures::config(temp.path(), "t_%Y%m%d.csv", "b_%Y%m%d.zip");

        let result = execute(config, remote.connector(), run_date()).await;

        let report = result.as_ref().unwrap();
        assert_eq!(report.directories_skipped, 2);
        assert_eq!(report.files_downloaded(), 1);
        assert_eq!(exit_code(&result), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exits_nonzero() {
        let temp = TempDir::new().unwrap();
        let remote = MockRemote::new().with_file(fixtures::TRAFFIC_DIR, "t_20240115.csv", b"");
        remote.set_latency(Duration::from_secs(3600));
        let mut config = fixtures::config(temp.path(), "t_%Y%m%d.csv", "b_%Y%m%d.zip");
        config.job.run_timeout_secs = Some(1);

        let result = execute(config, remote.connector(), run_date()).await;

        assert_eq!(exit_code(&result), 1);
    }
}
