//! Types for the transfer orchestrator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{Config, FileSetConfig};
use crate::pattern::DateTemplate;
use crate::remote::RemoteError;
use crate::retention::SweepReport;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The remote session could not be established.
    #[error("remote session error: {0}")]
    Session(#[source] RemoteError),

    /// The run did not finish within `job.run_timeout_secs`.
    #[error("run exceeded its deadline of {secs}s")]
    Deadline { secs: u64 },
}

/// One download-and-retention unit of a run.
#[derive(Debug, Clone)]
pub struct TransferTask {
    /// Which file set this is ("traffic" or "backup").
    pub label: &'static str,
    /// Today's concrete filename.
    pub filename: String,
    pub remote_dir: String,
    pub local_dir: PathBuf,
    /// Template deciding which files in `remote_dir` are pruned.
    pub retention: DateTemplate,
}

impl TransferTask {
    fn new(
        label: &'static str,
        files: &FileSetConfig,
        today: NaiveDate,
        retention_pattern: &str,
    ) -> Self {
        Self {
            label,
            filename: DateTemplate::parse(&files.file_pattern).render(today),
            remote_dir: files.source_dir.clone(),
            local_dir: files.dest_dir.clone(),
            retention: DateTemplate::parse(retention_pattern),
        }
    }

    /// Builds the run's task list.
    ///
    /// Retention is cross-wired: the traffic directory is pruned with the
    /// backup template and the backup directory with the traffic template.
    /// The deployed job has always paired them this way.
    pub fn plan(config: &Config, today: NaiveDate) -> Vec<TransferTask> {
        vec![
            Self::new("traffic", &config.traffic, today, &config.backup.file_pattern),
            Self::new("backup", &config.backup, today, &config.traffic.file_pattern),
        ]
    }

    /// Where today's file lands locally.
    pub fn local_path(&self) -> PathBuf {
        self.local_dir.join(&self.filename)
    }
}

/// Counts and paths collected over one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_date: NaiveDate,
    /// Local paths of the files downloaded, in task order.
    pub downloaded: Vec<PathBuf>,
    pub bytes_downloaded: u64,
    pub download_failures: usize,
    pub deleted: usize,
    pub delete_failures: usize,
    /// Remote names shaped like a template but carrying an invalid date.
    pub unparseable: usize,
    /// Stale files kept because the run was a dry run.
    pub retained_dry_run: usize,
    /// Remote directories that could not be entered or listed.
    pub directories_skipped: usize,
    /// Cleanups skipped because the retention template has no date field.
    pub cleanups_skipped: usize,
}

impl RunReport {
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            run_date,
            downloaded: Vec::new(),
            bytes_downloaded: 0,
            download_failures: 0,
            deleted: 0,
            delete_failures: 0,
            unparseable: 0,
            retained_dry_run: 0,
            directories_skipped: 0,
            cleanups_skipped: 0,
        }
    }

    pub fn files_downloaded(&self) -> usize {
        self.downloaded.len()
    }

    pub fn record_download(&mut self, path: PathBuf, bytes: u64) {
        self.downloaded.push(path);
        self.bytes_downloaded += bytes;
    }

    pub fn record_sweep(&mut self, sweep: &SweepReport) {
        self.deleted += sweep.deleted;
        self.delete_failures += sweep.delete_failures;
        self.unparseable += sweep.unparseable;
        self.retained_dry_run += sweep.retained_dry_run;
        if sweep.listing_failed {
            self.directories_skipped += 1;
        }
    }

    /// Whether any task or entry failed along the way.
    pub fn has_failures(&self) -> bool {
        self.download_failures > 0 || self.delete_failures > 0 || self.directories_skipped > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use std::path::Path;

    #[test]
    fn test_plan_renders_today_and_cross_wires_retention() {
        let config = fixtures::config(Path::new("/local"), "traffic_%Y%m%d.csv", "backup_%d%m%Y.zip");
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        let tasks = TransferTask::plan(&config, today);
        assert_eq!(tasks.len(), 2);

        assert_eq!(tasks[0].label, "traffic");
        assert_eq!(tasks[0].filename, "traffic_20240309.csv");
        assert_eq!(tasks[0].remote_dir, fixtures::TRAFFIC_DIR);
        assert_eq!(tasks[0].local_path(), PathBuf::from("/local/traffic/traffic_20240309.csv"));
        assert_eq!(tasks[0].retention.as_str(), "backup_%d%m%Y.zip");

        assert_eq!(tasks[1].label, "backup");
        assert_eq!(tasks[1].filename, "backup_09032024.zip");
        assert_eq!(tasks[1].remote_dir, fixtures::BACKUP_DIR);
        assert_eq!(tasks[1].retention.as_str(), "traffic_%Y%m%d.csv");
    }

    #[test]
    fn test_record_sweep_accumulates() {
        let mut report = RunReport::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        report.record_sweep(&SweepReport {
            deleted: 2,
            delete_failures: 1,
            unparseable: 1,
            ..Default::default()
        });
        report.record_sweep(&SweepReport {
            listing_failed: true,
            ..Default::default()
        });

        assert_eq!(report.deleted, 2);
        assert_eq!(report.delete_failures, 1);
        assert_eq!(report.unparseable, 1);
        assert_eq!(report.directories_skipped, 1);
        assert!(report.has_failures());
    }

    #[test]
    fn test_run_report_serialization() {
        let mut report = RunReport::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        report.record_download(PathBuf::from("/local/a.csv"), 42);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["run_date"], "2024-01-15");
        assert_eq!(json["bytes_downloaded"], 42);

        let parsed: RunReport = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, report);
        assert!(!parsed.has_failures());
    }
}
