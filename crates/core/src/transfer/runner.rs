//! Transfer orchestrator implementation.
//!
//! One run is two sequential passes over the task list on a single session:
//! - Download: today's file of each task into its local directory
//! - Cleanup: stale dated files in each task's remote directory

use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::remote::{RemoteConnector, RemoteSession, SessionGuard};
use crate::retention;

use super::local;
use super::types::{RunReport, TransferError, TransferTask};

/// Downloads today's files and prunes stale ones over one remote session.
pub struct TransferOrchestrator<C>
where
    C: RemoteConnector,
{
    config: Config,
    connector: C,
}

impl<C> TransferOrchestrator<C>
where
    C: RemoteConnector,
{
    /// Create a new orchestrator.
    pub fn new(config: Config, connector: C) -> Self {
        Self { config, connector }
    }

    /// The tasks a run on `today` would execute.
    pub fn tasks(&self, today: NaiveDate) -> Vec<TransferTask> {
        TransferTask::plan(&self.config, today)
    }

    /// Execute one run for `today`.
    ///
    /// Only a failed session or an exceeded deadline is an error; everything
    /// else is logged and counted in the returned report.
    pub async fn run(&self, today: NaiveDate) -> Result<RunReport, TransferError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id, date = %today);
        let work = self.execute(today).instrument(span);

        match self.config.job.run_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), work)
                .await
                .unwrap_or_else(|_| {
                    error!("Run {} exceeded its deadline of {}s", run_id, secs);
                    Err(TransferError::Deadline { secs })
                }),
            None => work.await,
        }
    }

    async fn execute(&self, today: NaiveDate) -> Result<RunReport, TransferError> {
        let tasks = self.tasks(today);
        let mut report = RunReport::new(today);

        let source = &self.config.source;
        info!(
            "Connecting to {}:{} as {} ({})",
            source.host,
            source.port,
            source.user,
            self.connector.name()
        );
        let session = self.connector.connect(source).await.map_err(|e| {
            error!("Failed to connect: {}", e);
            TransferError::Session(e)
        })?;
        let mut session = SessionGuard::new(session);
        info!("Connected to {}", source.host);

        for task in &tasks {
            self.download(&mut *session, task, &mut report).await;
        }

        if report.files_downloaded() == 0 {
            warn!("No files were downloaded");
        }

        for task in &tasks {
            self.cleanup(&mut *session, task, today, &mut report).await;
        }

        session.release();

        info!(
            "Run finished: {} downloaded ({} bytes), {} download failures, {} deleted, {} delete failures, {} directories skipped",
            report.files_downloaded(),
            report.bytes_downloaded,
            report.download_failures,
            report.deleted,
            report.delete_failures,
            report.directories_skipped
        );

        Ok(report)
    }

    async fn download(
        &self,
        session: &mut C::Session,
        task: &TransferTask,
        report: &mut RunReport,
    ) {
        info!(
            "Downloading {} file {} from {}",
            task.label, task.filename, task.remote_dir
        );

        if let Err(e) = session.change_dir(&task.remote_dir).await {
            warn!("Skipping {} download: {}", task.label, e);
            report.directories_skipped += 1;
            return;
        }

        match local::ensure_dir(&task.local_dir).await {
            Ok(true) => info!("Created local directory {}", task.local_dir.display()),
            Ok(false) => {}
            Err(e) => {
                warn!(
                    "Skipping {} download: cannot create {}: {}",
                    task.label,
                    task.local_dir.display(),
                    e
                );
                report.download_failures += 1;
                return;
            }
        }

        let local_path = task.local_path();
        match session.download(&task.filename, &local_path).await {
            Ok(bytes) => {
                info!(
                    "Downloaded {} to {} ({} bytes)",
                    task.filename,
                    local_path.display(),
                    bytes
                );
                report.record_download(local_path, bytes);
            }
            Err(e) => {
                warn!("Error downloading {}: {}", task.filename, e);
                local::discard_partial(&local_path).await;
                report.download_failures += 1;
            }
        }
    }

    async fn cleanup(
        &self,
        session: &mut C::Session,
        task: &TransferTask,
        today: NaiveDate,
        report: &mut RunReport,
    ) {
        if !task.retention.is_dated() {
            info!(
                "Skipping cleanup of {}: {} has no date fields",
                task.remote_dir, task.retention
            );
            report.cleanups_skipped += 1;
            return;
        }

        debug!(
            "Cleaning {} with {} retention template",
            task.remote_dir, task.retention
        );
        if let Err(e) = session.change_dir(&task.remote_dir).await {
            warn!("Skipping cleanup of {}: {}", task.remote_dir, e);
            report.directories_skipped += 1;
            return;
        }

        let sweep =
            retention::sweep(session, &task.retention, today, self.config.job.dry_run).await;
        report.record_sweep(&sweep);
    }
}
