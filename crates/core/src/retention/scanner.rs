//! Classification and deletion of dated remote files.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::types::{DeletionReport, RetentionDecision, ScannedEntry, SweepReport};
use crate::pattern::{DateMatcher, DateTemplate};
use crate::remote::RemoteSession;

/// Decides what to do with a single filename.
///
/// Dates are compared at day granularity: a file dated `today` is fresh.
pub fn classify(filename: &str, matcher: &DateMatcher, today: NaiveDate) -> RetentionDecision {
    let Some(parts) = matcher.captures(filename) else {
        return RetentionDecision::NoMatch;
    };

    match parts.to_date() {
        Ok(date) if date < today => RetentionDecision::Stale(date),
        Ok(date) => RetentionDecision::Fresh(date),
        Err(e) => RetentionDecision::Unparseable(e),
    }
}

/// Classifies every entry of a listing, preserving order.
pub fn scan<I, S>(entries: I, matcher: &DateMatcher, today: NaiveDate) -> Vec<ScannedEntry>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    entries
        .into_iter()
        .map(|name| {
            let filename = name.into();
            let decision = classify(&filename, matcher, today);
            match &decision {
                RetentionDecision::Unparseable(e) => {
                    warn!("Skipping {}: cannot read its date ({})", filename, e)
                }
                RetentionDecision::Fresh(date) => {
                    debug!("Keeping {} (dated {})", filename, date)
                }
                RetentionDecision::Stale(_) | RetentionDecision::NoMatch => {}
            }
            ScannedEntry { filename, decision }
        })
        .collect()
}

/// Deletes every stale entry through `session`.
///
/// Each deletion is attempted independently; a failure is logged and
/// counted and the remaining entries are still tried.
pub async fn apply<R>(entries: &[ScannedEntry], session: &mut R) -> DeletionReport
where
    R: RemoteSession + ?Sized,
{
    let mut report = DeletionReport::default();

    for entry in entries {
        let RetentionDecision::Stale(date) = entry.decision else {
            continue;
        };

        info!("Deleting old file: {} (dated {})", entry.filename, date);
        match session.remove(&entry.filename).await {
            Ok(()) => {
                report.deleted += 1;
                info!("Deleted {}", entry.filename);
            }
            Err(e) => {
                report.failed += 1;
                warn!("Error deleting {}: {}", entry.filename, e);
            }
        }
    }

    report
}

/// Lists the session's current directory and removes files that `template`
/// dates before `today`.
///
/// A failed listing is reported and treated as empty. With `dry_run` the
/// stale files are only counted.
pub async fn sweep<R>(
    session: &mut R,
    template: &DateTemplate,
    today: NaiveDate,
    dry_run: bool,
) -> SweepReport
where
    R: RemoteSession + ?Sized,
{
    info!("Looking for old files matching {}", template);
    let matcher = template.compile();

    let (listing, listing_failed) = match session.list_entries().await {
        Ok(entries) => (entries, false),
        Err(e) => {
            warn!("Error listing files: {}", e);
            (Vec::new(), true)
        }
    };

    debug!("Matching {} entries against {}", listing.len(), matcher.as_str());
    let entries = scan(listing, &matcher, today);
    let mut report = SweepReport::from_scan(&entries);
    report.listing_failed = listing_failed;

    if dry_run {
        for entry in entries.iter().filter(|e| e.decision.is_stale()) {
            info!("Dry run: would delete {}", entry.filename);
        }
        report.retained_dry_run = report.stale;
        return report;
    }

    let deletion = apply(&entries, session).await;
    report.deleted = deletion.deleted;
    report.delete_failures = deletion.failed;

    if report.deleted == 0 {
        info!("No old files were deleted");
    } else {
        info!("Total files deleted: {}", report.deleted);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{self, DateError};
    use crate::remote::RemoteSession;
    use crate::testing::MockRemote;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn decisions(entries: &[ScannedEntry]) -> Vec<RetentionDecision> {
        entries.iter().map(|e| e.decision.clone()).collect()
    }

    #[test]
    fn test_today_is_not_stale() {
        let matcher = pattern::compile("report_%Y%m%d.csv");
        let entries = scan(
            ["report_20240101.csv", "report_20240115.csv", "report_20240201.csv"],
            &matcher,
            date(2024, 1, 15),
        );

        assert_eq!(
            decisions(&entries),
            vec![
                RetentionDecision::Stale(date(2024, 1, 1)),
                RetentionDecision::Fresh(date(2024, 1, 15)),
                RetentionDecision::Fresh(date(2024, 2, 1)),
            ]
        );
    }

    #[test]
    fn test_unmatched_and_invalid_names() {
        let matcher = pattern::compile("report_%Y%m%d.csv");
        let today = date(2024, 6, 1);

        assert_eq!(
            classify("summary.txt", &matcher, today),
            RetentionDecision::NoMatch
        );
        assert_eq!(
            classify("report_20241301.csv", &matcher, today),
            RetentionDecision::Unparseable(DateError::InvalidDate {
                year: 2024,
                month: 13,
                day: 1
            })
        );
        assert_eq!(
            classify("report_20230931.csv", &matcher, today),
            RetentionDecision::Unparseable(DateError::InvalidDate {
                year: 2023,
                month: 9,
                day: 31
            })
        );
    }

    #[test]
    fn test_partial_template_is_never_stale() {
        let matcher = pattern::compile("monthly_%Y-%m.csv");
        let decision = classify("monthly_2001-01.csv", &matcher, date(2024, 6, 1));
        assert!(matches!(decision, RetentionDecision::Unparseable(_)));
    }

    #[test]
    fn test_scan_is_deterministic() {
        let matcher = pattern::compile("%d%m%Y.log");
        let listing = vec!["01012020.log", "31122099.log", "x.log", "32012020.log"];
        let today = date(2024, 1, 1);

        let first = scan(listing.clone(), &matcher, today);
        let second = scan(listing, &matcher, today);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_apply_continues_after_failure() {
        let remote = MockRemote::new()
            .with_file("/", "r_20240101.csv", b"")
            .with_file("/", "r_20240102.csv", b"")
            .with_file("/", "r_20240103.csv", b"");
        remote.fail_remove("r_20240102.csv");
        let mut session = remote.session();

        let matcher = pattern::compile("r_%Y%m%d.csv");
        let entries = scan(
            session.list_entries().await.unwrap(),
            &matcher,
            date(2024, 2, 1),
        );
        let report = apply(&entries, &mut session).await;

        assert_eq!(report, DeletionReport { deleted: 2, failed: 1 });
        assert_eq!(
            remote.remove_attempts(),
            vec!["r_20240101.csv", "r_20240102.csv", "r_20240103.csv"]
        );
        assert_eq!(remote.files("/"), vec!["r_20240102.csv"]);
    }

    #[tokio::test]
    async fn test_sweep_deletes_only_stale_matches() {
        let remote = MockRemote::new()
            .with_file("/out", "report_20240101.csv", b"")
            .with_file("/out", "report_20240115.csv", b"")
            .with_file("/out", "report_20240201.csv", b"")
            .with_file("/out", "report_20240230.csv", b"")
            .with_file("/out", "readme.txt", b"");
        let mut session = remote.session();
        session.change_dir("/out").await.unwrap();

        let template = DateTemplate::parse("report_%Y%m%d.csv");
        let report = sweep(&mut session, &template, date(2024, 1, 15), false).await;

        assert_eq!(report.listed, 5);
        assert_eq!(report.stale, 1);
        assert_eq!(report.fresh, 2);
        assert_eq!(report.unparseable, 1);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.delete_failures, 0);
        assert_eq!(
            remote.files("/out"),
            vec![
                "readme.txt",
                "report_20240115.csv",
                "report_20240201.csv",
                "report_20240230.csv"
            ]
        );
    }

    #[tokio::test]
    async fn test_second_sweep_finds_nothing() {
        let remote = MockRemote::new()
            .with_file("/", "b_01-01-2024.zip", b"")
            .with_file("/", "b_02-01-2024.zip", b"")
            .with_file("/", "b_10-01-2024.zip", b"");
        let mut session = remote.session();
        let template = DateTemplate::parse("b_%d-%m-%Y.zip");
        let today = date(2024, 1, 10);

        let first = sweep(&mut session, &template, today, false).await;
        assert_eq!(first.deleted, 2);

        let second = sweep(&mut session, &template, today, false).await;
        assert_eq!(second.stale, 0);
        assert_eq!(second.deleted, 0);
        assert_eq!(second.fresh, 1);
    }

    #[tokio::test]
    async fn test_sweep_listing_failure_is_empty() {
        let remote = MockRemote::new().with_file("/", "r_20200101.csv", b"");
        remote.fail_listing("/");
        let mut session = remote.session();

        let template = DateTemplate::parse("r_%Y%m%d.csv");
        let report = sweep(&mut session, &template, date(2024, 1, 1), false).await;

        assert!(report.listing_failed);
        assert_eq!(report.listed, 0);
        assert!(remote.remove_attempts().is_empty());
        assert_eq!(remote.files("/"), vec!["r_20200101.csv"]);
    }

    #[tokio::test]
    async fn test_sweep_dry_run_keeps_files() {
        let remote = MockRemote::new()
            .with_file("/", "r_20200101.csv", b"")
            .with_file("/", "r_20200102.csv", b"");
        let mut session = remote.session();

        let template = DateTemplate::parse("r_%Y%m%d.csv");
        let report = sweep(&mut session, &template, date(2024, 1, 1), true).await;

        assert_eq!(report.stale, 2);
        assert_eq!(report.retained_dry_run, 2);
        assert_eq!(report.deleted, 0);
        assert!(remote.remove_attempts().is_empty());
    }
}
