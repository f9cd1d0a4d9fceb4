//! Types for the retention module.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::pattern::DateError;

/// What to do with one remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetentionDecision {
    /// Dated strictly before the run date; delete it.
    Stale(NaiveDate),
    /// Dated on or after the run date; keep it.
    Fresh(NaiveDate),
    /// Has the template's shape but no valid date; keep it and report.
    Unparseable(DateError),
    /// Not one of this job's files; leave it alone.
    NoMatch,
}

impl RetentionDecision {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

/// A listing entry with its decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEntry {
    pub filename: String,
    pub decision: RetentionDecision,
}

/// Outcome of deleting the stale entries of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub deleted: usize,
    pub failed: usize,
}

/// Outcome of sweeping one remote directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Entries returned by the listing.
    pub listed: usize,
    /// Whether the listing failed (and the sweep ran on nothing).
    pub listing_failed: bool,
    pub stale: usize,
    pub fresh: usize,
    pub unparseable: usize,
    pub unmatched: usize,
    /// Stale entries left in place because the sweep was a dry run.
    pub retained_dry_run: usize,
    pub deleted: usize,
    pub delete_failures: usize,
}

impl SweepReport {
    /// Tallies the decisions of a scan.
    pub fn from_scan(entries: &[ScannedEntry]) -> Self {
        let mut report = Self {
            listed: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match entry.decision {
                RetentionDecision::Stale(_) => report.stale += 1,
                RetentionDecision::Fresh(_) => report.fresh += 1,
                RetentionDecision::Unparseable(_) => report.unparseable += 1,
                RetentionDecision::NoMatch => report.unmatched += 1,
            }
        }
        report
    }
}
