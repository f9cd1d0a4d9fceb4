//! Date-based retention of remote files.
//!
//! A sweep lists the current remote directory, classifies every entry
//! against a [`DateTemplate`](crate::pattern::DateTemplate) and deletes the
//! entries dated before the run date:
//!
//! - names that do not have the template's shape are left alone,
//! - names with the right shape but an impossible date are reported and kept,
//! - names dated on or after the run date are kept.

mod scanner;
mod types;

pub use scanner::{apply, classify, scan, sweep};
pub use types::{DeletionReport, RetentionDecision, ScannedEntry, SweepReport};
