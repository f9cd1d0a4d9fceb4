//! Daily transfer runs.
//!
//! A run connects once, downloads today's traffic and backup files, then
//! prunes the remote directories of files dated before today. Per-task
//! failures are logged and counted; only the session itself can fail a run.

pub mod local;
mod runner;
mod types;

pub use runner::TransferOrchestrator;
pub use types::{RunReport, TransferError, TransferTask};
