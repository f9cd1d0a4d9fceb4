//! Error types for the remote module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a remote file-transfer session.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Connecting or authenticating failed. Fatal for the run.
    #[error("Failed to open session to {host}: {reason}")]
    Session { host: String, reason: String },

    /// The directory does not exist or cannot be entered.
    #[error("Failed to change to directory {path}: {source}")]
    ChangeDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The current directory could not be listed.
    #[error("Failed to list directory {path}: {source}")]
    Listing {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The remote file could not be fetched into the local path.
    #[error("Failed to download {name} to {}: {source}", .local.display())]
    Download {
        name: String,
        local: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote file could not be removed.
    #[error("Failed to delete {name}: {source}")]
    Delete {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    /// Creates a session error.
    pub fn session(host: impl Into<String>, reason: impl ToString) -> Self {
        Self::Session {
            host: host.into(),
            reason: reason.to_string(),
        }
    }
}
