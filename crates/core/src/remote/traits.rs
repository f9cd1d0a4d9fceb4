//! Trait definitions for the remote module.

use async_trait::async_trait;
use std::path::Path;

use super::error::RemoteError;
use crate::config::SourceConfig;

/// Opens sessions against a remote endpoint.
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    type Session: RemoteSession;

    /// Returns the name of this connector implementation.
    fn name(&self) -> &str;

    /// Connects and authenticates.
    async fn connect(&self, source: &SourceConfig) -> Result<Self::Session, RemoteError>;
}

/// An authenticated session with a working directory.
///
/// Relative names passed to [`download`](Self::download) and
/// [`remove`](Self::remove) resolve against the directory last entered with
/// [`change_dir`](Self::change_dir).
#[async_trait]
pub trait RemoteSession: Send {
    /// Changes the working directory.
    async fn change_dir(&mut self, path: &str) -> Result<(), RemoteError>;

    /// Lists the names of the files in the working directory.
    async fn list_entries(&mut self) -> Result<Vec<String>, RemoteError>;

    /// Downloads `remote_name` into `local_path`, returning the bytes written.
    ///
    /// On failure `local_path` may hold a partial file.
    async fn download(&mut self, remote_name: &str, local_path: &Path)
        -> Result<u64, RemoteError>;

    /// Deletes `remote_name`.
    async fn remove(&mut self, remote_name: &str) -> Result<(), RemoteError>;

    /// Ends the session. Must be idempotent; called from `Drop` by
    /// [`SessionGuard`](super::SessionGuard).
    fn close(&mut self);
}
