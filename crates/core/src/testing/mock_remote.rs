//! Mock remote endpoint for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::SourceConfig;
use crate::remote::{RemoteConnector, RemoteError, RemoteSession};

/// A recorded remote operation for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
    Connect,
    ChangeDir(String),
    List(String),
    Download(String),
    Remove(String),
    Close,
}

#[derive(Debug, Default)]
struct RemoteState {
    /// Directory path -> file name -> contents.
    dirs: HashMap<String, BTreeMap<String, Vec<u8>>>,
    ops: Vec<RemoteOp>,
    fail_connect: bool,
    fail_change_dir: HashSet<String>,
    fail_listing: HashSet<String>,
    /// File name -> bytes written locally before the download fails.
    fail_download: HashMap<String, Vec<u8>>,
    fail_remove: HashSet<String>,
    /// Delay applied to every download.
    latency: Option<Duration>,
}

/// In-memory remote file system with failure injection.
///
/// Cloning shares the underlying state, so a test can keep a handle while
/// the orchestrator owns the session and then inspect what happened.
///
/// # Example
///
/// ```rust,ignore
/// use datesync_core::testing::MockRemote;
///
/// let remote = MockRemote::new()
///     .with_file("/out", "report_20240101.csv", b"old")
///     .with_file("/out", "report_20240115.csv", b"new");
/// remote.fail_remove("report_20240101.csv");
///
/// let orchestrator = TransferOrchestrator::new(config, remote.connector());
/// orchestrator.run(today).await?;
///
/// assert_eq!(remote.files("/out"), vec!["report_20240101.csv", "report_20240115.csv"]);
/// assert_eq!(remote.close_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl MockRemote {
    /// Create an empty remote with only the root directory.
    pub fn new() -> Self {
        let remote = Self::default();
        remote.lock().dirs.insert("/".to_string(), BTreeMap::new());
        remote
    }

    fn lock(&self) -> MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a directory (no-op if it exists).
    pub fn with_dir(self, dir: &str) -> Self {
        self.lock().dirs.entry(dir.to_string()).or_default();
        self
    }

    /// Add a file, creating its directory if needed.
    pub fn with_file(self, dir: &str, name: &str, contents: &[u8]) -> Self {
        self.lock()
            .dirs
            .entry(dir.to_string())
            .or_default()
            .insert(name.to_string(), contents.to_vec());
        self
    }

    /// Sorted file names currently in `dir`.
    pub fn files(&self, dir: &str) -> Vec<String> {
        self.lock()
            .dirs
            .get(dir)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Make the next connection attempts fail.
    pub fn fail_connect(&self) {
        self.lock().fail_connect = true;
    }

    /// Make entering `dir` fail.
    pub fn fail_change_dir(&self, dir: &str) {
        self.lock().fail_change_dir.insert(dir.to_string());
    }

    /// Make listing `dir` fail.
    pub fn fail_listing(&self, dir: &str) {
        self.lock().fail_listing.insert(dir.to_string());
    }

    /// Make downloading `name` fail after writing `partial` to the local file.
    pub fn fail_download(&self, name: &str, partial: &[u8]) {
        self.lock()
            .fail_download
            .insert(name.to_string(), partial.to_vec());
    }

    /// Make deleting `name` fail.
    pub fn fail_remove(&self, name: &str) {
        self.lock().fail_remove.insert(name.to_string());
    }

    /// Make every download take at least `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// All operations performed so far, in order.
    pub fn recorded_ops(&self) -> Vec<RemoteOp> {
        self.lock().ops.clone()
    }

    /// Names passed to successful or failed delete calls, in order.
    pub fn remove_attempts(&self) -> Vec<String> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                RemoteOp::Remove(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of times a session was closed.
    pub fn close_count(&self) -> usize {
        self.lock()
            .ops
            .iter()
            .filter(|op| **op == RemoteOp::Close)
            .count()
    }

    /// Open a session directly, bypassing the connector.
    pub fn session(&self) -> MockSession {
        MockSession {
            remote: self.clone(),
            cwd: "/".to_string(),
            closed: false,
        }
    }

    /// A connector handing out sessions on this remote.
    pub fn connector(&self) -> MockConnector {
        MockConnector {
            remote: self.clone(),
        }
    }
}

/// Connector for [`MockRemote`].
#[derive(Debug, Clone)]
pub struct MockConnector {
    remote: MockRemote,
}

#[async_trait]
impl RemoteConnector for MockConnector {
    type Session = MockSession;

    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self, source: &SourceConfig) -> Result<MockSession, RemoteError> {
        let mut state = self.remote.lock();
        state.ops.push(RemoteOp::Connect);
        if state.fail_connect {
            return Err(RemoteError::session(&source.host, "simulated connection failure"));
        }
        drop(state);
        Ok(self.remote.session())
    }
}

/// Session on a [`MockRemote`].
#[derive(Debug)]
pub struct MockSession {
    remote: MockRemote,
    cwd: String,
    closed: bool,
}

fn simulated(kind: io::ErrorKind, what: &str) -> io::Error {
    io::Error::new(kind, format!("simulated {what}"))
}

#[async_trait]
impl RemoteSession for MockSession {
    async fn change_dir(&mut self, path: &str) -> Result<(), RemoteError> {
        let mut state = self.remote.lock();
        state.ops.push(RemoteOp::ChangeDir(path.to_string()));

        if state.fail_change_dir.contains(path) || !state.dirs.contains_key(path) {
            return Err(RemoteError::ChangeDirectory {
                path: path.to_string(),
                source: simulated(io::ErrorKind::NotFound, "missing directory"),
            });
        }
        self.cwd = path.to_string();
        Ok(())
    }

    async fn list_entries(&mut self) -> Result<Vec<String>, RemoteError> {
        let mut state = self.remote.lock();
        state.ops.push(RemoteOp::List(self.cwd.clone()));

        if state.fail_listing.contains(&self.cwd) {
            return Err(RemoteError::Listing {
                path: self.cwd.clone(),
                source: simulated(io::ErrorKind::PermissionDenied, "listing failure"),
            });
        }
        Ok(state
            .dirs
            .get(&self.cwd)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn download(
        &mut self,
        remote_name: &str,
        local_path: &Path,
    ) -> Result<u64, RemoteError> {
        let (contents, failure, latency) = {
            let mut state = self.remote.lock();
            state.ops.push(RemoteOp::Download(remote_name.to_string()));
            let contents = state
                .dirs
                .get(&self.cwd)
                .and_then(|files| files.get(remote_name))
                .cloned();
            (
                contents,
                state.fail_download.get(remote_name).cloned(),
                state.latency,
            )
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let download_error = |source: io::Error| RemoteError::Download {
            name: remote_name.to_string(),
            local: local_path.to_path_buf(),
            source,
        };

        if let Some(partial) = failure {
            tokio::fs::write(local_path, &partial)
                .await
                .map_err(download_error)?;
            return Err(download_error(simulated(
                io::ErrorKind::ConnectionReset,
                "transfer interruption",
            )));
        }

        let contents = contents
            .ok_or_else(|| download_error(simulated(io::ErrorKind::NotFound, "missing file")))?;
        tokio::fs::write(local_path, &contents)
            .await
            .map_err(download_error)?;
        Ok(contents.len() as u64)
    }

    async fn remove(&mut self, remote_name: &str) -> Result<(), RemoteError> {
        let mut state = self.remote.lock();
        state.ops.push(RemoteOp::Remove(remote_name.to_string()));

        let delete_error = |what: &str| RemoteError::Delete {
            name: remote_name.to_string(),
            source: simulated(io::ErrorKind::PermissionDenied, what),
        };

        if state.fail_remove.contains(remote_name) {
            return Err(delete_error("delete failure"));
        }
        let cwd = self.cwd.clone();
        match state.dirs.get_mut(&cwd).and_then(|files| files.remove(remote_name)) {
            Some(_) => Ok(()),
            None => Err(delete_error("missing file")),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.remote.lock().ops.push(RemoteOp::Close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_session_basic_operations() {
        let remote = MockRemote::new()
            .with_file("/out", "a.csv", b"aaa")
            .with_file("/out", "b.csv", b"bb");
        let mut session = remote.session();

        session.change_dir("/out").await.unwrap();
        assert_eq!(session.list_entries().await.unwrap(), vec!["a.csv", "b.csv"]);

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.csv");
        assert_eq!(session.download("a.csv", &local).await.unwrap(), 3);
        assert_eq!(std::fs::read(&local).unwrap(), b"aaa");

        session.remove("b.csv").await.unwrap();
        assert_eq!(remote.files("/out"), vec!["a.csv"]);

        session.close();
        session.close();
        assert_eq!(remote.close_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_session_injected_failures() {
        let remote = MockRemote::new().with_file("/out", "a.csv", b"full contents");
        remote.fail_download("a.csv", b"part");
        remote.fail_remove("a.csv");
        let mut session = remote.session();

        assert!(session.change_dir("/missing").await.is_err());
        session.change_dir("/out").await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.csv");
        let err = session.download("a.csv", &local).await.unwrap_err();
        assert!(matches!(err, RemoteError::Download { .. }));
        assert_eq!(std::fs::read(&local).unwrap(), b"part");

        assert!(session.remove("a.csv").await.is_err());
        assert_eq!(remote.files("/out"), vec!["a.csv"]);
        assert_eq!(remote.remove_attempts(), vec!["a.csv"]);
    }
}
