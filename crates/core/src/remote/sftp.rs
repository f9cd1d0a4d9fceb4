//! SFTP implementation backed by libssh2.

use async_trait::async_trait;
use ssh2::{Session, Sftp};
use std::future::Future;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::RemoteError;
use super::traits::{RemoteConnector, RemoteSession};
use crate::config::SourceConfig;

/// Opens password-authenticated SFTP sessions.
#[derive(Debug, Clone, Default)]
pub struct SftpConnector;

impl SftpConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteConnector for SftpConnector {
    type Session = SftpSession;

    fn name(&self) -> &str {
        "sftp"
    }

    async fn connect(&self, source: &SourceConfig) -> Result<SftpSession, RemoteError> {
        info!("Connecting to {}:{} over SFTP", source.host, source.port);
        let source = source.clone();
        let host = source.host.clone();

        let session = tokio::task::spawn_blocking(move || SftpSession::open(&source))
            .await
            .map_err(|e| RemoteError::session(&host, e))??;

        info!("Connected to {}", host);
        Ok(session)
    }
}

/// A live SFTP session.
///
/// SFTP has no server-side working directory, so one is kept here and
/// relative names are resolved against it. Every libssh2 call runs on the
/// blocking pool and is awaited before the next one starts.
pub struct SftpSession {
    session: Session,
    sftp: Arc<Mutex<Sftp>>,
    cwd: PathBuf,
    closed: bool,
}

impl SftpSession {
    fn open(source: &SourceConfig) -> Result<Self, RemoteError> {
        let fail = |reason: &dyn std::fmt::Display| RemoteError::session(&source.host, reason);
        let timeout = Duration::from_secs(u64::from(source.timeout_secs));

        let addr = (source.host.as_str(), source.port)
            .to_socket_addrs()
            .map_err(|e| fail(&e))?
            .next()
            .ok_or_else(|| fail(&"host did not resolve to any address"))?;

        let tcp = TcpStream::connect_timeout(&addr, timeout).map_err(|e| fail(&e))?;

        let mut session = Session::new().map_err(|e| fail(&e))?;
        session.set_timeout(source.timeout_secs.saturating_mul(1000));
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| fail(&e))?;
        session
            .userauth_password(&source.user, &source.password)
            .map_err(|e| fail(&e))?;
        if !session.authenticated() {
            return Err(fail(&format!("authentication rejected for user {}", source.user)));
        }

        let sftp = session.sftp().map_err(|e| fail(&e))?;
        let cwd = sftp.realpath(Path::new(".")).map_err(|e| fail(&e))?;
        debug!("Initial remote directory: {}", cwd.display());

        Ok(Self {
            session,
            sftp: Arc::new(Mutex::new(sftp)),
            cwd,
            closed: false,
        })
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.cwd.join(name)
    }

    /// Runs a blocking SFTP operation on the blocking pool.
    ///
    /// The returned future owns a clone of the handle rather than borrowing
    /// the session, so the session only has to be `Send`.
    fn blocking<T, F>(&self, op: F) -> impl Future<Output = io::Result<T>> + Send + 'static
    where
        F: FnOnce(&Sftp) -> io::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(Arc::clone(&self.sftp), op)
    }
}

async fn run_blocking<T, F>(sftp: Arc<Mutex<Sftp>>, op: F) -> io::Result<T>
where
    F: FnOnce(&Sftp) -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let sftp = sftp
            .lock()
            .map_err(|_| io::Error::other("sftp handle poisoned"))?;
        op(&sftp)
    })
    .await
    .map_err(io::Error::other)?
}

#[async_trait]
impl RemoteSession for SftpSession {
    async fn change_dir(&mut self, path: &str) -> Result<(), RemoteError> {
        let target = self.resolve(path);
        let resolved = self
            .blocking(move |sftp| {
                let resolved = sftp.realpath(&target)?;
                if !sftp.stat(&resolved)?.is_dir() {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        "not a directory",
                    ));
                }
                Ok(resolved)
            })
            .await
            .map_err(|source| RemoteError::ChangeDirectory {
                path: path.to_string(),
                source,
            })?;

        debug!("Remote directory is now {}", resolved.display());
        self.cwd = resolved;
        Ok(())
    }

    async fn list_entries(&mut self) -> Result<Vec<String>, RemoteError> {
        let dir = self.cwd.clone();
        self.blocking(move |sftp| {
            let entries = sftp.readdir(&dir)?;
            Ok(entries
                .into_iter()
                .filter(|(_, stat)| !stat.is_dir())
                .filter_map(|(path, _)| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                })
                .filter(|name| name != "." && name != "..")
                .collect())
        })
        .await
        .map_err(|source| RemoteError::Listing {
            path: self.cwd.display().to_string(),
            source,
        })
    }

    async fn download(
        &mut self,
        remote_name: &str,
        local_path: &Path,
    ) -> Result<u64, RemoteError> {
        let remote = self.resolve(remote_name);
        let local = local_path.to_path_buf();

        self.blocking(move |sftp| {
            let mut source = sftp.open(&remote)?;
            let mut dest = std::fs::File::create(&local)?;
            let bytes = io::copy(&mut source, &mut dest)?;
            dest.sync_all()?;
            Ok(bytes)
        })
        .await
        .map_err(|source| RemoteError::Download {
            name: remote_name.to_string(),
            local: local_path.to_path_buf(),
            source,
        })
    }

    async fn remove(&mut self, remote_name: &str) -> Result<(), RemoteError> {
        let remote = self.resolve(remote_name);
        self.blocking(move |sftp| Ok(sftp.unlink(&remote)?))
            .await
            .map_err(|source| RemoteError::Delete {
                name: remote_name.to_string(),
                source,
            })
    }

    /// Disconnects inline when the handle is idle.
    ///
    /// A cancelled run can leave a libssh2 call running on the blocking
    /// pool; disconnecting then would stall the async worker until that call
    /// returns, so the disconnect is queued behind it on the blocking pool.
    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let session = self.session.clone();
        let disconnect = move || {
            if let Err(e) = session.disconnect(None, "datesync run finished", None) {
                warn!("Failed to disconnect cleanly: {}", e);
            } else {
                info!("Remote session closed");
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) if in_use(&self.sftp) => {
                debug!("SFTP handle busy, disconnecting on the blocking pool");
                drop(runtime.spawn_blocking(disconnect));
            }
            _ => disconnect(),
        }
    }
}

/// Whether another call currently holds the handle.
fn in_use<T>(handle: &Mutex<T>) -> bool {
    handle.try_lock().is_err()
}
