//! Remote file-transfer sessions.
//!
//! The orchestrator only talks to the [`RemoteConnector`] and
//! [`RemoteSession`] traits. [`SftpConnector`] is the production
//! implementation; tests use [`MockRemote`](crate::testing::MockRemote).
//!
//! A session is acquired once per run and wrapped in a [`SessionGuard`],
//! which closes it on every exit path.

mod error;
mod guard;
mod sftp;
mod traits;

pub use error::RemoteError;
pub use guard::SessionGuard;
pub use sftp::{SftpConnector, SftpSession};
pub use traits::{RemoteConnector, RemoteSession};
