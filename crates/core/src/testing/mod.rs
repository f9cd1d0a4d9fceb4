//! Testing utilities and mock implementations.
//!
//! [`MockRemote`] stands in for the SFTP endpoint so the orchestrator and
//! the retention sweep can be exercised without a server.
//!
//! # Example
//!
//! ```rust,ignore
//! use datesync_core::testing::{fixtures, MockRemote};
//!
//! let remote = MockRemote::new().with_file("/out/traffic", "traffic_20240115.csv", b"data");
//! let config = fixtures::config(local_root, "traffic_%Y%m%d.csv", "backup_%Y%m%d.zip");
//! ```

mod mock_remote;

pub use mock_remote::{MockConnector, MockRemote, MockSession, RemoteOp};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::config::{Config, FileSetConfig, JobConfig, SourceConfig};

    /// Remote directory of the traffic files in [`config`].
    pub const TRAFFIC_DIR: &str = "/out/traffic";
    /// Remote directory of the backup files in [`config`].
    pub const BACKUP_DIR: &str = "/out/backup";

    /// A complete configuration with local directories under `local_root`.
    pub fn config(local_root: &Path, traffic_pattern: &str, backup_pattern: &str) -> Config {
        Config {
            source: SourceConfig {
                host: "sftp.test".to_string(),
                port: 22,
                user: "tester".to_string(),
                password: "secret".to_string(),
                timeout_secs: 5,
            },
            traffic: FileSetConfig {
                source_dir: TRAFFIC_DIR.to_string(),
                dest_dir: local_root.join("traffic"),
                file_pattern: traffic_pattern.to_string(),
            },
            backup: FileSetConfig {
                source_dir: BACKUP_DIR.to_string(),
                dest_dir: local_root.join("backup"),
                file_pattern: backup_pattern.to_string(),
            },
            job: JobConfig::default(),
        }
    }
}
