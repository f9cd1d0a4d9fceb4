use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,
    pub traffic: FileSetConfig,
    pub backup: FileSetConfig,
    #[serde(default)]
    pub job: JobConfig,
}

/// Remote SFTP endpoint the files are fetched from and pruned on
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Transport timeout in seconds (TCP connect and each libssh2 call)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_port() -> u16 {
    22
}

fn default_timeout() -> u32 {
    30
}

/// One kind of dated file: where it lives remotely, where it lands locally,
/// and the filename template it is published under.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileSetConfig {
    /// Remote directory holding the files
    pub source_dir: String,
    /// Local directory the daily file is downloaded into
    pub dest_dir: PathBuf,
    /// Filename template, e.g. "traffic_%Y%m%d.csv"
    pub file_pattern: String,
}

/// Run-level behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JobConfig {
    /// Classify remote files but never delete them
    #[serde(default)]
    pub dry_run: bool,
    /// Deadline for the whole run in seconds (unset = no deadline)
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
}

/// Sanitized config for logging (password redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub source: SanitizedSourceConfig,
    pub traffic: FileSetConfig,
    pub backup: FileSetConfig,
    pub job: JobConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSourceConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            source: SanitizedSourceConfig {
                host: config.source.host.clone(),
                port: config.source.port,
                user: config.source.user.clone(),
                password_configured: !config.source.password.is_empty(),
                timeout_secs: config.source.timeout_secs,
            },
            traffic: config.traffic.clone(),
            backup: config.backup.clone(),
            job: config.job.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[source]
host = "sftp.example.com"
user = "collector"
password = "s3cret"

[traffic]
source_dir = "/out/traffic"
dest_dir = "/data/traffic"
file_pattern = "traffic_%Y%m%d.csv"

[backup]
source_dir = "/out/backup"
dest_dir = "/data/backup"
file_pattern = "backup_%d-%m-%Y.zip"
"#;

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = toml::from_str(FULL).unwrap();
        assert_eq!(config.source.host, "sftp.example.com");
        assert_eq!(config.source.port, 22);
        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.traffic.file_pattern, "traffic_%Y%m%d.csv");
        assert_eq!(config.backup.dest_dir, PathBuf::from("/data/backup"));
        assert!(!config.job.dry_run);
        assert!(config.job.run_timeout_secs.is_none());
    }

    #[test]
    fn test_deserialize_job_section() {
        let toml = format!("{FULL}\n[job]\ndry_run = true\nrun_timeout_secs = 600\n");
        let config: Config = toml::from_str(&toml).unwrap();
        assert!(config.job.dry_run);
        assert_eq!(config.job.run_timeout_secs, Some(600));
    }

    #[test]
    fn test_deserialize_missing_backup_fails() {
        let toml = r#"
[source]
host = "h"
user = "u"
password = "p"

[traffic]
source_dir = "/a"
dest_dir = "/b"
file_pattern = "c"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_password() {
        let config: Config = toml::from_str(FULL).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.source.password_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(json.contains("sftp.example.com"));
    }
}
