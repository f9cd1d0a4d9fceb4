use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Every required value is non-empty (an empty env var counts as unset)
/// - Source port is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let required = [
        ("source.host", config.source.host.as_str()),
        ("source.user", config.source.user.as_str()),
        ("source.password", config.source.password.as_str()),
        ("traffic.source_dir", config.traffic.source_dir.as_str()),
        ("traffic.file_pattern", config.traffic.file_pattern.as_str()),
        ("backup.source_dir", config.backup.source_dir.as_str()),
        ("backup.file_pattern", config.backup.file_pattern.as_str()),
    ];

    if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(ConfigError::MissingValue(key.to_string()));
    }

    if config.traffic.dest_dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingValue("traffic.dest_dir".to_string()));
    }
    if config.backup.dest_dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingValue("backup.dest_dir".to_string()));
    }

    if config.source.port == 0 {
        return Err(ConfigError::ValidationError(
            "source.port cannot be 0".to_string(),
        ));
    }

    if config.job.run_timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "job.run_timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
