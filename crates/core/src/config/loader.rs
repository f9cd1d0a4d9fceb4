use figment::{
    error::Kind,
    providers::{Env, Format, Serialized, Toml},
    value::{Uncased, UncasedStr},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable names the job has always been configured with,
/// mapped onto their config keys.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("SOURCE_HOST", "source.host"),
    ("SOURCE_USER", "source.user"),
    ("SOURCE_PASS", "source.password"),
    ("SOURCE_DIR_TRAFICO", "traffic.source_dir"),
    ("SOURCE_DIR_BACKUP", "backup.source_dir"),
    ("DEST_DIR_TRAFICO", "traffic.dest_dir"),
    ("DEST_DIR_BACKUP", "backup.dest_dir"),
    ("FILE_PATTERN_1", "traffic.file_pattern"),
    ("FILE_PATTERN_2", "backup.file_pattern"),
];

/// Keys whose values are plain strings. Environment values for these are
/// taken verbatim, so `007` stays `007` and `true` stays `true`.
const STRING_KEYS: &[&str] = &[
    "source.host",
    "source.user",
    "source.password",
    "traffic.source_dir",
    "traffic.dest_dir",
    "traffic.file_pattern",
    "backup.source_dir",
    "backup.dest_dir",
    "backup.file_pattern",
];

const ENV_PREFIX: &str = "DATESYNC_";

fn legacy_key(name: &UncasedStr) -> Option<Uncased<'static>> {
    LEGACY_ENV_KEYS
        .iter()
        .find(|(var, _)| name.as_str().eq_ignore_ascii_case(var))
        .map(|(_, key)| Uncased::from(*key))
}

fn is_string_key(key: &UncasedStr) -> bool {
    STRING_KEYS
        .iter()
        .any(|known| key.as_str().eq_ignore_ascii_case(known))
}

fn prefixed_env() -> Env {
    Env::prefixed(ENV_PREFIX).split("__")
}

/// Merges the variables selected by `env` as raw strings, bypassing
/// figment's scalar parsing.
fn merge_verbatim(mut figment: Figment, env: Env) -> Figment {
    for (key, value) in env.iter() {
        let key = key.as_str().to_ascii_lowercase();
        figment = figment.merge(Serialized::default(&key, value));
    }
    figment
}

/// Load configuration from an optional TOML file with environment variable overrides.
///
/// Precedence, lowest first: the file, the legacy variable names
/// (`SOURCE_HOST`, `FILE_PATTERN_1`, ...), then `DATESYNC_`-prefixed
/// variables using `__` for nesting (`DATESYNC_SOURCE__PORT`).
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let figment = merge_verbatim(figment, Env::raw().filter_map(|name| legacy_key(name)));
    let figment = figment.merge(prefixed_env().filter(|key| !is_string_key(key)));
    let figment = merge_verbatim(figment, prefixed_env().filter(|key| is_string_key(key)));

    extract(figment)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    extract(Figment::from(Toml::string(toml_str)))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment.extract().map_err(|e| match &e.kind {
        Kind::MissingField(field) => {
            let mut path = e.path.clone();
            path.push(field.to_string());
            ConfigError::MissingValue(path.join("."))
        }
        _ => ConfigError::ParseError(e.to_string()),
    })
}
