//! Core configuration supplied by the host shell.
//!
//! # Responsibility
//! - Describe every knob the core reads at startup.
//! - Parse and validate the JSON document handed over by the host.
//!
//! # Invariants
//! - A validated config always names a usable store and an http(s) API base.
//! - Missing fields fall back to `CoreConfig::default()` values.

use crate::logging::{default_log_level, parse_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default store name, also used as the SQLite file stem.
pub const DEFAULT_STORE_NAME: &str = "GameCatalogue";
/// Default remote catalogue endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.rawg.io/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration parse/validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Invalid { field: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "failed to parse core config: {message}"),
            Self::Invalid { field, message } => {
                write!(f, "invalid core config field `{field}`: {message}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Startup configuration for the catalogue core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Name of the persistent store; file stem when `data_dir` is set.
    pub store_name: String,
    /// Directory holding the store file. `None` keeps the store in memory.
    pub data_dir: Option<PathBuf>,
    /// Base URL of the remote game catalogue API.
    pub api_base_url: String,
    /// Optional API key appended as the `key` query parameter.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Log level (`trace|debug|info|warn|error`).
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logs.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            data_dir: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Parses a JSON config document and validates it.
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates field-level invariants.
    pub fn validate(&self) -> ConfigResult<()> {
        if !is_valid_store_name(self.store_name.as_str()) {
            return Err(ConfigError::Invalid {
                field: "store_name",
                message: format!(
                    "`{}` must be non-empty and use only [A-Za-z0-9_-]",
                    self.store_name
                ),
            });
        }

        let base = Url::parse(self.api_base_url.as_str()).map_err(|err| ConfigError::Invalid {
            field: "api_base_url",
            message: err.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "api_base_url",
                message: format!("unsupported scheme `{}`", base.scheme()),
            });
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                message: format!("expected 1..={MAX_REQUEST_TIMEOUT_SECS}"),
            });
        }

        if let Err(message) = parse_level(&self.log_level) {
            return Err(ConfigError::Invalid {
                field: "log_level",
                message,
            });
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Store names end up in file names and SQLite URIs.
pub fn is_valid_store_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_API_BASE_URL, DEFAULT_STORE_NAME};
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid() {
        let config = CoreConfig::default();
        config.validate().expect("default config should validate");
        assert_eq!(config.store_name, DEFAULT_STORE_NAME);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = CoreConfig::from_json_str(r#"{"api_key":"secret","data_dir":"/tmp/gc"}"#)
            .expect("partial config should parse");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/gc")));
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.store_name, DEFAULT_STORE_NAME);
    }

    #[test]
    fn rejects_bad_store_name() {
        let err = CoreConfig::from_json_str(r#"{"store_name":"../escape"}"#)
            .expect_err("path-like store name must be rejected");
        assert!(matches!(err, ConfigError::Invalid { field: "store_name", .. }));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = CoreConfig::from_json_str(r#"{"api_base_url":"ftp://example.com"}"#)
            .expect_err("ftp base must be rejected");
        assert!(matches!(err, ConfigError::Invalid { field: "api_base_url", .. }));
    }

    #[test]
    fn rejects_zero_timeout_and_unknown_level() {
        let err = CoreConfig::from_json_str(r#"{"request_timeout_secs":0}"#)
            .expect_err("zero timeout must be rejected");
        assert!(matches!(err, ConfigError::Invalid { field: "request_timeout_secs", .. }));

        let err = CoreConfig::from_json_str(r#"{"log_level":"loud"}"#)
            .expect_err("unknown level must be rejected");
        assert!(matches!(err, ConfigError::Invalid { field: "log_level", .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = CoreConfig::from_json_str("{not json").expect_err("malformed json");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
