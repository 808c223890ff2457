//! Configuration layer: typed settings with layered precedence (file → env).

use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;


const DEFAULT_CONFIG_BASENAME: &str = "subdesk";
const ENV_PREFIX: &str = "SUBDESK";
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080/bison/api/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid api.base_url `{value}`: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("invalid logging.level `{0}`")]
    InvalidLevel(String),
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Json,
}

/// Validated logging settings.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

/// Validated API client settings.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL of the admin API; always ends with a slash so endpoint
    /// paths join underneath it instead of replacing the last segment.
    pub base_url: Url,
    pub request_timeout: Duration,
}

/// Fully validated application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct RawSettings {
    api: RawApiSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawApiSettings {
    base_url: String,
    request_timeout_secs: u64,
}

impl Default for RawApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawLoggingSettings {
    level: String,
    format: LogFormat,
}

impl Default for RawLoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl Settings {
    /// Load settings from an optional explicit file, the local
    /// `subdesk.toml`, and `SUBDESK_*` environment variables, in
    /// increasing precedence.
    pub fn load(config_file: Option<&str>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        builder = match config_file {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false)),
        };
        let raw: RawSettings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        Self::validate(raw)
    }

    pub(crate) fn validate(raw: RawSettings) -> Result<Self, SettingsError> {
        let mut base_url =
            Url::parse(&raw.api.base_url).map_err(|err| SettingsError::InvalidBaseUrl {
                value: raw.api.base_url.clone(),
                reason: err.to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(SettingsError::InvalidBaseUrl {
                value: raw.api.base_url.clone(),
                reason: "URL cannot serve as a base".to_string(),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let level: LevelFilter = raw
            .logging
            .level
            .parse()
            .map_err(|_| SettingsError::InvalidLevel(raw.logging.level.clone()))?;

        Ok(Self {
            api: ApiSettings {
                base_url,
                request_timeout: Duration::from_secs(raw.api.request_timeout_secs),
            },
            logging: LoggingSettings {
                level,
                format: raw.logging.format,
            },
        })
    }
}

/// User agent advertised on every outbound request.
pub fn user_agent() -> &'static str {
    concat!("subdesk/", env!("CARGO_PKG_VERSION"))
}
