//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{path::PathBuf, str::FromStr, time::Duration};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::ConfigOverrides;

use crate::application::debounce::DEFAULT_DEBOUNCE;
use crate::infra::geocoding::DEFAULT_GEOCODE_ENDPOINT;
use crate::infra::uploads::DEFAULT_UPLOAD_ENDPOINT;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "murales";
const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_API_TIMEOUT_SECS: u64 = 15;
const DEFAULT_SESSION_FILE: &str = "session.json";
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub list: ListSettings,
    pub geocoding: GeocodingSettings,
    pub uploads: UploadSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub store_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ListSettings {
    pub debounce: Duration,
}

#[derive(Debug, Clone)]
pub struct GeocodingSettings {
    pub api_key: Option<String>,
    pub endpoint: Url,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub cloud_name: Option<String>,
    pub upload_preset: Option<String>,
    pub endpoint: Url,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(overrides: &ConfigOverrides) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = overrides.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("MURALES").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(overrides);
    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    session: RawSessionSettings,
    list: RawListSettings,
    geocoding: RawGeocodingSettings,
    uploads: RawUploadSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = overrides.api_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.api_timeout_seconds {
            self.api.timeout_secs = Some(seconds);
        }
        if let Some(path) = overrides.session_file.as_ref() {
            self.session.store_path = Some(path.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.format = Some(if json { "json" } else { "compact" }.to_string());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            session,
            list,
            geocoding,
            uploads,
            logging,
        } = raw;

        Ok(Self {
            api: build_api_settings(api)?,
            session: build_session_settings(session),
            list: build_list_settings(list)?,
            geocoding: build_geocoding_settings(geocoding)?,
            uploads: build_upload_settings(uploads)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let raw_url = api
        .base_url
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let base_url = parse_http_url(&raw_url, "api.base_url")?;

    let timeout_secs = api.timeout_secs.unwrap_or(DEFAULT_API_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "api.timeout_secs",
            "must be greater than zero",
        ));
    }

    Ok(ApiSettings {
        base_url,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_session_settings(session: RawSessionSettings) -> SessionSettings {
    let store_path = session.store_path.unwrap_or_else(default_session_path);
    SessionSettings { store_path }
}

/// `$HOME/.config/murales/session.json`, or the working directory when no
/// home is known.
fn default_session_path() -> PathBuf {
    match std::env::var_os("HOME").filter(|home| !home.is_empty()) {
        Some(home) => PathBuf::from(home)
            .join(".config")
            .join("murales")
            .join(DEFAULT_SESSION_FILE),
        None => PathBuf::from(DEFAULT_SESSION_FILE),
    }
}

fn build_list_settings(list: RawListSettings) -> Result<ListSettings, LoadError> {
    let debounce = match list.debounce_ms {
        Some(0) => {
            return Err(LoadError::invalid(
                "list.debounce_ms",
                "must be greater than zero",
            ));
        }
        Some(ms) if ms > MAX_DEBOUNCE_MS => {
            return Err(LoadError::invalid(
                "list.debounce_ms",
                format!("must not exceed {MAX_DEBOUNCE_MS}"),
            ));
        }
        Some(ms) => Duration::from_millis(ms),
        None => DEFAULT_DEBOUNCE,
    };
    Ok(ListSettings { debounce })
}

fn build_geocoding_settings(
    geocoding: RawGeocodingSettings,
) -> Result<GeocodingSettings, LoadError> {
    let endpoint = parse_http_url(
        geocoding
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODE_ENDPOINT),
        "geocoding.endpoint",
    )?;
    Ok(GeocodingSettings {
        api_key: non_blank(geocoding.api_key),
        endpoint,
    })
}

fn build_upload_settings(uploads: RawUploadSettings) -> Result<UploadSettings, LoadError> {
    let endpoint = parse_http_url(
        uploads.endpoint.as_deref().unwrap_or(DEFAULT_UPLOAD_ENDPOINT),
        "uploads.endpoint",
    )?;
    Ok(UploadSettings {
        cloud_name: non_blank(uploads.cloud_name),
        upload_preset: non_blank(uploads.upload_preset),
        endpoint,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = match logging.format.as_deref().map(str::trim) {
        None | Some("compact") => LogFormat::Compact,
        Some("json") => LogFormat::Json,
        Some(other) => {
            return Err(LoadError::invalid(
                "logging.format",
                format!("expected `compact` or `json`, got `{other}`"),
            ));
        }
    };

    Ok(LoggingSettings { level, format })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSessionSettings {
    store_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawListSettings {
    debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGeocodingSettings {
    api_key: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawUploadSettings {
    cloud_name: Option<String>,
    upload_preset: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    format: Option<String>,
}

fn parse_http_url(value: &str, key: &'static str) -> Result<Url, LoadError> {
    let url = Url::parse(value.trim())
        .map_err(|err| LoadError::invalid(key, format!("invalid url `{value}`: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoadError::invalid(
            key,
            format!("unsupported scheme `{other}`"),
        )),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
