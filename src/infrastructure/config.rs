use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Google CrUX API key or endpoint not found (missing {0})")]
    Missing(&'static str),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
struct RawCruxSettings {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_endpoint: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Connection settings for the CrUX API. Both key and endpoint are required.
#[derive(Clone)]
pub struct CruxSettings {
    pub api_key: String,
    pub api_endpoint: String,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for CruxSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CruxSettings")
            .field("api_key", &"<redacted>")
            .field("api_endpoint", &self.api_endpoint)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl CruxSettings {
    pub fn from_config(settings: config::Config) -> Result<Self, ConfigError> {
        let raw: RawCruxSettings = settings.try_deserialize()?;

        Ok(Self {
            api_key: required(raw.api_key, "api_key")?,
            api_endpoint: required(raw.api_endpoint, "api_endpoint")?,
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
}

/// Reads `config/crux` (optional) overlaid with `GOOGLE_CRUX_*` variables,
/// e.g. `GOOGLE_CRUX_API_KEY` and `GOOGLE_CRUX_API_ENDPOINT`.
pub fn load_crux_config() -> Result<CruxSettings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/crux").required(false))
        .add_source(crux_environment())
        .build()?;

    CruxSettings::from_config(settings)
}

// Values stay strings; numeric settings are converted on deserialize
fn crux_environment() -> config::Environment {
    config::Environment::with_prefix("GOOGLE_CRUX")
        .prefix_separator("_")
        .separator("__")
}

pub fn load_server_config() -> anyhow::Result<ServerSettings> {
    let settings = config::Config::builder()
        .set_default("bind_addr", DEFAULT_BIND_ADDR)?
        .add_source(config::File::with_name("config/server").required(false))
        .add_source(config::Environment::with_prefix("APP").prefix_separator("_").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
