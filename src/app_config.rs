use config::Config;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

const DEFAULT_IP_ECHO_URL: &str = "https://api64.ipify.org?format=json";
const DEFAULT_GEOLOCATION_URL: &str = "https://geo.ipify.org/api/v2/country,city";
const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const DEFAULT_ATTRIBUTION: &str = "© OpenStreetMap contributors (https://www.openstreetmap.org/copyright)";

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    core: Core,
    http: Http,
    ip_echo: IpEcho,
    geolocation: GeolocationConfig,
    map: MapConfig,
}

impl AppConfig {
    /// Loads the configuration from the built-in defaults, `config.toml` (or `file` when given),
    /// `config_local.toml` and `IP_TRACKER_*` environment variables, in that order.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(file, environment())
    }

    fn load_from(file: Option<&Path>, environment: config::Environment) -> Result<Self, ConfigError> {
        let main_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let config: AppConfig = Config::builder()
            .set_default("core.log_level", "warn")?
            .set_default("http.timeout", "10s")?
            .set_default("http.retry_ms", 500)?
            .set_default("http.retry_attempts", 0)?
            .set_default("http.user_agent", concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))?
            .set_default("ip_echo.url", DEFAULT_IP_ECHO_URL)?
            .set_default("geolocation.url", DEFAULT_GEOLOCATION_URL)?
            .set_default("geolocation.api_key", "")?
            .set_default("map.zoom", 13)?
            .set_default("map.tile_url", DEFAULT_TILE_URL)?
            .set_default("map.attribution", DEFAULT_ATTRIBUTION)?
            .add_source(main_source)
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.geolocation.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        self.core.log_level()?;
        Ok(())
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn http(&self) -> &Http {
        &self.http
    }

    pub fn ip_echo(&self) -> &IpEcho {
        &self.ip_echo
    }

    pub fn geolocation(&self) -> &GeolocationConfig {
        &self.geolocation
    }

    pub fn map(&self) -> &MapConfig {
        &self.map
    }
}

/// `IP_TRACKER_<SECTION>__<KEY>`, e.g. `IP_TRACKER_GEOLOCATION__API_KEY`.
fn environment() -> config::Environment {
    config::Environment::with_prefix("IP_TRACKER").prefix_separator("_").separator("__")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("missing geolocation API key, set geolocation.api_key or IP_TRACKER_GEOLOCATION__API_KEY")]
    MissingApiKey,
    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),
}

#[derive(Debug, Deserialize)]
pub struct Core {
    log_level: String,
}

impl Core {
    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[derive(Debug, Deserialize)]
pub struct Http {
    #[serde(with = "humantime_serde")]
    timeout: Duration,
    retry_ms: u64,
    retry_attempts: usize,
    user_agent: String,
}

impl Http {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_ms(&self) -> u64 {
        self.retry_ms
    }

    pub fn retry_attempts(&self) -> usize {
        self.retry_attempts
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[derive(Debug, Deserialize)]
pub struct IpEcho {
    url: String,
}

impl IpEcho {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Deserialize)]
pub struct GeolocationConfig {
    url: String,
    api_key: String,
}

impl GeolocationConfig {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

#[derive(Debug, Deserialize)]
pub struct MapConfig {
    zoom: u8,
    tile_url: String,
    attribution: String,
}

impl MapConfig {
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn tile_url(&self) -> &str {
        &self.tile_url
    }

    pub fn attribution(&self) -> &str {
        &self.attribution
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                core: Core { log_level: "info".to_string() },
                http: Http {
                    timeout: Duration::from_secs(5),
                    retry_ms: 10,
                    retry_attempts: 0,
                    user_agent: "ip-tracker-test".to_string(),
                },
                ip_echo: IpEcho {
                    url: "https://ip.echo/".to_string(),
                },
                geolocation: GeolocationConfig {
                    url: "https://geo.location/".to_string(),
                    api_key: "key".to_string(),
                },
                map: MapConfig {
                    zoom: 13,
                    tile_url: DEFAULT_TILE_URL.to_string(),
                    attribution: DEFAULT_ATTRIBUTION.to_string(),
                },
            },
        }
    }

    pub fn ip_echo_url(mut self, url: String) -> Self {
        self.config.ip_echo.url = url;
        self
    }

    pub fn geolocation_url(mut self, url: String) -> Self {
        self.config.geolocation.url = url;
        self
    }

    pub fn retry_attempts(mut self, retry_attempts: usize) -> Self {
        self.config.http.retry_attempts = retry_attempts;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
