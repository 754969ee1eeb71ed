//! Immutable configuration, built once at startup and passed to whoever needs it.

use std::{fmt, path::Path, str::FromStr, time::Duration};

use serde::Deserialize;

use crate::errors::ConfigError;

/// What happens to a query result when newer input arrives while it is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// A result is dropped as soon as a newer value has been pushed after its query
    /// was dispatched.
    #[default]
    Switch,
    /// A result is delivered unless a result of a more recently dispatched query
    /// has already been delivered.
    LatestWins,
}

impl FromStr for OverlapPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "switch" => Ok(Self::Switch),
            "latest-wins" => Ok(Self::LatestWins),
            other => Err(ConfigError::UnknownVariant {
                kind: "overlap policy",
                value: other.to_string(),
            }),
        }
    }
}

/// Settings of a single search pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Quiescence window in milliseconds.
    pub debounce_ms: u64,
    pub overlap: OverlapPolicy,
}

impl PipelineConfig {
    pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            debounce_ms: Self::DEFAULT_DEBOUNCE_MS,
            overlap: OverlapPolicy::default(),
        }
    }
}

/// How much of each HTTP exchange the service client logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HttpLogLevel {
    #[serde(alias = "none")]
    Off,
    /// Method, URL, status and timing.
    Basic,
    /// Everything `Basic` logs plus the response body.
    #[default]
    Body,
}

impl FromStr for HttpLogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" | "none" => Ok(Self::Off),
            "basic" => Ok(Self::Basic),
            "body" => Ok(Self::Body),
            other => Err(ConfigError::UnknownVariant {
                kind: "http log level",
                value: other.to_string(),
            }),
        }
    }
}

/// Settings of the HTTP service client.
///
/// There is no global client; a `ServiceConfig` is validated once and handed to
/// `ServiceClient::new`. Switching to another base URL produces a new config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub log_level: HttpLogLevel,
}

impl ServiceConfig {
    pub const GITHUB_API: &'static str = "https://api.github.com/";

    /// Default settings pointed at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let config = ServiceConfig {
            base_url: base_url.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns a copy of this config pointed at another base URL.
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let config = ServiceConfig {
            base_url: base_url.into(),
            ..self.clone()
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_log_level(mut self, log_level: HttpLogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Joins `path` onto the base URL with exactly one slash between them.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.starts_with("http://") || self.base_url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::BaseUrl(self.base_url.clone()))
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: Self::GITHUB_API.to_string(),
            user_agent: concat!("rxsearch/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 10_000,
            log_level: HttpLogLevel::default(),
        }
    }
}

impl fmt::Display for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (timeout {} ms)", self.base_url, self.timeout_ms)
    }
}

/// Everything the demo application needs, loadable from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub service: ServiceConfig,
    /// Simulated latency of the in-memory demo backend.
    pub demo_latency_ms: u64,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.service.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn demo_latency(&self) -> Duration {
        Duration::from_millis(self.demo_latency_ms)
    }
}
