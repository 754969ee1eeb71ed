use std::{fmt, time::Instant};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::{HttpLogLevel, ServiceConfig},
    errors::{ConfigError, SearchError},
};

/// Blocking JSON-over-HTTP client built from a [`ServiceConfig`].
///
/// Non-2xx statuses are returned as `SearchError::Status` carrying the body, so
/// callers can tell "no such user" from a transport failure.
#[derive(Clone)]
pub struct ServiceClient {
    config: ServiceConfig,
    agent: ureq::Agent,
}

impl ServiceClient {
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout()))
            .build()
            .new_agent();
        Ok(ServiceClient { config, agent })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Issues `GET {base_url}/{path}` and decodes the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SearchError> {
        let url = self.config.url_for(path);
        let level = self.config.log_level;
        let started = Instant::now();

        if level != HttpLogLevel::Off {
            debug!(method = "GET", %url, "--> request");
        }

        let mut response = self
            .agent
            .get(&url)
            .header("user-agent", self.config.user_agent.as_str())
            .header("accept", "application/json")
            .call()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match level {
            HttpLogLevel::Off => {}
            HttpLogLevel::Basic => debug!(status, elapsed_ms, %url, "<-- response"),
            HttpLogLevel::Body => debug!(status, elapsed_ms, %url, %body, "<-- response"),
        }

        if !(200..300).contains(&status) {
            return Err(SearchError::Status { status, body });
        }
        serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))
    }
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
