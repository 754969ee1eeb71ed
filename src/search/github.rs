use serde::Deserialize;

use crate::{
    config::ServiceConfig,
    errors::{ConfigError, SearchError},
    search::{SearchService, ServiceClient},
};

/// The subset of a GitHub repository the list screens show.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubRepo {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
}

/// Typed client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: ServiceClient,
}

impl GithubClient {
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_client(ServiceClient::new(config)?))
    }

    pub fn from_client(client: ServiceClient) -> Self {
        GithubClient { client }
    }

    /// `GET /users/{user}/repos`. A blank user name yields no repositories
    /// without touching the network.
    pub fn repos_for_user(&self, user: &str) -> Result<Vec<GithubRepo>, SearchError> {
        let user = user.trim();
        if user.is_empty() {
            return Ok(Vec::new());
        }
        if !user.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(SearchError::Unavailable(format!(
                "`{user}` is not a valid GitHub user name"
            )));
        }
        self.client.get_json(&format!("users/{user}/repos"))
    }
}

/// Treats the query as a user name and answers with that user's repository names.
impl SearchService for GithubClient {
    fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        Ok(self
            .repos_for_user(query)?
            .into_iter()
            .map(|repo| repo.name)
            .collect())
    }
}
