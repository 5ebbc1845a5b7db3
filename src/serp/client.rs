use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::organic::extract_organic_results;
use super::types::{SearchResponse, SearchResult};

const API_BASE: &str = "https://serpapi.com/search.json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// Fixed number of organic results requested per query.
const RESULT_COUNT: &str = "5";

#[derive(Debug, thiserror::Error)]
pub enum SerpError {
    #[error("SERPAPI_API_KEY not set. Get one at https://serpapi.com/manage-api-key")]
    ApiKeyNotSet,

    #[error("search API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("search API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("search result missing required field `{0}`")]
    MissingField(&'static str),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction for fetching top-N organic web results.
/// Implemented by `SerpClient` for production; mock implementations used in tests.
pub trait SearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SerpError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone)]
pub struct SerpClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
}

impl SerpClient {
    pub fn from_env(http: Client) -> Result<Self, SerpError> {
        let api_key = env::var("SERPAPI_API_KEY").map_err(|_| SerpError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(SerpError::ApiKeyNotSet);
        }
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            base_url: base_url.to_string(),
        }
    }
}

impl SearchProvider for SerpClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SerpError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", RESULT_COUNT),
                ("api_key", self.api_key.0.as_str()),
            ])
            .header("User-Agent", crate::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("search API rate limited");
            return Err(SerpError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SearchResponse>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| {
                    let snippet = if text.len() > 200 { &text[..200] } else { &text };
                    format!("HTTP {status}: {snippet}")
                });
            warn!(code = status.as_u16(), %message, "search API error");
            return Err(SerpError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        let results = extract_organic_results(body)?;
        debug!(results = results.len(), "search complete");
        Ok(results)
    }
}
