use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, Message};

const API_BASE: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed sampling configuration applied to every completion call. Injected
/// into the client rather than hard-coded at call sites.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 500,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GroqError {
    #[error("GROQ_API_KEY not set. Get one at https://console.groq.com/keys")]
    ApiKeyNotSet,

    #[error("completion API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("completion API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("completion returned no choices")]
    EmptyResponse,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction for generating a reply to a composed prompt.
/// Implemented by `GroqClient` for production; mock implementations used in tests.
pub trait CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, GroqError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone)]
pub struct GroqClient {
    http: Client,
    api_key: ApiKey,
    config: GenerationConfig,
    base_url: String,
}

impl GroqClient {
    pub fn from_env(http: Client) -> Result<Self, GroqError> {
        let api_key = env::var("GROQ_API_KEY").map_err(|_| GroqError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(GroqError::ApiKeyNotSet);
        }
        let mut config = GenerationConfig::default();
        if let Some(model) = env::var("GROQ_MODEL")
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
        {
            config.model = model;
        }
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            config,
            base_url: API_BASE.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            config: GenerationConfig::default(),
            base_url: base_url.to_string(),
        }
    }
}

impl CompletionClient for GroqClient {
    async fn complete(&self, prompt: &str) -> Result<String, GroqError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("completion API rate limited");
            return Err(GroqError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<ChatCompletionResponse>(&text) {
                if let Some(err) = &body.error {
                    let classified = classify_api_error(status.as_u16(), err);
                    warn!(error = %classified, "completion API error");
                    return Err(classified);
                }
            }
            let snippet = if text.len() > 200 { &text[..200] } else { &text };
            warn!(code = status.as_u16(), "completion API error (no structured body)");
            return Err(GroqError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {snippet}"),
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        if let Some(err) = &body.error {
            let classified = classify_api_error(status.as_u16(), err);
            warn!(error = %classified, "completion API error in 200 response");
            return Err(classified);
        }

        let content = body
            .choices
            .and_then(|choices| choices.into_iter().next())
            .map(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(GroqError::EmptyResponse)?;

        debug!(model = %self.config.model, chars = content.len(), "completion received");
        Ok(content)
    }
}

fn classify_api_error(code: u16, err: &ApiError) -> GroqError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());

    match code {
        429 => GroqError::RateLimited,
        _ => GroqError::Api { code, message },
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn complete_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "What is Rust?"}],
                "max_tokens": 500
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "Rust is a systems language."}
                }]
            })))
            .mount(&server)
            .await;

        let client = GroqClient::with_base_url(Client::new(), &server.uri());
        let answer = client.complete("What is Rust?").await.unwrap();
        assert_eq!(answer, "Rust is a systems language.");
    }

    #[tokio::test]
    async fn complete_429_returns_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = GroqClient::with_base_url(Client::new(), &server.uri());
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, GroqError::RateLimited));
    }

    #[tokio::test]
    async fn complete_error_body_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "Invalid model", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let client = GroqClient::with_base_url(Client::new(), &server.uri());
        let err = client.complete("prompt").await.unwrap_err();
        match err {
            GroqError::Api { code: 400, message } => assert_eq!(message, "Invalid model"),
            other => panic!("expected Api(400), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let client = GroqClient::with_base_url(Client::new(), &server.uri());
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, GroqError::EmptyResponse));
    }
}
