//! Language detection and translation via the Google translate `gtx` JSON
//! endpoint (source language auto-detected, target English).

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

const API_BASE: &str = "https://translate.googleapis.com/translate_a/single";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("cannot detect the language of empty input")]
    EmptyInput,

    #[error("language detection failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("language detection returned no language code")]
    MissingCode,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("translation returned no text segments")]
    EmptyTranslation,
}

/// Reports an ISO language code for free text.
/// Implemented by `TranslateClient` for production; mocked in tests.
pub trait Detector {
    async fn detect(&self, text: &str) -> Result<String, DetectError>;
}

/// Translates free text to English.
pub trait Translator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

#[derive(Clone)]
pub struct TranslateClient {
    http: Client,
    base_url: String,
}

impl TranslateClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    /// The endpoint answers a single heterogeneous JSON array: index 0 holds
    /// the translated segments, index 2 the detected source language.
    async fn fetch(&self, text: &str) -> Result<Value, reqwest::Error> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", "en"),
                ("dt", "t"),
                ("q", text),
            ])
            .header("User-Agent", crate::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        response.json().await
    }
}

impl Detector for TranslateClient {
    async fn detect(&self, text: &str) -> Result<String, DetectError> {
        if text.trim().is_empty() {
            return Err(DetectError::EmptyInput);
        }

        let body = self.fetch(text).await?;
        let code = body
            .get(2)
            .and_then(Value::as_str)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .ok_or(DetectError::MissingCode)?;

        debug!(%code, "language detected");
        Ok(code)
    }
}

impl Translator for TranslateClient {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let body = self.fetch(text).await?;
        let segments = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or(TranslateError::EmptyTranslation)?;

        let translated: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        if translated.is_empty() {
            return Err(TranslateError::EmptyTranslation);
        }

        debug!(chars = translated.len(), "translation complete");
        Ok(translated)
    }
}
