//! HTTP client for OpenAI-compatible chat-completion APIs.
//!
//! Sends one system and one user message per call and returns the first
//! choice's text. There is no retry: any failure is returned to the caller.

use std::time::Duration;

use reqwest::{Client, Url};
use tracing::instrument;

use crate::error::LlmError;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, Message};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Longest slice of an error body kept in [`LlmError::Status`].
const ERROR_BODY_LIMIT: usize = 512;

/// Client for a chat-completion endpoint.
///
/// Use [`ChatClient::new`] for the public OpenAI API or
/// [`ChatClient::with_base_url`] for a compatible gateway or a mock server.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    model: String,
    temperature: Option<f32>,
}

impl ChatClient {
    /// Creates a client pointed at the public OpenAI API.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL, e.g. `http://127.0.0.1:8080/v1`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`LlmError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("igcoach/0.1 (content-coach)")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("chat/completions"))
            .map_err(|e| LlmError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            model: model.to_owned(),
            temperature: None,
        })
    }

    /// Sets the sampling temperature sent with every request.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submits `system` and `user` as a two-message conversation and returns
    /// the completion text.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Http`] on network failure or timeout.
    /// - [`LlmError::Status`] if the API answers with a non-2xx status.
    /// - [`LlmError::Deserialize`] if the body is not a chat completion.
    /// - [`LlmError::EmptyCompletion`] if the first choice has no text.
    #[instrument(skip(self, system, user), fields(model = %self.model, prompt_chars = user.len()))]
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system), Message::user(user)],
            temperature: self.temperature,
        };

        tracing::debug!(endpoint = %self.endpoint, "sending chat completion request");
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "chat completion request failed");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_LIMIT),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        let text = parsed.first_text().ok_or(LlmError::EmptyCompletion)?;

        tracing::debug!(completion_chars = text.len(), "chat completion received");
        Ok(text.to_owned())
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
