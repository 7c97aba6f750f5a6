//! Provider capability shared by every remote chat service.
//!
//! A provider owns its [`Conversation`](crate::core::message::Conversation)
//! and sends the full history with each request. The concrete services live in [`openai`] and [`anthropic`]; they
//! are picked by name through [`crate::core::builtin_providers`].

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::core::message::Turn;
use crate::utils::auth::{auth_headers, AuthMode};
use crate::utils::url::construct_api_url;

pub mod anthropic;
pub mod openai;

#[async_trait]
pub trait Provider: Send {
    /// Send `text` as the next user turn and return the assistant's reply.
    ///
    /// On success the history grows by exactly one user turn and one
    /// assistant turn. On failure it is left as it was before the call.
    async fn send_message(
        &mut self,
        text: &str,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<String, ProviderError>;

    /// Display label, e.g. "ChatGPT".
    fn provider_name(&self) -> &str;

    fn model(&self) -> &str;

    fn reset_conversation(&mut self);

    /// Owned copy of the history; mutating it does not affect the provider.
    fn conversation_history(&self) -> Vec<Turn>;
}

/// Construction-time inputs for a provider with the model already resolved.
#[derive(Clone, Debug, Default)]
pub struct ProviderInit {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Failure of a single round trip. Never fatal to the chat loop.
#[derive(Debug)]
pub enum ProviderError {
    /// The request could not be sent or the body could not be read.
    Transport(reqwest::Error),
    /// The service answered with a non-success status.
    Api { status: u16, summary: String },
    /// The service answered 2xx but the envelope had no usable reply.
    MalformedResponse(String),
}

impl ProviderError {
    pub(crate) fn api(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let summary = serde_json::from_str::<serde_json::Value>(trimmed)
            .ok()
            .and_then(|value| extract_error_summary(&value))
            .filter(|summary| !summary.is_empty())
            .unwrap_or_else(|| {
                if trimmed.is_empty() {
                    "<empty body>".to_string()
                } else {
                    collapse_whitespace(trimmed)
                }
            });
        ProviderError::Api { status, summary }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Transport(err) => write!(f, "request failed: {err}"),
            ProviderError::Api { status, summary } => {
                write!(f, "API error (HTTP {status}): {summary}")
            }
            ProviderError::MalformedResponse(detail) => {
                write!(f, "malformed response: {detail}")
            }
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProviderError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// A provider could not be built at startup. Fatal.
#[derive(Debug)]
pub enum InitializationError {
    MissingCredential { env_var: &'static str },
    InvalidCredential { env_var: &'static str },
    Client(reqwest::Error),
}

impl InitializationError {
    /// Remediation lines printed under the error.
    pub fn quick_fixes(&self) -> Vec<String> {
        match self {
            InitializationError::MissingCredential { env_var } => {
                vec![format!("export {env_var}=\"your-api-key-here\"")]
            }
            InitializationError::InvalidCredential { env_var } => vec![
                "remove stray whitespace or control characters from the API key".to_string(),
                format!("if the key comes from {env_var}, check how it was exported"),
            ],
            InitializationError::Client(_) => Vec::new(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for InitializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitializationError::MissingCredential { env_var } => {
                write!(f, "no API key provided and {env_var} is not set")
            }
            InitializationError::InvalidCredential { .. } => {
                write!(f, "the API key is not a valid HTTP header value")
            }
            InitializationError::Client(err) => write!(f, "could not build HTTP client: {err}"),
        }
    }
}

impl Error for InitializationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InitializationError::Client(err) => Some(err),
            _ => None,
        }
    }
}

/// Use the explicit key when given, otherwise read `env_var`.
pub(crate) fn resolve_credential(
    explicit: Option<String>,
    env_var: &'static str,
) -> Result<String, InitializationError> {
    explicit
        .filter(|key| !key.trim().is_empty())
        .or_else(|| {
            std::env::var(env_var)
                .ok()
                .filter(|key| !key.trim().is_empty())
        })
        .ok_or(InitializationError::MissingCredential { env_var })
}

/// Authenticated JSON-over-HTTPS client bound to one service's base URL.
pub(crate) struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub(crate) fn new(
        base_url: String,
        mode: AuthMode,
        api_key: &str,
        env_var: &'static str,
    ) -> Result<Self, InitializationError> {
        let headers = auth_headers(mode, api_key)
            .map_err(|_| InitializationError::InvalidCredential { env_var })?;
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(InitializationError::Client)?;
        Ok(Self { client, base_url })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = construct_api_url(&self.base_url, endpoint);
        debug!(%url, "sending chat request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ProviderError::Transport)?;
        let status = response.status();
        let text = response.text().await.map_err(ProviderError::Transport)?;
        debug!(status = status.as_u16(), bytes = text.len(), "received chat response");

        if !status.is_success() {
            return Err(ProviderError::api(status.as_u16(), &text));
        }

        serde_json::from_str(&text)
            .map_err(|err| ProviderError::MalformedResponse(format!("invalid JSON: {err}")))
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .map(|text| collapse_whitespace(&text))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
pub(crate) mod test_server;
