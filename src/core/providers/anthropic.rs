use async_trait::async_trait;
use tracing::debug;

use super::{
    resolve_credential, HttpTransport, InitializationError, Provider, ProviderError, ProviderInit,
};
use crate::api::anthropic::{MessagesRequest, MessagesResponse};
use crate::api::ChatMessage;
use crate::core::message::{Conversation, Turn};
use crate::utils::auth::AuthMode;
use crate::utils::url::resolve_base_url;

pub const DISPLAY_NAME: &str = "Claude";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic messages API. The request carries no sampling temperature.
pub struct ClaudeProvider {
    transport: HttpTransport,
    model: String,
    conversation: Conversation,
}

impl ClaudeProvider {
    pub fn new(init: ProviderInit) -> Result<Self, InitializationError> {
        let api_key = resolve_credential(init.api_key, API_KEY_ENV)?;
        let base_url = resolve_base_url(init.base_url.as_deref(), BASE_URL_ENV, DEFAULT_BASE_URL);
        let transport = HttpTransport::new(base_url, AuthMode::Anthropic, &api_key, API_KEY_ENV)?;
        debug!(model = %init.model, base_url = transport.base_url(), "initialized Claude provider");

        Ok(Self {
            transport,
            model: init.model,
            conversation: Conversation::new(),
        })
    }

    pub fn boxed(init: ProviderInit) -> Result<Box<dyn Provider>, InitializationError> {
        Ok(Box::new(Self::new(init)?))
    }
}

#[async_trait]
impl Provider for ClaudeProvider {
    async fn send_message(
        &mut self,
        text: &str,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<String, ProviderError> {
        if let Some(temperature) = temperature {
            debug!(temperature, "Claude requests do not carry a temperature; ignoring");
        }

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens,
            messages: self
                .conversation
                .begin_turn(text)
                .iter()
                .map(ChatMessage::from)
                .collect(),
        };

        let reply = self
            .transport
            .post_json::<_, MessagesResponse>("messages", &request)
            .await
            .and_then(|response| {
                response.first_text().ok_or_else(|| {
                    ProviderError::MalformedResponse("no text content block in response".to_string())
                })
            });

        match reply {
            Ok(reply) => {
                self.conversation.complete_turn(&reply);
                Ok(reply)
            }
            Err(err) => {
                self.conversation.abandon_turn();
                Err(err)
            }
        }
    }

    fn provider_name(&self) -> &str {
        DISPLAY_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn reset_conversation(&mut self) {
        self.conversation.clear();
    }

    fn conversation_history(&self) -> Vec<Turn> {
        self.conversation.snapshot()
    }
}
