use async_trait::async_trait;
use tracing::debug;

use super::{
    resolve_credential, HttpTransport, InitializationError, Provider, ProviderError, ProviderInit,
};
use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::message::{Conversation, Turn};
use crate::utils::auth::AuthMode;
use crate::utils::url::resolve_base_url;

pub const DISPLAY_NAME: &str = "ChatGPT";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// OpenAI chat completions.
pub struct ChatGptProvider {
    transport: HttpTransport,
    model: String,
    conversation: Conversation,
}

impl ChatGptProvider {
    pub fn new(init: ProviderInit) -> Result<Self, InitializationError> {
        let api_key = resolve_credential(init.api_key, API_KEY_ENV)?;
        let base_url = resolve_base_url(init.base_url.as_deref(), BASE_URL_ENV, DEFAULT_BASE_URL);
        let transport = HttpTransport::new(base_url, AuthMode::Bearer, &api_key, API_KEY_ENV)?;
        debug!(model = %init.model, base_url = transport.base_url(), "initialized ChatGPT provider");

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
impl Provider for ChatGptProvider {
    async fn send_message(
        &mut self,
        text: &str,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: self
                .conversation
                .begin_turn(text)
                .iter()
                .map(ChatMessage::from)
                .collect(),
            max_tokens,
            temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };

        let reply = self
            .transport
            .post_json::<_, ChatResponse>("chat/completions", &request)
            .await
            .and_then(|response| {
                response.first_text().ok_or_else(|| {
                    ProviderError::MalformedResponse("no completion text in response".to_string())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::test_server::{closed_base_url, StubServer};

    fn provider_for(base_url: &str) -> ChatGptProvider {
        ChatGptProvider::new(ProviderInit {
            model: "gpt-test".to_string(),
            api_key: Some("sk-test".to_string()),
            base_url: Some(base_url.to_string()),
        })
        .expect("provider should build")
    }

    fn completion(text: &str) -> (u16, String) {
        (
            200,
            serde_json::json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": text},
                    "finish_reason": "stop"
                }]
            })
            .to_string(),
        )
    }

    #[tokio::test]
    async fn send_message_posts_history_and_records_reply() {
        let server = StubServer::spawn(vec![completion("Hi there!"), completion("Sure.")]).await;
        let mut provider = provider_for(&server.base_url);

        let reply = provider
            .send_message("hello", 256, Some(0.2))
            .await
            .expect("first turn should succeed");
        assert_eq!(reply, "Hi there!");
        assert_eq!(
            provider.conversation_history(),
            vec![Turn::user("hello"), Turn::assistant("Hi there!")]
        );

        provider
            .send_message("again", 256, None)
            .await
            .expect("second turn should succeed");

        let requests = server.finish().await;
        assert_eq!(requests.len(), 2);

        let first = &requests[0];
        assert_eq!(first.request_line, "POST /v1/chat/completions HTTP/1.1");
        assert_eq!(first.header("authorization"), Some("Bearer sk-test"));
        assert_eq!(first.body["model"], "gpt-test");
        assert_eq!(first.body["max_tokens"], 256);
        assert!((first.body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(
            first.body["messages"],
            serde_json::json!([{"role": "user", "content": "hello"}])
        );

        let second = &requests[1];
        assert!((second.body["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(
            second.body["messages"],
            serde_json::json!([
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": "Hi there!"},
                {"role": "user", "content": "again"}
            ])
        );
        assert_eq!(provider.conversation_history().len(), 4);
    }

    #[tokio::test]
    async fn api_error_rolls_back_the_user_turn() {
        let server = StubServer::spawn(vec![(
            401,
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#
                .to_string(),
        )])
        .await;
        let mut provider = provider_for(&server.base_url);

        let err = provider
            .send_message("hello", 64, None)
            .await
            .expect_err("401 should fail");
        assert_eq!(
            err.to_string(),
            "API error (HTTP 401): Incorrect API key provided"
        );
        assert!(provider.conversation_history().is_empty());
        server.finish().await;
    }

    #[tokio::test]
    async fn missing_choices_is_a_malformed_response() {
        let server = StubServer::spawn(vec![(200, r#"{"choices":[]}"#.to_string())]).await;
        let mut provider = provider_for(&server.base_url);

        let err = provider.send_message("hello", 64, None).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
        assert!(provider.conversation_history().is_empty());
        server.finish().await;
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let mut provider = provider_for(&closed_base_url().await);

        let err = provider.send_message("hello", 64, None).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert!(provider.conversation_history().is_empty());
    }

    #[tokio::test]
    async fn reset_conversation_clears_history() {
        let server = StubServer::spawn(vec![completion("one"), completion("two")]).await;
        let mut provider = provider_for(&server.base_url);

        provider.send_message("a", 16, None).await.unwrap();
        provider.send_message("b", 16, None).await.unwrap();
        assert_eq!(provider.conversation_history().len(), 4);

        provider.reset_conversation();
        assert!(provider.conversation_history().is_empty());
        server.finish().await;
    }

    #[test]
    fn reports_label_and_model() {
        let provider = provider_for("https://api.example.com/v1/");
        assert_eq!(provider.provider_name(), "ChatGPT");
        assert_eq!(provider.model(), "gpt-test");
        assert_eq!(provider.transport.base_url(), "https://api.example.com/v1");
    }
}
