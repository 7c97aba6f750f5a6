use serde::{Deserialize, Serialize};

use super::ChatMessage;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize, Debug)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize, Debug)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl MessagesResponse {
    /// Text of the first `text` block. Other block kinds are skipped.
    pub fn first_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
    }
}
