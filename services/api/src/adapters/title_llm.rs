//! services/api/src/adapters/title_llm.rs
//!
//! Implements the `TitleGenerationService` port with a single short chat
//! completion. Failures propagate to the caller; there is no fallback
//! title.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use notebook_core::limits::{truncate_chars, NOTE_TITLE_INPUT_MAX_CHARS};
use notebook_core::ports::{PortError, PortResult, TitleGenerationService};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates concise, descriptive \
titles. Generate a title that is exactly 5 words or fewer, capturing the main topic or theme \
of the content. Return only the title, nothing else.";

/// Builds the user prompt, truncating the note to the title input bound.
fn title_prompt(text: &str) -> String {
    format!(
        "Generate a 5-word title for this content: {}",
        truncate_chars(text, NOTE_TITLE_INPUT_MAX_CHARS)
    )
}

/// An adapter that implements the `TitleGenerationService` port using an
/// OpenAI chat model.
#[derive(Clone)]
pub struct OpenAiTitleAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTitleAdapter {
    /// Creates a new `OpenAiTitleAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl TitleGenerationService for OpenAiTitleAdapter {
    async fn generate_title_from_text(&self, text: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()
                    .map_err(|e| PortError::Generation(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(title_prompt(text))
                    .build()
                    .map_err(|e| PortError::Generation(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(20u32)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Generation(e.to_string()))?;

        let title = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Generation("no title generated".to_string()))?;

        Ok(title.trim().to_string())
    }
}
