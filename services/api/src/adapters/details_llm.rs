//! services/api/src/adapters/details_llm.rs
//!
//! The Metadata Generator: turns extracted text into structured notebook
//! metadata through a single structured-output chat completion.
//!
//! Error policy: this adapter never fails. Any model, transport or parse
//! failure collapses into `NotebookDetails::fallback()` so callers always
//! receive a usable record.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use notebook_core::domain::NotebookDetails;
use notebook_core::limits::{truncate_chars, MAX_EXAMPLE_QUESTIONS, MODEL_INPUT_MAX_CHARS};
use notebook_core::ports::{DetailsGenerationService, PortError, PortResult};
use tracing::{error, info};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates structured metadata \
for documents. Always respond with valid JSON only, no additional text.";

/// Builds the user prompt, truncating the document to the model input bound.
fn build_prompt(text: &str) -> String {
    let truncated = truncate_chars(text, MODEL_INPUT_MAX_CHARS);
    format!(
        r#"Based on the data provided, output an appropriate title and summary of the document.

Also output an appropriate UTF-8 emoji for the notebook - example: 🏆
And output an appropriate color from this list:

slate, gray, zinc, neutral, stone, red, orange, amber, yellow, lime, green, emerald, teal, cyan, sky, blue, indigo, violet, purple, fuchsia, pink, rose

Also output a list of 5 Example Questions that could be asked of this document. For example "How are the rules and regulations of tennis enforced?" - Maximum 10 words each

Only output in JSON format with this exact structure:
{{
  "title": "...",
  "summary": "...",
  "notebook_icon": "...",
  "background_color": "...",
  "example_questions": ["...", "...", "...", "...", "..."]
}}

Document content:
{truncated}"#
    )
}

/// Parses the model response into `NotebookDetails`, supplying defaults for
/// omitted fields and clamping the question list. Returns `None` when the
/// response is not a JSON object.
fn details_from_response(response_text: &str) -> Option<NotebookDetails> {
    let parsed: serde_json::Value = serde_json::from_str(response_text).ok()?;
    if !parsed.is_object() {
        return None;
    }

    let field = |name: &str, default: &str| -> String {
        parsed
            .get(name)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    let example_questions = parsed
        .get("example_questions")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|q| q.as_str())
                .take(MAX_EXAMPLE_QUESTIONS)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(NotebookDetails {
        title: field("title", "Untitled Notebook"),
        summary: field("summary", "No summary available"),
        notebook_icon: field("notebook_icon", "📝"),
        background_color: field("background_color", "slate"),
        example_questions,
    })
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `DetailsGenerationService` port using an
/// OpenAI chat model constrained to JSON output.
#[derive(Clone)]
pub struct OpenAiDetailsAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiDetailsAdapter {
    /// Creates a new `OpenAiDetailsAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Issues exactly one completion request and parses the result.
    async fn request_details(&self, text: &str) -> PortResult<NotebookDetails> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()
                    .map_err(|e| PortError::Generation(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(build_prompt(text))
                    .build()
                    .map_err(|e| PortError::Generation(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(|e| PortError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Generation(e.to_string()))?;

        let response_text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Generation("empty completion response".to_string()))?;

        details_from_response(&response_text)
            .ok_or_else(|| PortError::Generation("completion was not a JSON object".to_string()))
    }
}

//=========================================================================================
// `DetailsGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DetailsGenerationService for OpenAiDetailsAdapter {
    async fn generate_details(&self, text: &str) -> NotebookDetails {
        match self.request_details(text).await {
            Ok(details) => {
                info!("Generated notebook details: '{}'", details.title);
                details
            }
            Err(e) => {
                // Always produce a usable record; the failure is only logged.
                error!("Details generation failed, using fallback: {e}");
                NotebookDetails::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_truncates_document_to_model_input_bound() {
        let document = "x".repeat(60_000);
        let prompt = build_prompt(&document);
        let sent = prompt.matches('x').count();
        assert_eq!(sent, MODEL_INPUT_MAX_CHARS);
    }

    #[test]
    fn prompt_keeps_short_documents_whole() {
        let prompt = build_prompt("The quick brown fox");
        assert!(prompt.ends_with("The quick brown fox"));
    }

    #[test]
    fn parses_complete_response() {
        let details = details_from_response(
            r#"{
                "title": "Tennis Rules",
                "summary": "An overview of tennis.",
                "notebook_icon": "🎾",
                "background_color": "green",
                "example_questions": ["Who enforces the rules?"]
            }"#,
        )
        .unwrap();
        assert_eq!(details.title, "Tennis Rules");
        assert_eq!(details.background_color, "green");
        assert_eq!(details.example_questions.len(), 1);
    }

    #[test]
    fn clamps_example_questions_to_five() {
        let details = details_from_response(
            r#"{
                "title": "T",
                "summary": "S",
                "example_questions": ["1", "2", "3", "4", "5", "6", "7"]
            }"#,
        )
        .unwrap();
        assert_eq!(details.example_questions.len(), 5);
    }

    #[test]
    fn supplies_defaults_for_omitted_fields() {
        let details = details_from_response(r#"{"title": "Only Title"}"#).unwrap();
        assert_eq!(details.summary, "No summary available");
        assert_eq!(details.notebook_icon, "📝");
        assert_eq!(details.background_color, "slate");
        assert!(details.example_questions.is_empty());
    }

    #[test]
    fn rejects_non_object_responses() {
        assert!(details_from_response("not json at all").is_none());
        assert!(details_from_response(r#""just a string""#).is_none());
    }
}
