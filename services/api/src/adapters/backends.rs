//! services/api/src/adapters/backends.rs
//!
//! The two interchangeable `GeneratorBackend` implementations the
//! dispatcher selects between at call time: the legacy remote webhook and
//! the in-process pipeline (Text Extractor + Metadata Generator). Callers
//! are backend-agnostic; both produce `NotebookDetails` or fail.

use std::sync::Arc;

use async_trait::async_trait;
use notebook_core::domain::{GenerationRequest, NotebookDetails};
use notebook_core::limits::MAX_EXAMPLE_QUESTIONS;
use notebook_core::ports::{DetailsGenerationService, GeneratorBackend, PortError, PortResult};
use serde_json::json;
use tracing::warn;

use crate::config::WebhookTarget;
use crate::extraction::TextExtractor;

//=========================================================================================
// Remote Webhook Backend
//=========================================================================================

/// Forwards the generation payload to a statically configured legacy
/// webhook and parses its `{output: {...}}` response shape.
pub struct RemoteWebhookBackend {
    client: reqwest::Client,
    target: Option<WebhookTarget>,
}

impl RemoteWebhookBackend {
    /// `target` may be absent; the missing configuration is reported when a
    /// dispatch actually selects this backend, matching the operator-fix
    /// error policy.
    pub fn new(client: reqwest::Client, target: Option<WebhookTarget>) -> Self {
        Self { client, target }
    }
}

#[async_trait]
impl GeneratorBackend for RemoteWebhookBackend {
    fn name(&self) -> &'static str {
        "legacy-webhook"
    }

    async fn generate(&self, request: &GenerationRequest) -> PortResult<NotebookDetails> {
        let target = self.target.as_ref().ok_or_else(|| {
            PortError::Configuration("generation webhook URL or auth missing".to_string())
        })?;

        let mut payload = json!({ "sourceType": request.source_type.as_str() });
        if let Some(file_path) = &request.file_path {
            payload["filePath"] = json!(file_path);
        }
        if let Some(content) = &request.content {
            payload["content"] = json!(content);
        }

        let response = self
            .client
            .post(&target.url)
            .header(reqwest::header::AUTHORIZATION, &target.auth_header)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PortError::Generation(format!("webhook request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Generation webhook error {status}: {body}");
            return Err(PortError::Generation(format!(
                "webhook responded with status {status}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PortError::Generation(format!("malformed webhook response: {e}")))?;

        parse_webhook_output(&body)
    }
}

/// Maps the legacy `{output: {...}}` response to `NotebookDetails`.
/// A missing `output.title` is a hard failure; every other field gets the
/// legacy defaults.
fn parse_webhook_output(body: &serde_json::Value) -> PortResult<NotebookDetails> {
    let output = body
        .get("output")
        .filter(|o| o.is_object())
        .ok_or_else(|| PortError::Generation("response has no output object".to_string()))?;

    let title = output
        .get("title")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| PortError::Generation("no title in webhook response".to_string()))?;

    let text_field = |name: &str, default: &str| -> String {
        output
            .get(name)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
            .to_string()
    };

    let example_questions = output
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

    Ok(NotebookDetails {
        title: title.to_string(),
        summary: text_field("summary", ""),
        notebook_icon: text_field("notebook_icon", "📝"),
        background_color: text_field("background_color", "bg-gray-100"),
        example_questions,
    })
}

//=========================================================================================
// In-Process Backend
//=========================================================================================

/// Runs extraction and metadata generation inside this process, behind the
/// same request/response contract as the remote webhook.
pub struct InProcessBackend {
    extractor: TextExtractor,
    details: Arc<dyn DetailsGenerationService>,
}

impl InProcessBackend {
    pub fn new(extractor: TextExtractor, details: Arc<dyn DetailsGenerationService>) -> Self {
        Self { extractor, details }
    }

    /// The extractor-then-generator pipeline, shared with the
    /// `/notebook-details` endpoint.
    pub async fn run_pipeline(&self, request: &GenerationRequest) -> PortResult<NotebookDetails> {
        let extracted = self.extractor.extract(request).await?;
        if extracted.trim().is_empty() {
            return Err(PortError::Extraction(
                "failed to extract text from source".to_string(),
            ));
        }
        Ok(self.details.generate_details(&extracted).await)
    }
}

#[async_trait]
impl GeneratorBackend for InProcessBackend {
    fn name(&self) -> &'static str {
        "in-process-v2"
    }

    async fn generate(&self, request: &GenerationRequest) -> PortResult<NotebookDetails> {
        self.run_pipeline(request).await
    }
}
