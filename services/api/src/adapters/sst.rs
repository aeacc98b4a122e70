//! services/api/src/adapters/sst.rs
//!
//! This module contains the adapter for OpenAI's Speech-to-Text (Whisper)
//! service. It implements the `SpeechToTextService` port from the `core`
//! crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::audio::{AudioInput, CreateTranscriptionRequest},
    Client,
};
use async_trait::async_trait;
use notebook_core::ports::{PortError, PortResult, SpeechToTextService};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SpeechToTextService` port using the
/// OpenAI Whisper API.
#[derive(Clone)]
pub struct OpenAiSstAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSstAdapter {
    /// Creates a new `OpenAiSstAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `SpeechToTextService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SpeechToTextService for OpenAiSstAdapter {
    /// Transcribes a slice of audio data into text using the configured
    /// Whisper model. The transcript is returned verbatim.
    async fn transcribe_audio(&self, audio_data: &[u8]) -> PortResult<String> {
        let input = AudioInput::from_vec_u8("audio.mp3".into(), audio_data.to_vec());

        let request = CreateTranscriptionRequest {
            file: input,
            model: self.model.clone(),
            ..Default::default()
        };

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .audio()
            .transcription()
            .create(request)
            .await
            .map_err(|e: OpenAIError| {
                PortError::Extraction(format!("audio transcription failed: {e}"))
            })?;

        Ok(response.text)
    }
}
