//! crates/notebook_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the
//! database, object storage or language-model APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    GenerationRequest, Notebook, NotebookDetails, Source, SourceUpdate,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error taxonomy shared by all port operations.
///
/// Each variant carries the underlying cause as text for observability;
/// no port retries automatically.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// A required request field is missing or malformed (maps to HTTP 400).
    #[error("Validation error: {0}")]
    Validation(String),
    /// Source content was unreachable or undecodable.
    #[error("Extraction failed: {0}")]
    Extraction(String),
    /// A generator backend call failed outright.
    #[error("Generation failed: {0}")]
    Generation(String),
    /// A required external endpoint or credential is absent. Never retried;
    /// must be fixed by an operator.
    #[error("Configuration missing: {0}")]
    Configuration(String),
    /// A persistence read/write failed. Always logged and surfaced.
    #[error("Store error: {0}")]
    Store(String),
    /// A stored value does not have the expected shape (e.g. a signed URL
    /// with no recognizable object path).
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Row-level access to notebooks and sources. The store owns the records
/// exclusively; the core only reads and writes through update-by-id calls
/// and keeps no in-process cache.
#[async_trait]
pub trait NotebookStore: Send + Sync {
    async fn get_notebook(&self, notebook_id: Uuid) -> PortResult<Notebook>;

    async fn set_generation_status(
        &self,
        notebook_id: Uuid,
        status: crate::domain::GenerationStatus,
    ) -> PortResult<()>;

    /// Writes all generated metadata fields plus `generation_status =
    /// completed` in a single row update.
    async fn apply_generated_details(
        &self,
        notebook_id: Uuid,
        details: &NotebookDetails,
    ) -> PortResult<()>;

    async fn set_audio_status(
        &self,
        notebook_id: Uuid,
        status: crate::domain::GenerationStatus,
    ) -> PortResult<()>;

    /// Sets the audio overview URL, its expiry and `completed` in one write.
    async fn complete_audio_overview(
        &self,
        notebook_id: Uuid,
        audio_url: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Re-issues only the URL and expiry, leaving the audio status alone.
    async fn update_audio_url(
        &self,
        notebook_id: Uuid,
        audio_url: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// The stored content of the notebook's first associated source, if any.
    async fn first_source_content(&self, notebook_id: Uuid) -> PortResult<Option<String>>;

    async fn update_source(&self, source_id: Uuid, update: SourceUpdate) -> PortResult<Source>;
}

/// A downloaded stored object together with its declared content type.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Time-limited, credential-bearing access to stored objects.
#[async_trait]
pub trait ObjectStorageService: Send + Sync {
    /// Issues a signed URL for `object_path` in `bucket`, valid for
    /// `expires_in_secs` seconds.
    async fn create_signed_url(
        &self,
        bucket: &str,
        object_path: &str,
        expires_in_secs: u64,
    ) -> PortResult<String>;

    /// Downloads an object through a (signed) URL.
    async fn download(&self, url: &str) -> PortResult<StoredObject>;
}

#[async_trait]
pub trait SpeechToTextService: Send + Sync {
    /// Transcribes a slice of audio data into text.
    async fn transcribe_audio(&self, audio_data: &[u8]) -> PortResult<String>;
}

/// Fetches a web page as normalized plain text through a page-to-text proxy.
#[async_trait]
pub trait PageReaderService: Send + Sync {
    async fn read_page(&self, url: &str) -> PortResult<String>;
}

/// Produces structured notebook metadata from extracted text.
///
/// Infallible by policy: implementations swallow every model or transport
/// failure into [`NotebookDetails::fallback`] so a usable record is always
/// produced. This is deliberately the opposite of the extraction ports,
/// which propagate their causes.
#[async_trait]
pub trait DetailsGenerationService: Send + Sync {
    async fn generate_details(&self, text: &str) -> NotebookDetails;
}

/// Produces a short display title for a single note's text.
///
/// Unlike [`DetailsGenerationService`] this port propagates its failures;
/// the note keeps whatever title it already had.
#[async_trait]
pub trait TitleGenerationService: Send + Sync {
    async fn generate_title_from_text(&self, text: &str) -> PortResult<String>;
}

/// One of the two interchangeable metadata generation backends selected by
/// the dispatcher's feature flag. The dispatcher depends only on this
/// capability, never on a concrete backend.
#[async_trait]
pub trait GeneratorBackend: Send + Sync {
    /// A stable identifier reported back to callers as `generatorUsed`.
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &GenerationRequest) -> PortResult<NotebookDetails>;
}
