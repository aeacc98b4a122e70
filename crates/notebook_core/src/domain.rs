//! crates/notebook_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The kind of input artifact attached to a notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Text,
    Website,
    File,
    Audio,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Text => "text",
            SourceType::Website => "website",
            SourceType::File => "file",
            SourceType::Audio => "audio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(SourceType::Text),
            "website" => Some(SourceType::Website),
            "file" => Some(SourceType::File),
            "audio" => Some(SourceType::Audio),
            _ => None,
        }
    }
}

/// Lifecycle of a long-running generation, polled by clients.
///
/// The notebook carries two independent instances of this state machine:
/// one for metadata generation and one for the audio overview. Neither
/// blocks the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Idle,
    Generating,
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Idle => "idle",
            GenerationStatus::Generating => "generating",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(GenerationStatus::Idle),
            "generating" => Some(GenerationStatus::Generating),
            "completed" => Some(GenerationStatus::Completed),
            "failed" => Some(GenerationStatus::Failed),
            _ => None,
        }
    }
}

/// Processing state of an individual source, mutated only by callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    Pending,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProcessingStatus::Pending),
            "completed" => Some(ProcessingStatus::Completed),
            "failed" => Some(ProcessingStatus::Failed),
            _ => None,
        }
    }
}

/// A document workspace aggregating sources, generated metadata and an
/// optional audio overview.
#[derive(Debug, Clone)]
pub struct Notebook {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub icon: String,
    pub color: String,
    pub example_questions: Vec<String>,
    pub generation_status: GenerationStatus,
    pub audio_overview_url: Option<String>,
    pub audio_url_expires_at: Option<DateTime<Utc>>,
    pub audio_overview_generation_status: GenerationStatus,
}

/// A single input artifact attached to a notebook.
#[derive(Debug, Clone)]
pub struct Source {
    pub id: Uuid,
    pub notebook_id: Uuid,
    pub source_type: SourceType,
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub processing_status: ProcessingStatus,
    pub updated_at: DateTime<Utc>,
}

/// A partial update to a source row, built from a processing callback.
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SourceUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub processing_status: Option<ProcessingStatus>,
}

/// Structured notebook metadata produced by the Metadata Generator or a
/// remote generation webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookDetails {
    pub title: String,
    pub summary: String,
    pub notebook_icon: String,
    pub background_color: String,
    pub example_questions: Vec<String>,
}

impl NotebookDetails {
    /// The deterministic object returned when the language model fails.
    /// Metadata generation always yields a usable record; the extractor
    /// follows the opposite (propagating) policy.
    pub fn fallback() -> Self {
        Self {
            title: "Error Generating Title".to_string(),
            summary: "Failed to generate summary".to_string(),
            notebook_icon: "📄".to_string(),
            background_color: "gray".to_string(),
            example_questions: Vec::new(),
        }
    }
}

/// An in-flight generation request. Created per dispatch, never persisted.
///
/// `content`, when present, has already been truncated to
/// [`crate::limits::INLINE_CONTENT_MAX_CHARS`] characters by the dispatcher.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub source_type: SourceType,
    pub file_path: Option<String>,
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            GenerationStatus::Idle,
            GenerationStatus::Generating,
            GenerationStatus::Completed,
            GenerationStatus::Failed,
        ] {
            assert_eq!(GenerationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(GenerationStatus::parse("done"), None);
    }

    #[test]
    fn source_type_strings_round_trip() {
        for ty in [
            SourceType::Text,
            SourceType::Website,
            SourceType::File,
            SourceType::Audio,
        ] {
            assert_eq!(SourceType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(SourceType::parse("pdf"), None);
    }

    #[test]
    fn fallback_details_are_fixed() {
        let details = NotebookDetails::fallback();
        assert_eq!(details.title, "Error Generating Title");
        assert!(details.example_questions.is_empty());
    }
}
