//! services/api/src/extraction.rs
//!
//! The Text Extractor: turns a generation request into normalized plain
//! text. Delegates to one of three strategies (direct text, page-to-text
//! proxy, stored-file decode) and, unlike the Metadata Generator, always
//! propagates failures with their underlying cause. No branch retries.

use std::sync::Arc;

use notebook_core::domain::{GenerationRequest, SourceType};
use notebook_core::limits::{DOWNLOAD_URL_TTL_SECS, MIN_PDF_TEXT_CHARS};
use notebook_core::ports::{
    ObjectStorageService, PageReaderService, PortError, PortResult, SpeechToTextService,
};
use tracing::info;

/// Bucket holding uploaded source files.
const SOURCES_BUCKET: &str = "sources";

/// Composes the storage, page-reader and speech-to-text ports into the
/// single `extract` entry point used by the in-process generator backend.
#[derive(Clone)]
pub struct TextExtractor {
    storage: Arc<dyn ObjectStorageService>,
    page_reader: Arc<dyn PageReaderService>,
    sst: Arc<dyn SpeechToTextService>,
}

impl TextExtractor {
    pub fn new(
        storage: Arc<dyn ObjectStorageService>,
        page_reader: Arc<dyn PageReaderService>,
        sst: Arc<dyn SpeechToTextService>,
    ) -> Self {
        Self {
            storage,
            page_reader,
            sst,
        }
    }

    /// Extracts normalized text for the request, or fails with the cause.
    pub async fn extract(&self, request: &GenerationRequest) -> PortResult<String> {
        match (request.source_type, &request.file_path, &request.content) {
            (SourceType::Text, _, Some(content)) => {
                info!("Using provided text content");
                Ok(content.clone())
            }
            (SourceType::Website, Some(url), _) => {
                info!("Fetching website content for {url}");
                self.page_reader.read_page(url).await
            }
            // The UI sometimes stores the scraped page up front; no refetch.
            (SourceType::Website, None, Some(content)) => Ok(content.clone()),
            (_, Some(file_path), _) => {
                info!("Extracting text from file {file_path}");
                self.extract_from_file(file_path).await
            }
            _ => Err(PortError::Validation(
                "either filePath or content must be provided".to_string(),
            )),
        }
    }

    /// Downloads a stored object through a short-lived signed URL and
    /// decodes it according to its declared content type.
    async fn extract_from_file(&self, file_path: &str) -> PortResult<String> {
        let signed_url = self
            .storage
            .create_signed_url(SOURCES_BUCKET, file_path, DOWNLOAD_URL_TTL_SECS)
            .await?;

        let object = self.storage.download(&signed_url).await?;
        let content_type = object.content_type.as_str();
        info!("File content type: {content_type}");

        if content_type.contains("application/pdf") {
            extract_pdf_text(&object.bytes)
        } else if content_type.contains("audio/") {
            self.sst.transcribe_audio(&object.bytes).await
        } else if content_type.contains("text/") {
            Ok(String::from_utf8_lossy(&object.bytes).into_owned())
        } else {
            // Best effort for undeclared types; accept whatever decodes.
            let text = String::from_utf8_lossy(&object.bytes);
            if !text.trim().is_empty() {
                Ok(text.into_owned())
            } else {
                Err(PortError::Extraction(format!(
                    "unsupported file type: {content_type}"
                )))
            }
        }
    }
}

/// Raw-text PDF decode: keeps printable ASCII plus line breaks and tabs,
/// collapses whitespace, and rejects results under the usable-character
/// floor (heuristic for image-only or encrypted PDFs).
fn extract_pdf_text(bytes: &[u8]) -> PortResult<String> {
    let decoded = String::from_utf8_lossy(bytes);
    let printable: String = decoded
        .chars()
        .map(|c| {
            if ('\u{20}'..='\u{7e}').contains(&c) || c == '\n' || c == '\r' || c == '\t' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let clean = printable.split_whitespace().collect::<Vec<_>>().join(" ");

    if clean.len() < MIN_PDF_TEXT_CHARS {
        return Err(PortError::Extraction(
            "PDF text extraction failed; it may contain only images or be encrypted".to_string(),
        ));
    }

    Ok(clean)
}
