//! Shared in-memory port implementations and state wiring for the
//! integration tests. Handlers are exercised directly with these doubles;
//! outbound HTTP collaborators are stood in for by wiremock servers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use api_lib::adapters::backends::{InProcessBackend, RemoteWebhookBackend};
use api_lib::config::{Config, WebhookTarget};
use api_lib::extraction::TextExtractor;
use api_lib::web::state::AppState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notebook_core::domain::{
    GenerationStatus, Notebook, NotebookDetails, ProcessingStatus, Source, SourceType,
    SourceUpdate,
};
use notebook_core::ports::{
    DetailsGenerationService, NotebookStore, ObjectStorageService, PageReaderService, PortError,
    PortResult, SpeechToTextService, StoredObject, TitleGenerationService,
};
use uuid::Uuid;

//=========================================================================================
// In-Memory Notebook Store
//=========================================================================================

#[derive(Clone)]
pub struct NotebookState {
    pub generation_status: GenerationStatus,
    pub audio_status: GenerationStatus,
    pub audio_url: Option<String>,
    pub audio_expires_at: Option<DateTime<Utc>>,
    pub details: Option<NotebookDetails>,
    pub first_source_content: Option<String>,
}

impl NotebookState {
    pub fn new() -> Self {
        Self {
            generation_status: GenerationStatus::Idle,
            audio_status: GenerationStatus::Idle,
            audio_url: None,
            audio_expires_at: None,
            details: None,
            first_source_content: None,
        }
    }
}

#[derive(Default)]
pub struct MockStore {
    pub notebooks: Mutex<HashMap<Uuid, NotebookState>>,
    pub sources: Mutex<HashMap<Uuid, Source>>,
}

impl MockStore {
    pub fn with_notebook(self: Arc<Self>, id: Uuid, state: NotebookState) -> Arc<Self> {
        self.notebooks.lock().unwrap().insert(id, state);
        self
    }

    pub fn notebook(&self, id: Uuid) -> NotebookState {
        self.notebooks.lock().unwrap().get(&id).unwrap().clone()
    }

    fn with_state<R>(&self, id: Uuid, f: impl FnOnce(&mut NotebookState) -> R) -> PortResult<R> {
        let mut notebooks = self.notebooks.lock().unwrap();
        let state = notebooks
            .get_mut(&id)
            .ok_or_else(|| PortError::NotFound(format!("notebook {id}")))?;
        Ok(f(state))
    }
}

#[async_trait]
impl NotebookStore for MockStore {
    async fn get_notebook(&self, notebook_id: Uuid) -> PortResult<Notebook> {
        self.with_state(notebook_id, |state| Notebook {
            id: notebook_id,
            title: "Untitled Notebook".to_string(),
            description: None,
            icon: "📝".to_string(),
            color: "slate".to_string(),
            example_questions: Vec::new(),
            generation_status: state.generation_status,
            audio_overview_url: state.audio_url.clone(),
            audio_url_expires_at: state.audio_expires_at,
            audio_overview_generation_status: state.audio_status,
        })
    }

    async fn set_generation_status(
        &self,
        notebook_id: Uuid,
        status: GenerationStatus,
    ) -> PortResult<()> {
        self.with_state(notebook_id, |state| state.generation_status = status)
    }

    async fn apply_generated_details(
        &self,
        notebook_id: Uuid,
        details: &NotebookDetails,
    ) -> PortResult<()> {
        self.with_state(notebook_id, |state| {
            state.details = Some(details.clone());
            state.generation_status = GenerationStatus::Completed;
        })
    }

    async fn set_audio_status(
        &self,
        notebook_id: Uuid,
        status: GenerationStatus,
    ) -> PortResult<()> {
        self.with_state(notebook_id, |state| state.audio_status = status)
    }

    async fn complete_audio_overview(
        &self,
        notebook_id: Uuid,
        audio_url: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.with_state(notebook_id, |state| {
            state.audio_url = Some(audio_url.to_string());
            state.audio_expires_at = Some(expires_at);
            state.audio_status = GenerationStatus::Completed;
        })
    }

    async fn update_audio_url(
        &self,
        notebook_id: Uuid,
        audio_url: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.with_state(notebook_id, |state| {
            state.audio_url = Some(audio_url.to_string());
            state.audio_expires_at = Some(expires_at);
        })
    }

    async fn first_source_content(&self, notebook_id: Uuid) -> PortResult<Option<String>> {
        self.with_state(notebook_id, |state| state.first_source_content.clone())
    }

    async fn update_source(&self, source_id: Uuid, update: SourceUpdate) -> PortResult<Source> {
        let mut sources = self.sources.lock().unwrap();
        let source = sources
            .get_mut(&source_id)
            .ok_or_else(|| PortError::NotFound(format!("source {source_id}")))?;

        if let Some(title) = update.title {
            source.title = Some(title);
        }
        if let Some(content) = update.content {
            source.content = Some(content);
        }
        if let Some(summary) = update.summary {
            source.summary = Some(summary);
        }
        if let Some(status) = update.processing_status {
            source.processing_status = status;
        }
        source.updated_at = Utc::now();
        Ok(source.clone())
    }
}

pub fn pending_source(id: Uuid, notebook_id: Uuid) -> Source {
    Source {
        id,
        notebook_id,
        source_type: SourceType::File,
        title: None,
        content: None,
        summary: None,
        processing_status: ProcessingStatus::Pending,
        updated_at: Utc::now(),
    }
}

//=========================================================================================
// Storage, Page Reader, STT and Details Doubles
//=========================================================================================

/// Records every signing call and serves objects keyed by `bucket/path`.
#[derive(Default)]
pub struct MockStorage {
    pub objects: Mutex<HashMap<String, StoredObject>>,
    pub sign_calls: Mutex<Vec<(String, String, u64)>>,
    pub signed_url_override: Mutex<Option<String>>,
}

impl MockStorage {
    pub fn put_object(&self, bucket: &str, path: &str, content_type: &str, bytes: Vec<u8>) {
        self.objects.lock().unwrap().insert(
            format!("{bucket}/{path}"),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
    }

    pub fn sign_call_count(&self) -> usize {
        self.sign_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorageService for MockStorage {
    async fn create_signed_url(
        &self,
        bucket: &str,
        object_path: &str,
        expires_in_secs: u64,
    ) -> PortResult<String> {
        self.sign_calls.lock().unwrap().push((
            bucket.to_string(),
            object_path.to_string(),
            expires_in_secs,
        ));
        if let Some(url) = self.signed_url_override.lock().unwrap().clone() {
            return Ok(url);
        }
        Ok(format!("mock://{bucket}/{object_path}"))
    }

    async fn download(&self, url: &str) -> PortResult<StoredObject> {
        let key = url.trim_start_matches("mock://");
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| PortError::Extraction(format!("no such object: {url}")))
    }
}

pub struct MockPageReader {
    pub pages: Mutex<HashMap<String, String>>,
    pub calls: AtomicUsize,
}

impl Default for MockPageReader {
    fn default() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MockPageReader {
    pub fn put_page(&self, url: &str, text: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), text.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageReaderService for MockPageReader {
    async fn read_page(&self, url: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| PortError::Extraction(format!("no content for {url}")))
    }
}

pub struct MockSst {
    pub transcript: String,
    pub calls: AtomicUsize,
}

impl MockSst {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechToTextService for MockSst {
    async fn transcribe_audio(&self, _audio_data: &[u8]) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transcript.clone())
    }
}

/// A details generator with a canned answer, recording the text it was
/// handed so tests can assert on truncation and routing.
pub struct MockDetails {
    pub details: NotebookDetails,
    pub seen_texts: Mutex<Vec<String>>,
}

impl MockDetails {
    pub fn new(title: &str) -> Self {
        Self {
            details: NotebookDetails {
                title: title.to_string(),
                summary: "A mock summary".to_string(),
                notebook_icon: "📝".to_string(),
                background_color: "slate".to_string(),
                example_questions: vec!["What is this about?".to_string()],
            },
            seen_texts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.seen_texts.lock().unwrap().len()
    }
}

#[async_trait]
impl DetailsGenerationService for MockDetails {
    async fn generate_details(&self, text: &str) -> NotebookDetails {
        self.seen_texts.lock().unwrap().push(text.to_string());
        self.details.clone()
    }
}

/// A title generator with a canned answer, recording the text it was
/// handed. An empty canned title simulates a model failure.
pub struct MockTitle {
    pub title: Option<String>,
    pub seen_texts: Mutex<Vec<String>>,
}

impl MockTitle {
    pub fn new(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            seen_texts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            title: None,
            seen_texts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TitleGenerationService for MockTitle {
    async fn generate_title_from_text(&self, text: &str) -> PortResult<String> {
        self.seen_texts.lock().unwrap().push(text.to_string());
        self.title
            .clone()
            .ok_or_else(|| PortError::Generation("no title generated".to_string()))
    }
}

//=========================================================================================
// State Wiring
//=========================================================================================

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        public_base_url: "http://localhost:3000".to_string(),
        storage_url: "http://localhost:9999/storage/v1".to_string(),
        storage_service_key: "test-key".to_string(),
        openai_api_key: Some("test-key".to_string()),
        details_model: "gpt-4o-mini".to_string(),
        sst_model: "whisper-1".to_string(),
        page_reader_url: "http://localhost:9999/reader".to_string(),
        use_inprocess_generator: false,
        generation_webhook: None,
        audio_webhook: None,
        additional_sources_webhook: None,
        chat_webhook: None,
    }
}

pub fn webhook_target(url: &str) -> WebhookTarget {
    WebhookTarget {
        url: url.to_string(),
        auth_header: "Bearer test-token".to_string(),
    }
}

/// Collects the doubles needed to assemble an `AppState` and keeps them
/// reachable for assertions after the handler ran.
pub struct Harness {
    pub store: Arc<MockStore>,
    pub storage: Arc<MockStorage>,
    pub page_reader: Arc<MockPageReader>,
    pub sst: Arc<MockSst>,
    pub details: Arc<MockDetails>,
    pub title: Arc<MockTitle>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MockStore::default()),
            storage: Arc::new(MockStorage::default()),
            page_reader: Arc::new(MockPageReader::default()),
            sst: Arc::new(MockSst::new("a transcript")),
            details: Arc::new(MockDetails::new("Generated Title")),
            title: Arc::new(MockTitle::new("A Short Title")),
        }
    }

    pub fn extractor(&self) -> TextExtractor {
        TextExtractor::new(
            self.storage.clone(),
            self.page_reader.clone(),
            self.sst.clone(),
        )
    }

    /// Builds the shared state with the mock details generator behind the
    /// in-process backend.
    pub fn app_state(&self, config: Config) -> Arc<AppState> {
        self.app_state_with_details(config, self.details.clone())
    }

    pub fn app_state_with_details(
        &self,
        config: Config,
        details: Arc<dyn DetailsGenerationService>,
    ) -> Arc<AppState> {
        let http = reqwest::Client::new();
        let in_process = Arc::new(InProcessBackend::new(self.extractor(), details));
        let remote = Arc::new(RemoteWebhookBackend::new(
            http.clone(),
            config.generation_webhook.clone(),
        ));
        Arc::new(AppState {
            db: self.store.clone(),
            storage: self.storage.clone(),
            title: self.title.clone(),
            config: Arc::new(config),
            http,
            in_process_backend: in_process,
            remote_backend: remote,
        })
    }
}

/// Renders a handler's success value to its body JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
