//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use notebook_core::ports::{
    GeneratorBackend, NotebookStore, ObjectStorageService, TitleGenerationService,
};

use crate::adapters::backends::{InProcessBackend, RemoteWebhookBackend};
use crate::config::Config;

/// The shared application state, created once at startup and passed to all
/// handlers. All mutable state lives behind the store; handlers share
/// nothing else in-process.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn NotebookStore>,
    pub storage: Arc<dyn ObjectStorageService>,
    pub title: Arc<dyn TitleGenerationService>,
    pub config: Arc<Config>,
    /// Outbound client for the relay endpoints and the audio webhook.
    pub http: reqwest::Client,
    pub in_process_backend: Arc<InProcessBackend>,
    pub remote_backend: Arc<RemoteWebhookBackend>,
}

impl AppState {
    /// Selects the generator backend for one dispatch. The flag is read per
    /// call so the dispatcher stays backend-agnostic.
    pub fn generator_backend(&self) -> Arc<dyn GeneratorBackend> {
        if self.config.use_inprocess_generator {
            self.in_process_backend.clone()
        } else {
            self.remote_backend.clone()
        }
    }
}
