//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup into a
//! single `Config` that is passed by reference into every component. The
//! `.env` file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Credentials for one outbound webhook collaborator.
#[derive(Clone, Debug)]
pub struct WebhookTarget {
    pub url: String,
    pub auth_header: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Public base URL of this service, used to build the audio callback URL.
    pub public_base_url: String,
    pub storage_url: String,
    pub storage_service_key: String,
    pub openai_api_key: Option<String>,
    pub details_model: String,
    pub sst_model: String,
    pub page_reader_url: String,
    /// Selects the in-process generator over the legacy webhook, read once
    /// per dispatch.
    pub use_inprocess_generator: bool,
    pub generation_webhook: Option<WebhookTarget>,
    pub audio_webhook: Option<WebhookTarget>,
    pub additional_sources_webhook: Option<WebhookTarget>,
    pub chat_webhook: Option<WebhookTarget>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure
    /// tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}", bind_address));

        // --- Load Storage Settings ---
        let storage_url = std::env::var("STORAGE_URL")
            .map_err(|_| ConfigError::MissingVar("STORAGE_URL".to_string()))?;
        let storage_service_key = std::env::var("STORAGE_SERVICE_KEY")
            .map_err(|_| ConfigError::MissingVar("STORAGE_SERVICE_KEY".to_string()))?;

        // --- Load Model Settings ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let details_model =
            std::env::var("DETAILS_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let sst_model = std::env::var("SST_MODEL").unwrap_or_else(|_| "whisper-1".to_string());
        let page_reader_url =
            std::env::var("PAGE_READER_URL").unwrap_or_else(|_| "https://r.jina.ai".to_string());

        // --- Load Generator Backend Settings ---
        let use_inprocess_generator = std::env::var("USE_INPROCESS_GENERATOR")
            .map(|v| v == "true")
            .unwrap_or(false);

        // The legacy generation, audio, additional-sources and chat webhooks
        // all share one auth token. Each target is optional; its absence is
        // reported as a configuration error at call time, not at startup.
        let shared_auth = std::env::var("NOTEBOOK_GENERATION_AUTH").ok();
        let webhook_target = |var: &str| -> Option<WebhookTarget> {
            match (std::env::var(var).ok(), shared_auth.clone()) {
                (Some(url), Some(auth_header)) => Some(WebhookTarget { url, auth_header }),
                _ => None,
            }
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            public_base_url,
            storage_url,
            storage_service_key,
            openai_api_key,
            details_model,
            sst_model,
            page_reader_url,
            use_inprocess_generator,
            generation_webhook: webhook_target("NOTEBOOK_GENERATION_URL"),
            audio_webhook: webhook_target("AUDIO_GENERATION_WEBHOOK_URL"),
            additional_sources_webhook: webhook_target("ADDITIONAL_SOURCES_WEBHOOK_URL"),
            chat_webhook: webhook_target("NOTEBOOK_CHAT_URL"),
        })
    }

    /// The URL the external audio service calls back into once a job ends.
    pub fn audio_callback_url(&self) -> String {
        format!(
            "{}/audio-generation-callback",
            self.public_base_url.trim_end_matches('/')
        )
    }
}
