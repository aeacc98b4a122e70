//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        backends::{InProcessBackend, RemoteWebhookBackend},
        db::DbAdapter,
        details_llm::OpenAiDetailsAdapter,
        page_reader::ReaderProxyAdapter,
        sst::OpenAiSstAdapter,
        storage::StorageAdapter,
        title_llm::OpenAiTitleAdapter,
    },
    config::Config,
    error::ApiError,
    extraction::TextExtractor,
    web::{
        audio::{audio_callback_handler, refresh_audio_url_handler, start_audio_handler},
        chat::send_chat_message_handler,
        generation::{notebook_details_handler, start_generation_handler},
        notes::note_title_handler,
        rest::ApiDoc,
        sources::{additional_sources_handler, document_callback_handler},
        state::AppState,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::{routing::post, Router};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let http = reqwest::Client::new();

    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let storage_adapter = Arc::new(StorageAdapter::new(
        http.clone(),
        config.storage_url.clone(),
        config.storage_service_key.clone(),
    ));
    let page_reader = Arc::new(ReaderProxyAdapter::new(
        http.clone(),
        config.page_reader_url.clone(),
    ));
    let sst_adapter = Arc::new(OpenAiSstAdapter::new(
        openai_client.clone(),
        config.sst_model.clone(),
    ));
    let details_adapter = Arc::new(OpenAiDetailsAdapter::new(
        openai_client.clone(),
        config.details_model.clone(),
    ));
    let title_adapter = Arc::new(OpenAiTitleAdapter::new(
        openai_client.clone(),
        config.details_model.clone(),
    ));

    let extractor = TextExtractor::new(storage_adapter.clone(), page_reader, sst_adapter);
    let in_process_backend = Arc::new(InProcessBackend::new(extractor, details_adapter));
    let remote_backend = Arc::new(RemoteWebhookBackend::new(
        http.clone(),
        config.generation_webhook.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        storage: storage_adapter,
        title: title_adapter,
        config: config.clone(),
        http,
        in_process_backend,
        remote_backend,
    });

    // --- 5. Configure CORS (also answers preflight for every route) ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    // --- 6. Create the Web Router ---
    let api_router = Router::new()
        .route("/start-generation", post(start_generation_handler))
        .route("/notebook-details", post(notebook_details_handler))
        .route("/generate-note-title", post(note_title_handler))
        .route("/start-audio", post(start_audio_handler))
        .route("/audio-generation-callback", post(audio_callback_handler))
        .route("/refresh-audio-url", post(refresh_audio_url_handler))
        .route("/document-callback", post(document_callback_handler))
        .route(
            "/process-additional-sources",
            post(additional_sources_handler),
        )
        .route("/send-chat-message", post(send_chat_message_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
