//! services/api/src/web/generation.rs
//!
//! The Generation Dispatcher: receives a generation request, flips the
//! notebook to `generating`, runs the selected backend synchronously and
//! writes the terminal status back before responding. Every handled error
//! path leaves the notebook in `completed` or `failed`, never `generating`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use notebook_core::domain::{GenerationRequest, GenerationStatus, SourceType};
use notebook_core::limits::{truncate_chars, INLINE_CONTENT_MAX_CHARS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::json_error;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartGenerationRequest {
    pub notebook_id: Option<Uuid>,
    pub file_path: Option<String>,
    pub source_type: Option<String>,
}

/// The payload sent back once a dispatch has run to completion.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartGenerationResponse {
    pub success: bool,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub example_questions: Vec<String>,
    pub generator_used: String,
    pub message: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotebookDetailsRequest {
    pub file_path: Option<String>,
    pub source_type: Option<String>,
    pub content: Option<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Dispatch metadata generation for a notebook.
///
/// Synchronous end-to-end: the response is sent only after the notebook row
/// holds the terminal status.
#[utoipa::path(
    post,
    path = "/start-generation",
    request_body = StartGenerationRequest,
    responses(
        (status = 200, description = "Generation completed", body = StartGenerationResponse),
        (status = 400, description = "notebookId or sourceType missing"),
        (status = 500, description = "Backend or store failure; notebook left in 'failed'")
    )
)]
pub async fn start_generation_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartGenerationRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let (notebook_id, source_type_str) = match (body.notebook_id, body.source_type.as_deref()) {
        (Some(id), Some(ty)) => (id, ty),
        _ => {
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                "notebookId and sourceType are required",
            ))
        }
    };
    let source_type = SourceType::parse(source_type_str).ok_or_else(|| {
        json_error(
            StatusCode::BAD_REQUEST,
            &format!("unknown sourceType '{source_type_str}'"),
        )
    })?;

    info!("Processing generation request for notebook {notebook_id} ({source_type_str})");

    state
        .db
        .set_generation_status(notebook_id, GenerationStatus::Generating)
        .await
        .map_err(|e| {
            error!("Failed to mark notebook as generating: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update notebook")
        })?;

    let request = match build_request(&state, notebook_id, source_type, body.file_path).await {
        Ok(request) => request,
        Err(e) => return Err(fail_generation(&state, notebook_id, &e.to_string()).await),
    };

    let backend = state.generator_backend();
    info!("Using '{}' generator backend", backend.name());

    let details = match backend.generate(&request).await {
        Ok(details) => details,
        Err(e) => return Err(fail_generation(&state, notebook_id, &e.to_string()).await),
    };

    state
        .db
        .apply_generated_details(notebook_id, &details)
        .await
        .map_err(|e| {
            error!("Notebook update error: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update notebook")
        })?;

    info!(
        "Notebook {notebook_id} completed with title '{}' via {}",
        details.title,
        backend.name()
    );

    Ok(Json(StartGenerationResponse {
        success: true,
        title: details.title,
        description: details.summary,
        icon: details.notebook_icon,
        color: details.background_color,
        example_questions: details.example_questions,
        generator_used: backend.name().to_string(),
        message: "Notebook content generated successfully".to_string(),
    }))
}

/// Run the in-process extraction/generation pipeline directly, answering
/// with the legacy backend's response shape.
#[utoipa::path(
    post,
    path = "/notebook-details",
    request_body = NotebookDetailsRequest,
    responses(
        (status = 200, description = "Generated details under an 'output' key"),
        (status = 400, description = "sourceType missing"),
        (status = 500, description = "Extraction or generation failure")
    )
)]
pub async fn notebook_details_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NotebookDetailsRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let source_type_str = body
        .source_type
        .as_deref()
        .ok_or_else(|| json_error(StatusCode::BAD_REQUEST, "sourceType is required"))?;
    let source_type = SourceType::parse(source_type_str).ok_or_else(|| {
        json_error(
            StatusCode::BAD_REQUEST,
            &format!("unknown sourceType '{source_type_str}'"),
        )
    })?;

    let request = GenerationRequest {
        source_type,
        file_path: body.file_path,
        content: body.content,
    };

    match state.in_process_backend.run_pipeline(&request).await {
        Ok(details) => Ok(Json(json!({
            "output": {
                "title": details.title,
                "summary": details.summary,
                "notebook_icon": details.notebook_icon,
                "background_color": details.background_color,
                "example_questions": details.example_questions,
            }
        }))),
        Err(e) => {
            error!("Notebook details pipeline failed: {e}");
            Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &e.to_string(),
            ))
        }
    }
}

//=========================================================================================
// Dispatch Helpers
//=========================================================================================

/// Resolves the request body for the backends: a file path is passed
/// through untouched, otherwise the first source's stored content is
/// truncated to the inline bound. Empty stored content counts as absent.
async fn build_request(
    state: &AppState,
    notebook_id: Uuid,
    source_type: SourceType,
    file_path: Option<String>,
) -> notebook_core::ports::PortResult<GenerationRequest> {
    let content = if file_path.is_some() {
        None
    } else {
        state
            .db
            .first_source_content(notebook_id)
            .await?
            .filter(|c| !c.is_empty())
            .map(|c| truncate_chars(&c, INLINE_CONTENT_MAX_CHARS).to_string())
    };

    Ok(GenerationRequest {
        source_type,
        file_path,
        content,
    })
}

/// Terminal failure path: writes `failed` before the error response leaves
/// the dispatcher, so polling clients never see an unbounded `generating`.
async fn fail_generation(
    state: &AppState,
    notebook_id: Uuid,
    message: &str,
) -> (StatusCode, Json<Value>) {
    error!("Generation for notebook {notebook_id} failed: {message}");
    if let Err(e) = state
        .db
        .set_generation_status(notebook_id, GenerationStatus::Failed)
        .await
    {
        error!("Failed to mark notebook {notebook_id} as failed: {e}");
    }
    json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}
