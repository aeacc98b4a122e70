//! services/api/src/web/audio.rs
//!
//! The Audio Job Manager and the Asset URL Refresher.
//!
//! `start` is the one fire-and-forget path in the service: it detaches the
//! outbound webhook call onto the runtime and answers before that call
//! resolves. Completion arrives later through the callback endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::{Duration, Utc};
use notebook_core::domain::GenerationStatus;
use notebook_core::limits::{AUDIO_URL_TTL_HOURS, AUDIO_URL_TTL_SECS};
use notebook_core::ports::NotebookStore;
use notebook_core::storage_path::object_path_after_bucket;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::WebhookTarget;
use crate::web::state::AppState;
use crate::web::json_error;

/// Bucket holding generated audio overviews.
const AUDIO_BUCKET: &str = "audio";

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartAudioRequest {
    pub notebook_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
pub struct StartAudioResponse {
    pub success: bool,
    pub message: String,
    pub status: String,
}

/// Payload the external audio service posts back when a job ends. Trusted
/// to carry the correct notebook id; there is no correlation token.
#[derive(Deserialize, ToSchema)]
pub struct AudioCallbackRequest {
    pub notebook_id: Option<Uuid>,
    pub audio_url: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshAudioRequest {
    pub notebook_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshAudioResponse {
    pub success: bool,
    pub audio_url: String,
    pub expires_at: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Start an audio overview generation job.
///
/// Returns as soon as the notebook is marked `generating`; the webhook call
/// runs detached and is never awaited by this handler.
#[utoipa::path(
    post,
    path = "/start-audio",
    request_body = StartAudioRequest,
    responses(
        (status = 200, description = "Job accepted", body = StartAudioResponse),
        (status = 400, description = "notebookId missing"),
        (status = 500, description = "Audio service unconfigured or store failure")
    )
)]
pub async fn start_audio_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartAudioRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let notebook_id = body
        .notebook_id
        .ok_or_else(|| json_error(StatusCode::BAD_REQUEST, "Notebook ID is required"))?;

    let target = state.config.audio_webhook.clone().ok_or_else(|| {
        error!("Missing audio generation webhook URL or auth");
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Audio generation service not configured",
        )
    })?;

    state
        .db
        .set_audio_status(notebook_id, GenerationStatus::Generating)
        .await
        .map_err(|e| {
            error!("Error updating notebook status: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update notebook")
        })?;

    info!("Starting audio overview generation for notebook {notebook_id}");

    // Detached on purpose: the task outlives this request, and its failure
    // write is the caller's only way to ever observe a webhook problem.
    let db = state.db.clone();
    let http = state.http.clone();
    let callback_url = state.config.audio_callback_url();
    tokio::spawn(async move {
        run_audio_job(db, http, target, callback_url, notebook_id).await;
    });

    Ok(Json(StartAudioResponse {
        success: true,
        message: "Audio generation started".to_string(),
        status: "generating".to_string(),
    }))
}

/// The detached webhook call. Owns its own error handling: any failure is
/// written straight to the store since the original caller is long gone.
async fn run_audio_job(
    db: Arc<dyn NotebookStore>,
    http: reqwest::Client,
    target: WebhookTarget,
    callback_url: String,
    notebook_id: Uuid,
) {
    let result = http
        .post(&target.url)
        .header(reqwest::header::AUTHORIZATION, &target.auth_header)
        .json(&json!({
            "notebook_id": notebook_id,
            "callback_url": callback_url,
        }))
        .send()
        .await;

    let failure = match result {
        Ok(response) if response.status().is_success() => {
            info!("Audio generation webhook accepted job for notebook {notebook_id}");
            None
        }
        Ok(response) => Some(format!(
            "audio webhook responded with status {}",
            response.status()
        )),
        Err(e) => Some(format!("audio webhook request failed: {e}")),
    };

    if let Some(message) = failure {
        error!("Background audio generation error: {message}");
        if let Err(e) = db
            .set_audio_status(notebook_id, GenerationStatus::Failed)
            .await
        {
            error!("Failed to mark audio generation as failed for {notebook_id}: {e}");
        }
    }
}

/// Finalize an audio job from the external service's callback.
///
/// Idempotent: repeated identical callbacks produce the same end state.
#[utoipa::path(
    post,
    path = "/audio-generation-callback",
    request_body = AudioCallbackRequest,
    responses(
        (status = 200, description = "Callback reconciled"),
        (status = 400, description = "notebook_id missing"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn audio_callback_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AudioCallbackRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let notebook_id = body
        .notebook_id
        .ok_or_else(|| json_error(StatusCode::BAD_REQUEST, "Notebook ID is required"))?;

    let succeeded = body.status.as_deref() == Some("success");

    if let (true, Some(audio_url)) = (succeeded, body.audio_url.as_deref()) {
        let expires_at = Utc::now() + Duration::hours(AUDIO_URL_TTL_HOURS);
        state
            .db
            .complete_audio_overview(notebook_id, audio_url, expires_at)
            .await
            .map_err(|e| {
                error!("Error updating notebook with audio URL: {e}");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update notebook")
            })?;
        info!("Audio overview completed successfully for notebook {notebook_id}");
    } else {
        state
            .db
            .set_audio_status(notebook_id, GenerationStatus::Failed)
            .await
            .map_err(|e| {
                error!("Error updating notebook status to failed: {e}");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update notebook")
            })?;
        info!(
            "Audio generation failed for notebook {notebook_id}: {:?}",
            body.error
        );
    }

    Ok(Json(json!({ "success": true })))
}

/// Re-issue the signed URL for an existing audio overview.
///
/// Pure re-authorization: never regenerates audio. Any failure is reported
/// as 400 to match the polling client's retry-by-hand contract.
#[utoipa::path(
    post,
    path = "/refresh-audio-url",
    request_body = RefreshAudioRequest,
    responses(
        (status = 200, description = "Fresh URL issued", body = RefreshAudioResponse),
        (status = 400, description = "Missing notebook, missing URL or unrecognized URL format")
    )
)]
pub async fn refresh_audio_url_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshAudioRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let notebook_id = body
        .notebook_id
        .ok_or_else(|| json_error(StatusCode::BAD_REQUEST, "Notebook ID is required"))?;

    match refresh_audio_url(&state, notebook_id).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Error refreshing audio URL for {notebook_id}: {e}");
            Err(json_error(StatusCode::BAD_REQUEST, &e.to_string()))
        }
    }
}

async fn refresh_audio_url(
    state: &AppState,
    notebook_id: Uuid,
) -> notebook_core::ports::PortResult<RefreshAudioResponse> {
    let notebook = state.db.get_notebook(notebook_id).await?;
    let current_url = notebook.audio_overview_url.ok_or_else(|| {
        notebook_core::ports::PortError::NotFound("no audio overview URL found".to_string())
    })?;

    let object_path = object_path_after_bucket(&current_url, AUDIO_BUCKET)?;
    info!("Refreshing signed URL for path {object_path}");

    let audio_url = state
        .storage
        .create_signed_url(AUDIO_BUCKET, &object_path, AUDIO_URL_TTL_SECS)
        .await?;

    let expires_at = Utc::now() + Duration::hours(AUDIO_URL_TTL_HOURS);
    state
        .db
        .update_audio_url(notebook_id, &audio_url, expires_at)
        .await?;

    Ok(RefreshAudioResponse {
        success: true,
        audio_url,
        expires_at: expires_at.to_rfc3339(),
    })
}
