//! services/api/src/web/sources.rs
//!
//! Source-side request/response glue: the document processing callback that
//! mutates source rows, and the relay that forwards additional-source
//! batches to the external processing webhook.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use notebook_core::domain::{ProcessingStatus, Source, SourceUpdate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::json_error;
use crate::web::state::AppState;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct DocumentCallbackRequest {
    pub source_id: Option<Uuid>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub title: Option<String>,
    pub display_name: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
}

/// The updated source row echoed back to the callback sender.
#[derive(Serialize, ToSchema)]
pub struct SourceDto {
    pub id: Uuid,
    pub notebook_id: Uuid,
    pub source_type: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub processing_status: String,
    pub updated_at: String,
}

impl SourceDto {
    fn from_domain(source: Source) -> Self {
        Self {
            id: source.id,
            notebook_id: source.notebook_id,
            source_type: source.source_type.as_str().to_string(),
            title: source.title,
            content: source.content,
            summary: source.summary,
            processing_status: source.processing_status.as_str().to_string(),
            updated_at: source.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalSourcesRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notebook_id: Option<Uuid>,
    pub urls: Option<Vec<String>>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub source_ids: Option<Vec<Uuid>>,
    pub timestamp: Option<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Reconcile an asynchronous document-processing result against its source
/// row. Only callbacks mutate sources.
#[utoipa::path(
    post,
    path = "/document-callback",
    request_body = DocumentCallbackRequest,
    responses(
        (status = 200, description = "Source updated"),
        (status = 400, description = "source_id missing"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn document_callback_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DocumentCallbackRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let source_id = body
        .source_id
        .ok_or_else(|| json_error(StatusCode::BAD_REQUEST, "source_id is required"))?;

    info!("Document processing callback received for source {source_id}");

    // An error payload always wins; otherwise the reported status, and a
    // bare callback defaults to completed.
    let processing_status = if body.error.is_some() {
        error!("Document processing failed: {:?}", body.error);
        ProcessingStatus::Failed
    } else {
        body.status
            .as_deref()
            .and_then(ProcessingStatus::parse)
            .unwrap_or(ProcessingStatus::Completed)
    };

    let update = SourceUpdate {
        title: body.title.or(body.display_name),
        content: body.content,
        summary: body.summary,
        processing_status: Some(processing_status),
    };

    match state.db.update_source(source_id, update).await {
        Ok(source) => {
            info!("Source {source_id} updated successfully");
            Ok(Json(json!({
                "success": true,
                "message": "Source updated successfully",
                "data": SourceDto::from_domain(source),
            })))
        }
        Err(e) => {
            error!("Error updating source {source_id}: {e}");
            Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update source",
            ))
        }
    }
}

/// Forward a batch of additional sources to the external processing
/// webhook. Plain proxy glue; the webhook does the actual work and reports
/// back through `/document-callback`.
#[utoipa::path(
    post,
    path = "/process-additional-sources",
    request_body = AdditionalSourcesRequest,
    responses(
        (status = 200, description = "Payload forwarded"),
        (status = 500, description = "Missing configuration, unsupported type or webhook failure")
    )
)]
pub async fn additional_sources_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdditionalSourcesRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let kind = body
        .kind
        .as_deref()
        .ok_or_else(|| json_error(StatusCode::INTERNAL_SERVER_ERROR, "type is required"))?;

    info!(
        "Process additional sources received {kind} request for notebook {:?}",
        body.notebook_id
    );

    let target = state.config.additional_sources_webhook.clone().ok_or_else(|| {
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Additional sources webhook not configured",
        )
    })?;

    let payload = match kind {
        "multiple-websites" => json!({
            "type": "multiple-websites",
            "notebookId": body.notebook_id,
            "urls": body.urls,
            "sourceIds": body.source_ids,
            "timestamp": body.timestamp,
        }),
        "copied-text" => json!({
            "type": "copied-text",
            "notebookId": body.notebook_id,
            "title": body.title,
            "content": body.content,
            "sourceId": body.source_ids.as_ref().and_then(|ids| ids.first()),
            "timestamp": body.timestamp,
        }),
        other => {
            return Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Unsupported type: {other}"),
            ))
        }
    };

    let response = state
        .http
        .post(&target.url)
        .header(reqwest::header::AUTHORIZATION, &target.auth_header)
        .json(&payload)
        .send()
        .await
        .map_err(|e| {
            error!("Webhook request failed: {e}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Webhook request failed: {e}"),
            )
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        error!("Webhook request failed: {status} - {error_text}");
        return Err(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Webhook request failed: {status} - {error_text}"),
        ));
    }

    let webhook_response = response.text().await.unwrap_or_default();

    Ok(Json(json!({
        "success": true,
        "message": format!("{kind} data sent to webhook successfully"),
        "webhookResponse": webhook_response,
    })))
}
