//! services/api/src/web/notes.rs
//!
//! Note title generation. Transcribed notes arrive as a JSON envelope of
//! timed segments; plain notes arrive as raw text. Both collapse to one
//! short title request.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use notebook_core::limits::NOTE_TITLE_SEGMENTS;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::web::json_error;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct NoteTitleRequest {
    pub content: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct NoteTitleResponse {
    pub title: String,
}

/// Recovers prompt text from a note body. Segmented transcripts use the
/// leading segments' text; anything that is not a segment envelope is
/// treated as plain text.
fn note_text(content: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(content) {
        if let Some(segments) = parsed.get("segments").and_then(|s| s.as_array()) {
            if !segments.is_empty() {
                return segments
                    .iter()
                    .take(NOTE_TITLE_SEGMENTS)
                    .filter_map(|segment| segment.get("text").and_then(|t| t.as_str()))
                    .collect::<Vec<_>>()
                    .join(" ");
            }
        }
    }
    content.to_string()
}

/// Generate a short display title for a note.
#[utoipa::path(
    post,
    path = "/generate-note-title",
    request_body = NoteTitleRequest,
    responses(
        (status = 200, description = "Title generated", body = NoteTitleResponse),
        (status = 400, description = "content missing"),
        (status = 500, description = "Model call failure")
    )
)]
pub async fn note_title_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NoteTitleRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let content = body
        .content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| json_error(StatusCode::BAD_REQUEST, "Content is required"))?;

    let text = note_text(&content);

    match state.title.generate_title_from_text(&text).await {
        Ok(title) => {
            info!("Generated note title: '{title}'");
            Ok(Json(NoteTitleResponse { title }))
        }
        Err(e) => {
            error!("Note title generation failed: {e}");
            Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))
        }
    }
}
