//! services/api/src/web/chat.rs
//!
//! A plain proxy-to-webhook chat relay. When the webhook is unconfigured it
//! answers with a fixed demo payload so the UI can still exercise the chat
//! surface.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::json_error;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct ChatMessageRequest {
    pub session_id: Option<String>,
    pub message: Option<String>,
    pub user_id: Option<Uuid>,
}

/// Relay a chat message to the external chat webhook.
#[utoipa::path(
    post,
    path = "/send-chat-message",
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Webhook (or demo) response"),
        (status = 500, description = "Webhook failure")
    )
)]
pub async fn send_chat_message_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatMessageRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    info!(
        "Received chat message for session {:?} from user {:?}",
        body.session_id, body.user_id
    );

    let Some(target) = state.config.chat_webhook.clone() else {
        warn!("Chat webhook not configured, returning demo response");
        return Ok(Json(json!({
            "success": true,
            "demo": true,
            "data": {
                "message": "Chat functionality requires webhook configuration. This is a \
demo response showing that the chat interface is working, but you'll need to configure the \
NOTEBOOK_CHAT_URL and NOTEBOOK_GENERATION_AUTH environment variables to connect to an AI \
chat service.",
                "session_id": body.session_id,
                "demo": true,
            }
        })));
    };

    let response = state
        .http
        .post(&target.url)
        .header(reqwest::header::AUTHORIZATION, &target.auth_header)
        .json(&json!({
            "session_id": body.session_id,
            "message": body.message,
            "user_id": body.user_id,
            "timestamp": Utc::now().to_rfc3339(),
        }))
        .send()
        .await
        .map_err(|e| {
            error!("Chat webhook request failed: {e}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send message to webhook",
            )
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        error!("Chat webhook responded with status {status}: {error_text}");
        return Err(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Webhook responded with status: {status}"),
        ));
    }

    let data: Value = response.json().await.map_err(|e| {
        error!("Malformed chat webhook response: {e}");
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Malformed webhook response",
        )
    })?;

    Ok(Json(json!({ "success": true, "data": data })))
}
