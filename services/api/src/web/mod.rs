//! services/api/src/web/mod.rs

pub mod audio;
pub mod chat;
pub mod generation;
pub mod notes;
pub mod rest;
pub mod sources;
pub mod state;

use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};

/// The uniform JSON error body every endpoint returns on failure.
pub(crate) fn json_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}
