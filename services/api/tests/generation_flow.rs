//! Integration tests for the Generation Dispatcher: backend selection,
//! terminal status writes and the inline-content truncation contract.

mod common;

use api_lib::web::generation::{start_generation_handler, StartGenerationRequest};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use common::{body_json, test_config, webhook_target, Harness, NotebookState};
use notebook_core::domain::GenerationStatus;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(notebook_id: Uuid, source_type: &str) -> Json<StartGenerationRequest> {
    Json(StartGenerationRequest {
        notebook_id: Some(notebook_id),
        file_path: None,
        source_type: Some(source_type.to_string()),
    })
}

#[tokio::test]
async fn text_source_completes_through_in_process_backend() {
    let harness = Harness::new();
    let notebook_id = Uuid::new_v4();
    let mut seeded = NotebookState::new();
    seeded.first_source_content = Some("The quick brown fox jumps over the lazy dog.".to_string());
    harness
        .store
        .clone()
        .with_notebook(notebook_id, seeded);

    let mut config = test_config();
    config.use_inprocess_generator = true;
    let state = harness.app_state(config);

    let response = start_generation_handler(State(state), request(notebook_id, "text"))
        .await
        .expect("dispatch should succeed")
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["title"], "Generated Title");
    assert_eq!(body["generatorUsed"], "in-process-v2");

    // The generator saw the text exactly once; no network-backed strategy ran.
    assert_eq!(harness.details.call_count(), 1);
    assert_eq!(harness.page_reader.call_count(), 0);
    assert_eq!(harness.storage.sign_call_count(), 0);

    let notebook = harness.store.notebook(notebook_id);
    assert_eq!(notebook.generation_status, GenerationStatus::Completed);
    assert_eq!(notebook.details.unwrap().title, "Generated Title");
}

#[tokio::test]
async fn remote_backend_success_writes_all_fields() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "output": {
                "title": "Webhook Title",
                "summary": "Webhook summary",
                "example_questions": ["Q1", "Q2"],
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let harness = Harness::new();
    let notebook_id = Uuid::new_v4();
    let mut seeded = NotebookState::new();
    seeded.first_source_content = Some("stored content".to_string());
    harness.store.clone().with_notebook(notebook_id, seeded);

    let mut config = test_config();
    config.generation_webhook = Some(webhook_target(&format!("{}/generate", mock_server.uri())));
    let state = harness.app_state(config);

    let response = start_generation_handler(State(state), request(notebook_id, "text"))
        .await
        .expect("dispatch should succeed")
        .into_response();
    let body = body_json(response).await;
    assert_eq!(body["title"], "Webhook Title");
    assert_eq!(body["generatorUsed"], "legacy-webhook");
    assert_eq!(body["icon"], "📝");
    assert_eq!(body["color"], "bg-gray-100");

    let notebook = harness.store.notebook(notebook_id);
    assert_eq!(notebook.generation_status, GenerationStatus::Completed);
}

#[tokio::test]
async fn remote_response_without_title_fails_the_notebook() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "output": { "summary": "no title in sight" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let harness = Harness::new();
    let notebook_id = Uuid::new_v4();
    harness
        .store
        .clone()
        .with_notebook(notebook_id, NotebookState::new());

    let mut config = test_config();
    config.generation_webhook = Some(webhook_target(&mock_server.uri()));
    let state = harness.app_state(config);

    let Err((status, _body)) = start_generation_handler(State(state), request(notebook_id, "text")).await
    else {
        panic!("missing title must be terminal");
    };
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        harness.store.notebook(notebook_id).generation_status,
        GenerationStatus::Failed
    );
}

#[tokio::test]
async fn remote_http_error_fails_the_notebook() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let harness = Harness::new();
    let notebook_id = Uuid::new_v4();
    harness
        .store
        .clone()
        .with_notebook(notebook_id, NotebookState::new());

    let mut config = test_config();
    config.generation_webhook = Some(webhook_target(&mock_server.uri()));
    let state = harness.app_state(config);

    let Err((status, _body)) = start_generation_handler(State(state), request(notebook_id, "text")).await
    else {
        panic!("bad gateway must be terminal");
    };
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        harness.store.notebook(notebook_id).generation_status,
        GenerationStatus::Failed
    );
}

#[tokio::test]
async fn missing_fields_are_rejected_without_a_status_write() {
    let harness = Harness::new();
    let state = harness.app_state(test_config());

    let Err((status, body)) = start_generation_handler(
        State(state),
        Json(StartGenerationRequest {
            notebook_id: None,
            file_path: None,
            source_type: Some("text".to_string()),
        }),
    )
    .await
    else {
        panic!("must be rejected");
    };
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.0["error"], "notebookId and sourceType are required");
    assert!(harness.store.notebooks.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_source_content_ends_failed_not_completed() {
    let harness = Harness::new();
    let notebook_id = Uuid::new_v4();
    let mut seeded = NotebookState::new();
    seeded.first_source_content = Some("   ".to_string());
    harness.store.clone().with_notebook(notebook_id, seeded);

    let mut config = test_config();
    config.use_inprocess_generator = true;
    let state = harness.app_state(config);

    let Err((status, _body)) = start_generation_handler(State(state), request(notebook_id, "text")).await
    else {
        panic!("blank content cannot complete");
    };
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        harness.store.notebook(notebook_id).generation_status,
        GenerationStatus::Failed
    );
    assert_eq!(harness.details.call_count(), 0);
}

#[tokio::test]
async fn inline_content_is_truncated_to_5000_characters() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "output": { "title": "T" }
        })))
        .mount(&mock_server)
        .await;

    let harness = Harness::new();
    let notebook_id = Uuid::new_v4();
    let mut seeded = NotebookState::new();
    seeded.first_source_content = Some("y".repeat(6000));
    harness.store.clone().with_notebook(notebook_id, seeded);

    let mut config = test_config();
    config.generation_webhook = Some(webhook_target(&mock_server.uri()));
    let state = harness.app_state(config);

    start_generation_handler(State(state), request(notebook_id, "text"))
        .await
        .expect("dispatch should succeed");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let payload: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(payload["content"].as_str().unwrap().chars().count(), 5000);
    assert_eq!(payload["sourceType"], "text");
}

#[tokio::test]
async fn file_path_passes_through_untouched() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "output": { "title": "T" }
        })))
        .mount(&mock_server)
        .await;

    let harness = Harness::new();
    let notebook_id = Uuid::new_v4();
    harness
        .store
        .clone()
        .with_notebook(notebook_id, NotebookState::new());

    let mut config = test_config();
    config.generation_webhook = Some(webhook_target(&mock_server.uri()));
    let state = harness.app_state(config);

    start_generation_handler(
        State(state),
        Json(StartGenerationRequest {
            notebook_id: Some(notebook_id),
            file_path: Some("notebooks/abc/report.pdf".to_string()),
            source_type: Some("file".to_string()),
        }),
    )
    .await
    .expect("dispatch should succeed");

    let requests = mock_server.received_requests().await.unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(payload["filePath"], "notebooks/abc/report.pdf");
    assert!(payload.get("content").is_none());
}
