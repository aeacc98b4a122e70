//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification. The handlers
//! themselves live in the workflow modules (`generation`, `audio`,
//! `sources`, `chat`).

use utoipa::OpenApi;

use crate::web::audio::{
    AudioCallbackRequest, RefreshAudioRequest, RefreshAudioResponse, StartAudioRequest,
    StartAudioResponse,
};
use crate::web::chat::ChatMessageRequest;
use crate::web::generation::{
    NotebookDetailsRequest, StartGenerationRequest, StartGenerationResponse,
};
use crate::web::notes::{NoteTitleRequest, NoteTitleResponse};
use crate::web::sources::{AdditionalSourcesRequest, DocumentCallbackRequest, SourceDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::generation::start_generation_handler,
        crate::web::generation::notebook_details_handler,
        crate::web::notes::note_title_handler,
        crate::web::audio::start_audio_handler,
        crate::web::audio::audio_callback_handler,
        crate::web::audio::refresh_audio_url_handler,
        crate::web::sources::document_callback_handler,
        crate::web::sources::additional_sources_handler,
        crate::web::chat::send_chat_message_handler,
    ),
    components(
        schemas(
            StartGenerationRequest,
            StartGenerationResponse,
            NotebookDetailsRequest,
            NoteTitleRequest,
            NoteTitleResponse,
            StartAudioRequest,
            StartAudioResponse,
            AudioCallbackRequest,
            RefreshAudioRequest,
            RefreshAudioResponse,
            DocumentCallbackRequest,
            AdditionalSourcesRequest,
            SourceDto,
            ChatMessageRequest,
        )
    ),
    tags(
        (name = "Notebook Generation API", description = "Endpoints orchestrating notebook metadata and audio overview generation.")
    )
)]
pub struct ApiDoc;
