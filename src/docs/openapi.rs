//! OpenAPI specification for the relay
//!
//! Aggregates the public endpoints and schemas into a single OpenAPI document.

use utoipa::OpenApi;

use crate::{
    error::{DebugInfo, ErrorResponse},
    messages::{ChatRequest, ChatResponse},
    routes::models::{ModelCatalog, ModelInfo},
};

/// OpenAPI specification for the chat relay
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chat Relay API",
        version = "1.0.0",
        description = "Forwards chat messages (text, images, PDFs) to the Anthropic Messages API and returns the reply as text. The caller supplies its own API key in the request body."
    ),
    paths(
        crate::routes::chat::chat,
        crate::routes::models::list_models
    ),
    components(
        schemas(
            ChatRequest,
            ChatResponse,
            ErrorResponse,
            DebugInfo,
            ModelInfo,
            ModelCatalog,
        )
    ),
    tags(
        (name = "Chat", description = "Relay endpoint"),
        (name = "Models", description = "Model catalog")
    )
)]
pub struct RelayApiDoc;
