//! Model catalog endpoint
//!
//! The models the chat front-end offers in its picker. The relay itself
//! forwards any model identifier; this list is informational.

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Model selected when the caller has not picked one
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Selectable models, most capable first
pub const MODELS: &[(&str, &str)] = &[
    ("claude-opus-4-5-20250514", "Claude Opus 4.5"),
    ("claude-opus-4-20250514", "Claude Opus 4"),
    ("claude-sonnet-4-20250514", "Claude Sonnet 4"),
    ("claude-sonnet-3-5-20241022", "Claude 3.5 Sonnet"),
    ("claude-haiku-3-5-20241022", "Claude 3.5 Haiku"),
];

/// Catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

/// Catalog response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelCatalog {
    pub default: String,
    pub models: Vec<ModelInfo>,
}

impl ModelCatalog {
    pub fn builtin() -> Self {
        Self {
            default: DEFAULT_MODEL.to_string(),
            models: MODELS
                .iter()
                .map(|(id, name)| ModelInfo {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}

/// List selectable models
#[utoipa::path(
    get,
    path = "/api/models",
    tag = "Models",
    responses((status = 200, description = "Selectable models", body = ModelCatalog))
)]
pub async fn list_models() -> Json<ModelCatalog> {
    Json(ModelCatalog::builtin())
}
