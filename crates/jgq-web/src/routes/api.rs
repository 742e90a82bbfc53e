//! JSON API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use jgq_core::models::model_catalog;
use jgq_core::schema::GraphSchema;
use jgq_core::{ModelSelection, Question, QuestionState};

use super::{error_chain, status_for};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub cypher_model: Option<ModelSelection>,
    #[serde(default)]
    pub qa_model: Option<ModelSelection>,
    /// Skip routing and refinement.
    #[serde(default)]
    pub direct: bool,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub text: String,
    pub schema: GraphSchema,
}

#[derive(Debug, Serialize)]
pub struct ModelEntry {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub catalog: Vec<ModelEntry>,
    pub defaults: jgq_core::RoleModels,
}

/// POST /api/ask - Answer a question.
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<QuestionState>, (StatusCode, String)> {
    let question = Question::new(&req.question).map_err(|e| (status_for(&e), error_chain(&e)))?;

    let workflow = state
        .workflow(req.cypher_model, req.qa_model)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)))?;

    let result = if req.direct {
        workflow.handle_direct(question.as_str()).await
    } else {
        workflow.handle_query(question.as_str()).await
    };

    result.map(Json).map_err(|e| {
        warn!(error = %e, "Question failed");
        (status_for(&e), error_chain(&e))
    })
}

/// GET /api/schema - The schema snapshot.
pub async fn schema(State(state): State<AppState>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        text: state.schema.to_prompt_text(),
        schema: state.schema.as_ref().clone(),
    })
}

/// GET /api/models - Selectable models and the configured defaults.
pub async fn models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let catalog = model_catalog()
        .into_iter()
        .map(|m| ModelEntry {
            value: m.to_string(),
            label: m.label(),
        })
        .collect();

    Json(ModelsResponse {
        catalog,
        defaults: state.config.models.clone(),
    })
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
