//! Chat handler
//!
//! Runs the full query pipeline and always returns an answer-shaped body;
//! retrieval and generation failures surface as refusal or error-text
//! answers, never as a 5xx with a stack trace.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

use crate::AppState;
use ragline_common::{
    errors::{AppError, Result},
    metrics::RequestMetrics,
    types::ConversationTurn,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 1000))]
    pub query: String,

    /// Prior turns of this session, oldest first
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub answer: String,
    pub sources: Vec<String>,
    pub context_used: usize,
    pub processing_time_ms: u64,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let start = Instant::now();
    let metrics = RequestMetrics::start("POST", "/chat");

    if let Err(e) = request.validate() {
        metrics.finish(400);
        return Err(AppError::Validation {
            message: e.to_string(),
            field: Some("query".to_string()),
        });
    }

    let history: Vec<ConversationTurn> = request.history;
    let outcome = state.engine.answer(&request.query, &history).await;

    metrics.finish(200);
    Ok(Json(ChatResponse {
        success: true,
        answer: outcome.answer.text(),
        sources: outcome.sources,
        context_used: outcome.context_used,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}
