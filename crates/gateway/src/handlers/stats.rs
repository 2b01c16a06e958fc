//! Index statistics handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use ragline_common::errors::Result;

#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub total_vectors: usize,
    pub dimension: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.store.stats().await?;

    Ok(Json(StatsResponse {
        success: true,
        total_vectors: stats.count,
        dimension: stats.dimension,
        index_name: state.config.vector_store.index_name.clone(),
    }))
}
