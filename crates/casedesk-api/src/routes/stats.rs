//! Dashboard statistics

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Stats response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_case_studies: i64,
}

/// GET /api/stats
async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let total = state.db.count_case_studies().await?;

    Ok(Json(StatsResponse {
        total_case_studies: total,
    }))
}

/// Create stats routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/stats", get(stats))
}
