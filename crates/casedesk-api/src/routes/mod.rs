//! API routes

pub mod auth;
mod case_studies;
mod health;
mod pages;
mod stats;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use casedesk_auth::{GuardSettings, route_guard};
use serde_json::json;

use crate::state::AppState;

/// Fallback for unmatched paths: JSON 404 rather than an empty body.
async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Not found" })),
    )
        .into_response()
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    let guard = GuardSettings {
        cookie_secure: state.auth.cookie_secure,
    };

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(case_studies::routes())
        .merge(stats::routes())
        .merge(pages::routes())
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(guard, route_guard))
        // Three images at 5MB plus the text fields fit comfortably.
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
}
