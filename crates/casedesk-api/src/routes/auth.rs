//! Session API routes
//!
//! Login exchanges the shared admin key for a signed token, delivered
//! both in the response body and as an HTTP-only cookie. `verify` is the
//! cookie-only session probe the admin UI polls; mutations instead go
//! through the [`RequireAuth`] extractor, which also accepts a bearer
//! header for non-browser clients.

use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{HeaderMap, header::SET_COOKIE, request::Parts},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use casedesk_auth::{AUTH_COOKIE_NAME, auth_cookie, clear_auth_cookie, cookie_value, jwt::Claims};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

// ==================== Types ====================

/// Login request. The key is optional so a body without it reports a
/// key mismatch instead of a serde rejection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_key: Option<String>,
}

/// Login response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    /// Token lifetime in milliseconds
    pub expires_in: i64,
}

/// Verified session user
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedUser {
    pub user_id: String,
}

/// Verify response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    pub user: VerifiedUser,
    /// Absolute expiry in milliseconds since the epoch
    pub expires_at: i64,
}

/// Plain success response
#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

// ==================== Extractor ====================

/// Extractor that admits a request only with a cryptographically valid
/// admin token, taken from the auth cookie or a bearer header. This is
/// the fine gate behind the route guard's unverified pre-check.
pub struct RequireAuth(pub Claims);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = request_token(&parts.headers).ok_or(ApiError::Unauthorized)?;

        let claims = state.tokens.verify(&token).map_err(|e| {
            debug!("Rejected mutation credential: {}", e);
            ApiError::Unauthorized
        })?;

        Ok(RequireAuth(claims))
    }
}

/// Pull the admin token out of a request: cookie first, then
/// `Authorization: Bearer`.
fn request_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = cookie_value(headers, AUTH_COOKIE_NAME) {
        return Some(token.to_string());
    }

    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

// ==================== Handlers ====================

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if state.auth.login_key.is_empty() {
        warn!("Login attempted but no login key is configured");
        return Err(ApiError::Configuration);
    }

    if request.login_key.as_deref() != Some(state.auth.login_key.as_str()) {
        debug!("Login rejected: key mismatch");
        return Err(ApiError::InvalidLoginKey);
    }

    let token = state.tokens.issue()?;

    info!("Admin logged in");

    let cookie = auth_cookie(&token, state.tokens.ttl_seconds(), state.auth.cookie_secure);
    let body = Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        expires_in: state.tokens.ttl_millis(),
    });

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), body))
}

/// GET /api/auth/verify
async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, ApiError> {
    // Cookie only: this endpoint reports on the browser session, so a
    // bearer header is deliberately not accepted here.
    let token =
        cookie_value(&headers, AUTH_COOKIE_NAME).ok_or(casedesk_auth::AuthError::MissingToken)?;

    let claims = state.tokens.verify(token)?;

    Ok(Json(VerifyResponse {
        success: true,
        message: "Token is valid".to_string(),
        user: VerifiedUser {
            user_id: claims.sub,
        },
        expires_at: claims.exp * 1000,
    }))
}

/// POST /api/auth/logout
async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Admin logged out");

    let cookie = clear_auth_cookie(state.auth.cookie_secure);
    let body = Json(StatusResponse {
        success: true,
        message: "Logged out successfully".to_string(),
    });

    (AppendHeaders([(SET_COOKIE, cookie)]), body)
}

// ==================== Routes ====================

/// Create session routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", get(verify))
        .route("/api/auth/logout", post(logout))
}
