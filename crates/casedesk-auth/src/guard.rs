//! Route guard middleware
//!
//! Classifies every inbound path against static public/protected route
//! tables and redirects unauthenticated access to the login page. The
//! guard only runs the signature-free expiry pre-check ([`is_expired_at`]);
//! it never verifies signatures and never performs I/O. Authoritative
//! verification happens at the API handlers behind it.

use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::debug;

use crate::cookie::{AUTH_COOKIE_NAME, clear_auth_cookie, cookie_value};
use crate::jwt::is_expired_at;

/// Routes that require a live session.
pub const PROTECTED_ROUTES: &[&str] = &["/", "/case-studies/*", "/api/case-study/*"];

/// Routes reachable without a session.
pub const PUBLIC_ROUTES: &[&str] = &["/login", "/api/auth/login", "/api/auth/verify"];

/// Per-request guard decision. Every request resolves to one of these;
/// the guard has no error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Pass the request through unmodified.
    Allow,
    /// Authenticated user on the login page: send them home.
    RedirectHome,
    /// Protected route without a usable session: send to login.
    /// `clear_cookie` is set when a stale cookie should be overwritten
    /// in the redirect response.
    RedirectLogin { clear_cookie: bool },
}

/// Static route classification tables. Defined at process start,
/// immutable thereafter.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    pub public: &'static [&'static str],
    pub protected: &'static [&'static str],
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            public: PUBLIC_ROUTES,
            protected: PROTECTED_ROUTES,
        }
    }
}

impl RoutePolicy {
    /// Classify a request. Pure function of the path, the cookie value,
    /// and the clock, evaluated in fixed priority order.
    pub fn classify(&self, path: &str, cookie: Option<&str>, now: i64) -> GuardOutcome {
        // Internal assets and the auth endpoints bypass the guard
        // entirely, whatever the cookie state.
        if is_excluded(path) {
            return GuardOutcome::Allow;
        }

        let authenticated = cookie.is_some_and(|token| !is_expired_at(token, now));

        // Authenticated users have no business on the login page.
        if path == "/login" {
            if authenticated {
                return GuardOutcome::RedirectHome;
            }
            return GuardOutcome::Allow;
        }

        if matches_route(path, self.public) {
            return GuardOutcome::Allow;
        }

        // Unlisted routes fall through open. Inherited default-allow:
        // new protected surfaces must be added to PROTECTED_ROUTES.
        if !matches_route(path, self.protected) {
            return GuardOutcome::Allow;
        }

        match cookie {
            None => GuardOutcome::RedirectLogin {
                clear_cookie: false,
            },
            Some(token) => {
                if is_expired_at(token, now) {
                    GuardOutcome::RedirectLogin { clear_cookie: true }
                } else {
                    GuardOutcome::Allow
                }
            }
        }
    }
}

/// Internal-asset and auth-issuance paths that skip classification.
fn is_excluded(path: &str) -> bool {
    path.starts_with("/assets/")
        || path.starts_with("/api/auth")
        || path == "/favicon.ico"
        || path.starts_with("/public/")
}

/// Match a path against route patterns. A trailing `/*` matches by
/// prefix on the base; anything else requires exact equality.
fn matches_route(path: &str, routes: &[&str]) -> bool {
    routes.iter().any(|route| {
        if let Some(base) = route.strip_suffix("/*") {
            path.starts_with(base)
        } else {
            path == *route
        }
    })
}

/// Guard settings shared with the middleware.
#[derive(Debug, Clone)]
pub struct GuardSettings {
    /// Mark cleared cookies `Secure` (production deployments).
    pub cookie_secure: bool,
}

/// Route guard middleware.
///
/// Wraps the whole router; converts the [`RoutePolicy`] decision into a
/// pass-through or a temporary redirect. Clearing the cookie on an
/// expired session keeps the client from retrying the stale value.
pub async fn route_guard(
    State(settings): State<GuardSettings>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let cookie = cookie_value(request.headers(), AUTH_COOKIE_NAME).map(str::to_owned);

    let policy = RoutePolicy::default();
    match policy.classify(&path, cookie.as_deref(), Utc::now().timestamp()) {
        GuardOutcome::Allow => next.run(request).await,
        GuardOutcome::RedirectHome => {
            debug!("Authenticated request to /login, redirecting home");
            Redirect::temporary("/").into_response()
        }
        GuardOutcome::RedirectLogin { clear_cookie } => {
            debug!("Unauthenticated request to {}, redirecting to login", path);
            let mut response = Redirect::temporary("/login").into_response();
            if clear_cookie {
                if let Ok(value) = clear_auth_cookie(settings.cookie_secure).parse() {
                    response.headers_mut().insert(SET_COOKIE, value);
                }
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{TOKEN_TTL_HOURS, TokenService};
    use axum::http::StatusCode;
    use axum::http::header::{COOKIE, LOCATION};
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::util::ServiceExt;

    const NOW: i64 = 1_700_000_000;

    fn policy() -> RoutePolicy {
        RoutePolicy::default()
    }

    fn live_token() -> String {
        TokenService::new("guard-test-secret", TOKEN_TTL_HOURS)
            .unwrap()
            .issue()
            .unwrap()
    }

    fn expired_token() -> String {
        // TTL of zero hours puts exp == iat, which the boundary rule
        // already counts as expired.
        TokenService::new("guard-test-secret", 0)
            .unwrap()
            .issue()
            .unwrap()
    }

    #[test]
    fn test_excluded_paths_always_allowed() {
        for path in ["/api/auth/login", "/api/auth/verify", "/favicon.ico", "/assets/app.css", "/public/logo.png"] {
            assert_eq!(policy().classify(path, None, NOW), GuardOutcome::Allow);
            let expired = expired_token();
            assert_eq!(
                policy().classify(path, Some(&expired), NOW),
                GuardOutcome::Allow
            );
        }
    }

    #[test]
    fn test_login_page_without_cookie_allowed() {
        assert_eq!(policy().classify("/login", None, NOW), GuardOutcome::Allow);
    }

    #[test]
    fn test_login_page_with_valid_cookie_redirects_home() {
        let token = live_token();
        assert_eq!(
            policy().classify("/login", Some(&token), Utc::now().timestamp()),
            GuardOutcome::RedirectHome
        );
    }

    #[test]
    fn test_login_page_with_expired_cookie_allowed() {
        let token = expired_token();
        assert_eq!(
            policy().classify("/login", Some(&token), Utc::now().timestamp()),
            GuardOutcome::Allow
        );
    }

    #[test]
    fn test_protected_wildcard_without_cookie() {
        assert_eq!(
            policy().classify("/case-studies/42", None, NOW),
            GuardOutcome::RedirectLogin {
                clear_cookie: false
            }
        );
    }

    #[test]
    fn test_protected_route_with_expired_cookie_clears_it() {
        let token = expired_token();
        assert_eq!(
            policy().classify("/case-studies/42", Some(&token), Utc::now().timestamp()),
            GuardOutcome::RedirectLogin { clear_cookie: true }
        );
    }

    #[test]
    fn test_protected_route_with_valid_cookie() {
        let token = live_token();
        assert_eq!(
            policy().classify("/", Some(&token), Utc::now().timestamp()),
            GuardOutcome::Allow
        );
    }

    #[test]
    fn test_unlisted_route_default_allow() {
        // Inherited open-fail: paths in neither table pass through.
        assert_eq!(policy().classify("/about", None, NOW), GuardOutcome::Allow);
        assert_eq!(
            policy().classify("/api/stats", None, NOW),
            GuardOutcome::Allow
        );
    }

    #[test]
    fn test_token_expired_exactly_at_ttl() {
        let tokens = TokenService::new("guard-test-secret", TOKEN_TTL_HOURS).unwrap();
        let token = tokens.issue().unwrap();
        let exp = tokens.verify(&token).unwrap().exp;

        assert_eq!(
            policy().classify("/case-studies/42", Some(&token), exp - 1),
            GuardOutcome::Allow
        );
        assert_eq!(
            policy().classify("/case-studies/42", Some(&token), exp),
            GuardOutcome::RedirectLogin { clear_cookie: true }
        );
    }

    #[test]
    fn test_matches_route_patterns() {
        assert!(matches_route("/case-studies/42", PROTECTED_ROUTES));
        assert!(matches_route("/api/case-study/42", PROTECTED_ROUTES));
        assert!(matches_route("/", PROTECTED_ROUTES));
        assert!(!matches_route("/health", PROTECTED_ROUTES));
        assert!(matches_route("/login", PUBLIC_ROUTES));
        assert!(!matches_route("/login/extra", PUBLIC_ROUTES));
    }

    fn guarded_app() -> Router {
        let settings = GuardSettings {
            cookie_secure: false,
        };
        Router::new()
            .route("/", get(|| async { "home" }))
            .route("/login", get(|| async { "login" }))
            .layer(middleware::from_fn_with_state(settings, route_guard))
    }

    #[tokio::test]
    async fn test_middleware_redirects_to_login() {
        let response = guarded_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_middleware_clears_expired_cookie() {
        let cookie = format!("{}={}", AUTH_COOKIE_NAME, expired_token());
        let response = guarded_app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/login");
        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("admin_auth_token=;"));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_middleware_allows_valid_session() {
        let cookie = format!("{}={}", AUTH_COOKIE_NAME, live_token());
        let response = guarded_app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
