//! Server-rendered pages
//!
//! The admin UI proper ships separately; the server only provides a
//! placeholder login page so the guard has somewhere to redirect to.

use axum::{
    Router,
    response::{Html, IntoResponse},
    routing::get,
};

use crate::state::AppState;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
  <head><title>Admin Login</title></head>
  <body>
    <h1>Admin Login</h1>
    <form method="post" action="/api/auth/login">
      <input type="password" name="loginKey" placeholder="Login key" autofocus>
      <button type="submit">Sign in</button>
    </form>
  </body>
</html>
"#;

/// GET /login
async fn login_page() -> impl IntoResponse {
    Html(LOGIN_PAGE)
}

/// Create page routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/login", get(login_page))
}
