//! Auth cookie handling
//!
//! The session credential travels in a single HTTP-only cookie. No
//! cookie-jar layer is involved; the header is parsed and built
//! directly, the same way the Authorization header is handled at the
//! API layer.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

/// Cookie name holding the admin token. Stable contract with any
/// client; changing it invalidates existing sessions.
pub const AUTH_COOKIE_NAME: &str = "admin_auth_token";

/// Extract a cookie value from the `Cookie` request header.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;

    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value)
        } else {
            None
        }
    })
}

/// Build the `Set-Cookie` value carrying a freshly issued token.
pub fn auth_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Max-Age={}; Path=/",
        AUTH_COOKIE_NAME, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that clears the auth cookie (empty
/// value, zero lifetime) so a stale credential is not retried.
pub fn clear_auth_cookie(secure: bool) -> String {
    auth_cookie("", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_cookie_value_single() {
        let headers = headers_with_cookie("admin_auth_token=abc123");
        assert_eq!(cookie_value(&headers, AUTH_COOKIE_NAME), Some("abc123"));
    }

    #[test]
    fn test_cookie_value_among_others() {
        let headers = headers_with_cookie("theme=dark; admin_auth_token=abc123; lang=en");
        assert_eq!(cookie_value(&headers, AUTH_COOKIE_NAME), Some("abc123"));
    }

    #[test]
    fn test_cookie_value_missing() {
        let headers = headers_with_cookie("theme=dark");
        assert_eq!(cookie_value(&headers, AUTH_COOKIE_NAME), None);
    }

    #[test]
    fn test_cookie_value_empty_is_none() {
        // A cleared cookie (empty value) must not count as a credential.
        let headers = headers_with_cookie("admin_auth_token=");
        assert_eq!(cookie_value(&headers, AUTH_COOKIE_NAME), None);
    }

    #[test]
    fn test_auth_cookie_flags() {
        let cookie = auth_cookie("tok", 86400, false);
        assert_eq!(
            cookie,
            "admin_auth_token=tok; HttpOnly; SameSite=Strict; Max-Age=86400; Path=/"
        );

        let secure = auth_cookie("tok", 86400, true);
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_auth_cookie() {
        let cookie = clear_auth_cookie(false);
        assert!(cookie.starts_with("admin_auth_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
