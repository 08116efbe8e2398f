//! Casedesk authentication
//!
//! This crate provides the stateless admin session model: a JWT-based
//! token service (issue, authoritative verify, and a signature-free
//! expiry pre-check) plus the route guard middleware that gates page
//! and API access by path classification.

pub mod cookie;
pub mod error;
pub mod guard;
pub mod jwt;

pub use cookie::{AUTH_COOKIE_NAME, auth_cookie, clear_auth_cookie, cookie_value};
pub use error::AuthError;
pub use guard::{GuardOutcome, GuardSettings, RoutePolicy, route_guard};
pub use jwt::{ADMIN_SUBJECT, Claims, TOKEN_TTL_HOURS, TokenService, is_expired};
