//! Casedesk HTTP API
//!
//! The REST surface over the case-study store: session endpoints,
//! CRUD with multipart image uploads, the public listing, and health.
//! The route guard from `casedesk-auth` wraps the whole router.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, AuthSettings};
