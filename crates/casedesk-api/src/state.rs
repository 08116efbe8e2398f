//! Application state

use casedesk_auth::jwt::TokenService;
use casedesk_core::ListingCache;
use casedesk_db::Database;
use casedesk_storage::ImageStore;
use std::sync::Arc;

/// Authentication settings shared across handlers
#[derive(Clone)]
pub struct AuthSettings {
    /// The single admin login key. Empty means the deployment is
    /// misconfigured; login reports a server error rather than 401.
    pub login_key: String,
    /// Whether issued cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub images: Arc<dyn ImageStore>,
    pub tokens: Arc<TokenService>,
    pub listing: Arc<ListingCache>,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(
        db: Database,
        images: Arc<dyn ImageStore>,
        tokens: Arc<TokenService>,
        listing: Arc<ListingCache>,
        auth: AuthSettings,
    ) -> Self {
        Self {
            db,
            images,
            tokens,
            listing,
            auth,
        }
    }
}
