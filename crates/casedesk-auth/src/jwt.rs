//! JWT token management
//!
//! Two tiers of checking live here. `TokenService::verify` is the fine
//! gate: full signature and expiry validation with the server secret.
//! `is_expired` is the coarse gate used by the route guard: it decodes
//! the claims without checking the signature, so it is cheap enough to
//! run on every request but is never a security boundary on its own.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// The single admin identity. There is no user database; every issued
/// token carries this subject.
pub const ADMIN_SUBJECT: &str = "admin";

/// Token lifetime in hours.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (always `admin`)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims shape used by the unverified expiry pre-check. `exp` is kept
/// optional so that a token missing the claim decodes and can be
/// treated as expired instead of erroring.
#[derive(Debug, Deserialize)]
struct UnverifiedClaims {
    exp: Option<i64>,
}

/// Token service for issuing and verifying the admin credential
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
}

impl TokenService {
    /// Create a new token service.
    ///
    /// Fails with [`AuthError::MissingSecret`] when the secret is
    /// empty, so a misconfigured deployment is caught at startup rather
    /// than surfacing as a bad-credential error at login time.
    pub fn new(secret: &str, ttl_hours: i64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        })
    }

    /// Token lifetime in seconds.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_hours * 3600
    }

    /// Token lifetime in milliseconds (the login response reports this).
    pub fn ttl_millis(&self) -> i64 {
        self.ttl_seconds() * 1000
    }

    /// Issue a signed admin token: sub = `admin`, iat = now,
    /// exp = now + TTL.
    pub fn issue(&self) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.ttl_hours);

        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        debug!("Issuing admin token, expires at {}", claims.exp);

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate signature and time claims, returning the decoded
    /// claims. All failures come back as error values; nothing here
    /// panics on attacker-controlled input.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })?;

        // Equal-to-expiry counts as expired, matching the coarse gate.
        let now = Utc::now().timestamp();
        if now >= token_data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}

/// Check whether a token is expired at `now`, without verifying the
/// signature. Fail-closed: malformed tokens and tokens with no `exp`
/// claim count as expired.
pub fn is_expired_at(token: &str, now: i64) -> bool {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    match decode::<UnverifiedClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => match data.claims.exp {
            Some(exp) => now >= exp,
            None => {
                debug!("Token has no expiration claim, treating as expired");
                true
            }
        },
        Err(e) => {
            debug!("Failed to decode token for expiry check: {}", e);
            true
        }
    }
}

/// Check whether a token is expired against the wall clock.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret-key", TOKEN_TTL_HOURS).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();

        let token = tokens.issue().unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, ADMIN_SUBJECT);
        assert_eq!(claims.exp, claims.iat + TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = TokenService::new("", TOKEN_TTL_HOURS);
        assert!(matches!(result, Err(AuthError::MissingSecret)));
    }

    #[test]
    fn test_verify_wrong_secret() {
        let token = service().issue().unwrap();

        let other = TokenService::new("a-different-secret", TOKEN_TTL_HOURS).unwrap();
        let result = other.verify(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_verify_malformed_token() {
        let result = service().verify("not-a-token");
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_is_expired_boundary() {
        let tokens = service();
        let token = tokens.issue().unwrap();
        let exp = tokens.verify(&token).unwrap().exp;

        // Strictly before expiry: live. At and after: expired.
        assert!(!is_expired_at(&token, exp - 1));
        assert!(is_expired_at(&token, exp));
        assert!(is_expired_at(&token, exp + 1));
    }

    #[test]
    fn test_is_expired_malformed() {
        assert!(is_expired_at("garbage", 0));
        assert!(is_expired_at("", 0));
        assert!(is_expired_at("a.b.c", 0));
    }

    #[test]
    fn test_is_expired_missing_exp_claim() {
        // A structurally valid token with no exp claim is treated as
        // expired rather than living forever.
        let claims = serde_json::json!({ "sub": ADMIN_SUBJECT });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(is_expired_at(&token, 0));
    }

    #[test]
    fn test_fresh_token_not_expired() {
        let token = service().issue().unwrap();
        assert!(!is_expired(&token));
    }
}
