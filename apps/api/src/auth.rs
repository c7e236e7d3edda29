//! JWT authentication module.
//!
//! Handles token generation/validation, bearer extraction, and password
//! hashing. The token verifier distinguishes an expired credential from an
//! invalid one; both surface as an authentication-denied outcome.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

/// Authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Missing bearer credential")]
    Missing,

    #[error("Invalid username or password")]
    BadCredentials,

    /// Hashing machinery failed; not a client problem.
    #[error("credential hashing failed: {0}")]
    Hashing(String),

    /// Token signing failed; not a client problem.
    #[error("token creation failed: {0}")]
    TokenCreation(String),
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Generate a bearer token for a user.
    pub fn generate_token(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate and decode a token.
    ///
    /// ## Errors
    /// * `AuthError::Expired` - Signature is fine but the token has lapsed
    /// * `AuthError::Invalid` - Anything else (bad signature, garbage input)
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid,
        })?;

        Ok(token_data.claims)
    }

    /// Token lifetime in seconds, for response bodies.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }
}

/// Extract bearer token from an authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password with argon2 into PHC string format.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verifies a password against a stored argon2 hash.
///
/// Returns `Ok(false)` for a wrong password; errors only when the stored
/// hash itself is unusable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hashing(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hashing(e.to_string())),
    }
}

// =============================================================================
// Request Extractor
// =============================================================================

/// The authenticated caller, extracted from the Authorization header.
///
/// ## Usage
/// ```rust,ignore
/// async fn create_car(user: CurrentUser, ...) -> Result<..., ApiError> {
///     // user.user_id is the verified token subject
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::Missing)?;

        let token = extract_bearer_token(header).ok_or(AuthError::Missing)?;
        let claims = state.jwt.validate_token(token)?;

        Ok(CurrentUser {
            user_id: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let token = manager.generate_token("user-001").unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user-001");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_reports_expired() {
        // Already lapsed at issue time; leeway is 60s by default, go past it
        let manager = JwtManager::new("test-secret".to_string(), -120);

        let token = manager.generate_token("user-001").unwrap();
        assert!(matches!(
            manager.validate_token(&token),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_wrong_secret_reports_invalid() {
        let issuer = JwtManager::new("secret-a".to_string(), 3600);
        let verifier = JwtManager::new("secret-b".to_string(), 3600);

        let token = issuer.generate_token("user-001").unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(AuthError::Invalid)
        ));
    }

    #[test]
    fn test_garbage_token_reports_invalid() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);
        assert!(matches!(
            manager.validate_token("not.a.token"),
            Err(AuthError::Invalid)
        ));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token(""), None);
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2").unwrap();

        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_unusable_stored_hash_errors() {
        assert!(matches!(
            verify_password("hunter2", "not-a-phc-string"),
            Err(AuthError::Hashing(_))
        ));
    }
}
