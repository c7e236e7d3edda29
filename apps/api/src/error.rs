//! Error types for the Carlot API.
//!
//! ## Boundary Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    HTTP Status Mapping                                  │
//! │                                                                         │
//! │  Validation (aggregated field map)  → 422 {"detail": {field: [..]}}    │
//! │  EmptyUpdate                        → 400                              │
//! │  NotFound                           → 404                              │
//! │  AuthDenied (expired/invalid/bad)   → 401                              │
//! │  Conflict (duplicate username)      → 409                              │
//! │  BadRequest (unreadable body)       → 400                              │
//! │  Upstream (store/media host down)   → 502                              │
//! │  Internal                           → 500 (detail withheld)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A malformed identifier folds into the 404 outcome here; the database
//! layer keeps the kinds distinct so logs still tell them apart.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;
use crate::media::MediaError;
use carlot_core::{CoreError, ValidationErrors};
use carlot_db::DbError;

/// API errors, as HTTP clients see them.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Per-field input failures, aggregated.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Update request carried no mutable fields.
    #[error("No fields provided for update")]
    EmptyUpdate,

    /// No document at the identifier (or the identifier was malformed).
    #[error("{0}")]
    NotFound(String),

    /// Expired or invalid credential, or bad login.
    #[error("{0}")]
    AuthDenied(String),

    /// Duplicate value (e.g. username already taken).
    #[error("{0}")]
    Conflict(String),

    /// Request body could not be read (e.g. broken multipart framing).
    #[error("{0}")]
    BadRequest(String),

    /// Document store or media host unavailable. Propagated, never retried.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Anything else. Detail is logged, not sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::EmptyUpdate | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AuthDenied(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = match &self {
            // Field map, not a string: clients get every failing field at once
            ApiError::Validation(errors) => json!(errors),
            ApiError::Internal(msg) => {
                error!(detail = %msg, "Internal server error");
                json!("internal server error")
            }
            // Like Internal: the raw upstream message is for logs, not clients
            ApiError::Upstream(msg) => {
                error!(detail = %msg, "Upstream failure");
                json!("upstream service unavailable")
            }
            other => json!(other.to_string()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => ApiError::Validation(errors),
            CoreError::EmptyUpdate => ApiError::EmptyUpdate,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} {id} not found"))
            }
            // A malformed key is presented as 404, same as an absent one
            DbError::InvalidId { id } => ApiError::NotFound(format!("{id} not found")),
            DbError::UniqueViolation { field, .. } => {
                ApiError::Conflict(format!("{field} already exists"))
            }
            DbError::ConnectionFailed(msg) | DbError::QueryFailed(msg) => ApiError::Upstream(msg),
            DbError::PoolExhausted => ApiError::Upstream("connection pool exhausted".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Hashing(msg) | AuthError::TokenCreation(msg) => ApiError::Internal(msg),
            denied => ApiError::AuthDenied(denied.to_string()),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let mut errors = ValidationErrors::new();
        errors.add("year", "must be between 1971 and 2024");

        assert_eq!(
            ApiError::Validation(errors).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::EmptyUpdate.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::AuthDenied("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Upstream("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_malformed_id_folds_to_not_found() {
        let err: ApiError = DbError::invalid_id("abc").into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err: ApiError = DbError::duplicate("users.username", "suchart").into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_empty_update_maps_from_core() {
        let err: ApiError = CoreError::EmptyUpdate.into();
        assert!(matches!(err, ApiError::EmptyUpdate));
    }

    #[tokio::test]
    async fn test_upstream_detail_withheld_from_body() {
        use http_body_util::BodyExt;

        let response =
            ApiError::Upstream("connection refused to 10.0.0.5:5432".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "upstream service unavailable");
    }

    #[tokio::test]
    async fn test_internal_detail_withheld_from_body() {
        use http_body_util::BodyExt;

        let response = ApiError::Internal("token signing key unreadable".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "internal server error");
    }
}
