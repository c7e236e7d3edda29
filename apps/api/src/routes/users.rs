//! User account endpoints: register, login, whoami.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::auth::{hash_password, verify_password, AuthError, CurrentUser};
use crate::error::ApiError;
use crate::state::AppState;
use carlot_core::types::{Credentials, User};
use carlot_core::validation::validate_credentials;

/// User routes, nested under `/users`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Successful register/login payload.
#[derive(Debug, Serialize)]
struct AuthResponse {
    user: User,
    access_token: String,
    token_type: &'static str,
    expires_in: i64,
}

impl AuthResponse {
    fn issue(state: &AppState, user: User) -> Result<Self, ApiError> {
        let access_token = state.jwt.generate_token(&user.id)?;
        Ok(AuthResponse {
            user,
            access_token,
            token_type: "Bearer",
            expires_in: state.jwt.lifetime_secs(),
        })
    }
}

/// POST /users/register - create an account and sign the caller in.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validate_credentials(&credentials)?;

    let hash = hash_password(&credentials.password)?;
    let user = state.db.users().insert(&credentials.username, &hash).await?;

    info!(username = %user.username, "User registered");
    let response = AuthResponse::issue(&state, user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /users/login - exchange credentials for a bearer token.
///
/// An unknown username and a wrong password produce the same answer.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .db
        .users()
        .find_by_username(&credentials.username)
        .await?
        .ok_or(AuthError::BadCredentials)?;

    if !verify_password(&credentials.password, &user.password_hash)? {
        return Err(AuthError::BadCredentials.into());
    }

    info!(username = %user.username, "User logged in");
    let response = AuthResponse::issue(&state, user)?;
    Ok(Json(response))
}

/// GET /users/me - the account behind the presented token.
async fn me(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<User>, ApiError> {
    let user = state
        .db
        .users()
        .find_by_id(&user.user_id)
        .await?
        // Token subject no longer exists; treat the credential as invalid
        .ok_or(AuthError::Invalid)?;

    Ok(Json(user))
}
