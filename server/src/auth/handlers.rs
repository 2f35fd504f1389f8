//! Authentication HTTP Handlers

use axum::{
    extract::{FromRequest, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::{AuthError, AuthResult};
use super::jwt::generate_access_token;
use super::password::verify_password;
use crate::api::AppState;
use crate::db::find_credentials_by_username;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username.
    #[schema(example = "admin")]
    pub username: String,
    /// Password.
    pub password: String,
}

/// Issued access token.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Signed access token.
    pub access_token: String,
    /// Token type (always "Bearer").
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// `Json` extractor whose rejection is an [`AuthError`] body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AuthError))]
pub struct AuthJson<T>(pub T);

// ============================================================================
// Handlers
// ============================================================================

/// Login with username and password.
///
/// Unknown usernames and wrong passwords are indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = super::error::ErrorResponse),
        (status = 422, description = "Malformed body", body = super::error::ErrorResponse),
    ),
)]
#[tracing::instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    AuthJson(body): AuthJson<LoginRequest>,
) -> AuthResult<Json<LoginResponse>> {
    let Some(credentials) = find_credentials_by_username(&state.db, &body.username).await? else {
        tracing::debug!(username = %body.username, "Login for unknown username");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(&body.password, &credentials.password).await? {
        tracing::debug!(user_id = credentials.id, "Login with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let token = generate_access_token(
        &credentials.username,
        &state.config.jwt_secret,
        state.config.jwt_access_expiry,
    )?;

    tracing::info!(user_id = credentials.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token: token.token,
        token_type: "Bearer".to_string(),
        expires_in: token.expires_in,
    }))
}
