//! User-facing routes, guarded by the `user` role.

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::{not_found, AppState};
use crate::auth::{require_role, AuthUser, RoleGuard};

/// Role scope guarding this router.
pub const USER_SCOPE: &str = "user";

/// Profile payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    #[schema(example = "user profile")]
    pub info: String,
}

/// Profile of the calling user.
#[utoipa::path(
    get,
    path = "/user/profile",
    tag = "user",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Caller does not hold the user role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(auth_user), fields(user_id = auth_user.id))]
pub async fn get_profile(auth_user: AuthUser) -> Json<ProfileResponse> {
    tracing::debug!(username = %auth_user.username, "Profile requested");

    Json(ProfileResponse {
        info: "user profile".to_string(),
    })
}

/// Create the user router.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        // Unmatched paths under the prefix are guarded too.
        .fallback(not_found)
        .layer(from_fn_with_state(
            RoleGuard::new(state, USER_SCOPE),
            require_role,
        ))
}
