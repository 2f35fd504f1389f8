//! User CRUD handlers.
//!
//! Passwords are validated, then bcrypt-hashed; only the hash is persisted and
//! no response ever carries it.

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::api::{parse_id, ApiResult, AppJson, AppState, OrNoContent};
use crate::auth::password::hash_password;
use crate::db::{self, UserWrite};

use super::types::{DeleteResponse, UserRequest, UserResponse};

/// List every user with role and permission set.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Caller does not hold the admin role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = db::list_users_with_roles(&state.db).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "users",
    request_body = UserRequest,
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 422, description = "Validation failed, duplicate username or email, or unknown role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(body): AppJson<UserRequest>,
) -> ApiResult<OrNoContent<UserResponse>> {
    body.validate()?;

    let password_hash = hash_password(&body.password).await?;
    let user = db::create_user(&state.db, &user_write(&body, &password_hash)).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User created");

    let user = db::find_user_with_role(&state.db, user.id).await?;

    Ok(user.map(UserResponse::from).into())
}

/// Get a user with role and permission set.
#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 204, description = "No user with this ID"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OrNoContent<UserResponse>> {
    let Some(id) = parse_id(&id) else {
        return Ok(OrNoContent(None));
    };

    let user = db::find_user_with_role(&state.db, id).await?;

    Ok(user.map(UserResponse::from).into())
}

/// Overwrite a user. The submitted password is hashed before it is stored.
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 204, description = "No user with this ID"),
        (status = 422, description = "Validation failed, duplicate username or email, or unknown role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<UserRequest>,
) -> ApiResult<OrNoContent<UserResponse>> {
    body.validate()?;

    let Some(id) = parse_id(&id) else {
        return Ok(OrNoContent(None));
    };

    // Skip the bcrypt round for ids that address nothing
    if !db::user_exists(&state.db, id).await? {
        return Ok(OrNoContent(None));
    }

    let password_hash = hash_password(&body.password).await?;
    if db::update_user(&state.db, id, &user_write(&body, &password_hash))
        .await?
        .is_none()
    {
        return Ok(OrNoContent(None));
    }
    tracing::info!(user_id = id, "User updated");

    let user = db::find_user_with_role(&state.db, id).await?;

    Ok(user.map(UserResponse::from).into())
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = DeleteResponse),
        (status = 204, description = "No user with this ID"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OrNoContent<DeleteResponse>> {
    let Some(id) = parse_id(&id) else {
        return Ok(OrNoContent(None));
    };

    let deleted = db::delete_user(&state.db, id).await?;
    if deleted == 0 {
        return Ok(OrNoContent(None));
    }

    tracing::info!(user_id = id, "User deleted");
    Ok(OrNoContent(Some(DeleteResponse::new(deleted))))
}

/// Build the write row from a validated request.
fn user_write<'a>(body: &'a UserRequest, password_hash: &'a str) -> UserWrite<'a> {
    UserWrite {
        username: &body.username,
        password_hash,
        email: &body.email,
        role_id: body.role_id.unwrap_or_default(),
    }
}
