//! Role CRUD handlers.
//!
//! Roles are served with their permission set embedded, when one exists.

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::api::{parse_id, ApiResult, AppJson, AppState, OrNoContent};
use crate::db;

use super::types::{DeleteResponse, RoleRequest, RoleResponse};

/// List every role with its permission set.
#[utoipa::path(
    get,
    path = "/admin/roles",
    tag = "roles",
    responses(
        (status = 200, description = "All roles", body = Vec<RoleResponse>),
        (status = 401, description = "Caller does not hold the admin role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn list_roles(State(state): State<AppState>) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = db::list_roles_with_permissions(&state.db).await?;

    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// Create a role.
#[utoipa::path(
    post,
    path = "/admin/roles",
    tag = "roles",
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role created", body = RoleResponse),
        (status = 422, description = "Validation failed or role name taken"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, body))]
pub async fn create_role(
    State(state): State<AppState>,
    AppJson(body): AppJson<RoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    body.validate()?;

    let role = db::create_role(&state.db, &body.role, body.description.as_deref()).await?;
    tracing::info!(role_id = role.id, role = %role.role, "Role created");

    Ok(Json(RoleResponse::from(role)))
}

/// Get a role with its permission set.
#[utoipa::path(
    get,
    path = "/admin/roles/{id}",
    tag = "roles",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role found", body = RoleResponse),
        (status = 204, description = "No role with this ID"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OrNoContent<RoleResponse>> {
    let Some(id) = parse_id(&id) else {
        return Ok(OrNoContent(None));
    };

    let role = db::find_role_with_permission(&state.db, id).await?;

    Ok(role.map(RoleResponse::from).into())
}

/// Update a role. An absent description keeps the stored one.
#[utoipa::path(
    put,
    path = "/admin/roles/{id}",
    tag = "roles",
    params(("id" = i32, Path, description = "Role ID")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleResponse),
        (status = 204, description = "No role with this ID"),
        (status = 422, description = "Validation failed or role name taken"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, body))]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<RoleRequest>,
) -> ApiResult<OrNoContent<RoleResponse>> {
    body.validate()?;

    let Some(id) = parse_id(&id) else {
        return Ok(OrNoContent(None));
    };

    if db::update_role(&state.db, id, &body.role, body.description.as_deref())
        .await?
        .is_none()
    {
        return Ok(OrNoContent(None));
    }

    let role = db::find_role_with_permission(&state.db, id).await?;

    Ok(role.map(RoleResponse::from).into())
}

/// Delete a role. Its permission set goes with it; users still holding it
/// block the delete.
#[utoipa::path(
    delete,
    path = "/admin/roles/{id}",
    tag = "roles",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role deleted", body = DeleteResponse),
        (status = 204, description = "No role with this ID"),
        (status = 422, description = "Role still referenced by users"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OrNoContent<DeleteResponse>> {
    let Some(id) = parse_id(&id) else {
        return Ok(OrNoContent(None));
    };

    let deleted = db::delete_role(&state.db, id).await?;
    if deleted == 0 {
        return Ok(OrNoContent(None));
    }

    tracing::info!(role_id = id, "Role deleted");
    Ok(OrNoContent(Some(DeleteResponse::new(deleted))))
}
