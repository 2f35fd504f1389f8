//! Permission set CRUD handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::api::{parse_id, ApiResult, AppJson, AppState, OrNoContent};
use crate::db;

use super::types::{
    CreatePermissionRequest, DeleteResponse, PermissionGroups, PermissionResponse,
};

/// List every permission set.
#[utoipa::path(
    get,
    path = "/admin/permissions",
    tag = "permissions",
    responses(
        (status = 200, description = "All permission sets", body = Vec<PermissionResponse>),
        (status = 401, description = "Caller does not hold the admin role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn list_permissions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = db::list_permissions(&state.db).await?;

    Ok(Json(
        permissions.into_iter().map(PermissionResponse::from).collect(),
    ))
}

/// Attach a permission set to a role. A role holds at most one.
#[utoipa::path(
    post,
    path = "/admin/permissions",
    tag = "permissions",
    request_body = CreatePermissionRequest,
    responses(
        (status = 200, description = "Permission set created", body = PermissionResponse),
        (status = 422, description = "Validation failed, unknown role, or role already has a set"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, body))]
pub async fn create_permission(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreatePermissionRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    body.validate()?;

    let CreatePermissionRequest { role_id, groups } = body;
    let role_id = role_id.unwrap_or_default();

    let permission = db::create_permission(&state.db, role_id, &groups.into_set()).await?;
    tracing::info!(
        permission_id = permission.id,
        role_id = permission.role_id,
        "Permission set created"
    );

    Ok(Json(PermissionResponse::from(permission)))
}

/// Get a permission set.
#[utoipa::path(
    get,
    path = "/admin/permissions/{id}",
    tag = "permissions",
    params(("id" = i32, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Permission set found", body = PermissionResponse),
        (status = 204, description = "No permission set with this ID"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn get_permission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OrNoContent<PermissionResponse>> {
    let Some(id) = parse_id(&id) else {
        return Ok(OrNoContent(None));
    };

    let permission = db::find_permission_by_id(&state.db, id).await?;

    Ok(permission.map(PermissionResponse::from).into())
}

/// Replace the four capability groups of a permission set.
#[utoipa::path(
    put,
    path = "/admin/permissions/{id}",
    tag = "permissions",
    params(("id" = i32, Path, description = "Permission ID")),
    request_body = PermissionGroups,
    responses(
        (status = 200, description = "Permission set updated", body = PermissionResponse),
        (status = 204, description = "No permission set with this ID"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, body))]
pub async fn update_permission(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<PermissionGroups>,
) -> ApiResult<OrNoContent<PermissionResponse>> {
    body.validate()?;

    let Some(id) = parse_id(&id) else {
        return Ok(OrNoContent(None));
    };

    let permission = db::update_permission(&state.db, id, &body.into_set()).await?;

    Ok(permission.map(PermissionResponse::from).into())
}

/// Delete a permission set.
#[utoipa::path(
    delete,
    path = "/admin/permissions/{id}",
    tag = "permissions",
    params(("id" = i32, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Permission set deleted", body = DeleteResponse),
        (status = 204, description = "No permission set with this ID"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn delete_permission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OrNoContent<DeleteResponse>> {
    let Some(id) = parse_id(&id) else {
        return Ok(OrNoContent(None));
    };

    let deleted = db::delete_permission(&state.db, id).await?;
    if deleted == 0 {
        return Ok(OrNoContent(None));
    }

    tracing::info!(permission_id = id, "Permission set deleted");
    Ok(OrNoContent(Some(DeleteResponse::new(deleted))))
}
