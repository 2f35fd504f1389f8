//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! Reads log failures through `db_error!`. Writes return the raw error so the
//! API layer can classify constraint violations.
//! Relations are resolved with explicit joins; nothing is lazily loaded.

use sqlx::types::Json;
use sqlx::PgPool;
use tracing::error;

use super::models::{
    Permission, Role, RoleWithPermissionRow, User, UserCredentials, UserWithRoleRow, UserWrite,
};
use crate::permissions::PermissionSet;

/// Log and return a database error with the query name and key fields.
macro_rules! db_error {
    ($query:expr) => {
        |e| {
            error!(query = $query, error = %e, "Database query failed");
            e
        }
    };
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

const ROLE_WITH_PERMISSION_SELECT: &str = r"
    SELECT r.id, r.role, r.description,
           p.id AS permission_id, p.store, p.member, p.package, p.billing
    FROM roles r
    LEFT JOIN permissions p ON p.role_id = r.id
";

const USER_WITH_ROLE_SELECT: &str = r"
    SELECT u.id, u.role_id, u.username, u.email,
           r.role, r.description AS role_description,
           p.id AS permission_id, p.store, p.member, p.package, p.billing
    FROM users u
    JOIN roles r ON r.id = u.role_id
    LEFT JOIN permissions p ON p.role_id = r.id
";

// ============================================================================
// Role Queries
// ============================================================================

/// List every role with its permission set, if any.
pub async fn list_roles_with_permissions(
    pool: &PgPool,
) -> sqlx::Result<Vec<(Role, Option<Permission>)>> {
    let rows = sqlx::query_as::<_, RoleWithPermissionRow>(&format!(
        "{ROLE_WITH_PERMISSION_SELECT} ORDER BY r.id"
    ))
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_roles_with_permissions"))?;

    Ok(rows.into_iter().map(RoleWithPermissionRow::into_parts).collect())
}

/// Find a role by ID together with its permission set.
pub async fn find_role_with_permission(
    pool: &PgPool,
    id: i32,
) -> sqlx::Result<Option<(Role, Option<Permission>)>> {
    let row = sqlx::query_as::<_, RoleWithPermissionRow>(&format!(
        "{ROLE_WITH_PERMISSION_SELECT} WHERE r.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_role_with_permission", role_id = id))?;

    Ok(row.map(RoleWithPermissionRow::into_parts))
}

/// Find a role by its unique name.
pub async fn find_role_by_name(pool: &PgPool, name: &str) -> sqlx::Result<Option<Role>> {
    sqlx::query_as::<_, Role>("SELECT id, role, description FROM roles WHERE role = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_role_by_name", role = %name))
}

/// Create a new role.
pub async fn create_role(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
) -> sqlx::Result<Role> {
    sqlx::query_as::<_, Role>(
        r"
        INSERT INTO roles (role, description)
        VALUES ($1, $2)
        RETURNING id, role, description
        ",
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

/// Update a role. A `None` description leaves the stored one unchanged.
///
/// Returns `None` when no role has this ID.
pub async fn update_role(
    pool: &PgPool,
    id: i32,
    name: &str,
    description: Option<&str>,
) -> sqlx::Result<Option<Role>> {
    sqlx::query_as::<_, Role>(
        r"
        UPDATE roles
        SET role = $1, description = COALESCE($2, description)
        WHERE id = $3
        RETURNING id, role, description
        ",
    )
    .bind(name)
    .bind(description)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete a role. Returns the number of rows removed.
pub async fn delete_role(pool: &PgPool, id: i32) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// ============================================================================
// Permission Queries
// ============================================================================

/// List every permission row.
pub async fn list_permissions(pool: &PgPool) -> sqlx::Result<Vec<Permission>> {
    sqlx::query_as::<_, Permission>(
        "SELECT id, role_id, store, member, package, billing FROM permissions ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_permissions"))
}

/// Find a permission row by ID.
pub async fn find_permission_by_id(pool: &PgPool, id: i32) -> sqlx::Result<Option<Permission>> {
    sqlx::query_as::<_, Permission>(
        "SELECT id, role_id, store, member, package, billing FROM permissions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_permission_by_id", permission_id = id))
}

/// Attach a permission set to a role.
pub async fn create_permission(
    pool: &PgPool,
    role_id: i32,
    set: &PermissionSet,
) -> sqlx::Result<Permission> {
    sqlx::query_as::<_, Permission>(
        r"
        INSERT INTO permissions (role_id, store, member, package, billing)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, role_id, store, member, package, billing
        ",
    )
    .bind(role_id)
    .bind(Json(&set.store))
    .bind(Json(&set.member))
    .bind(Json(&set.package))
    .bind(Json(&set.billing))
    .fetch_one(pool)
    .await
}

/// Replace the capability groups of a permission row.
///
/// Returns `None` when no row has this ID.
pub async fn update_permission(
    pool: &PgPool,
    id: i32,
    set: &PermissionSet,
) -> sqlx::Result<Option<Permission>> {
    sqlx::query_as::<_, Permission>(
        r"
        UPDATE permissions
        SET store = $1, member = $2, package = $3, billing = $4
        WHERE id = $5
        RETURNING id, role_id, store, member, package, billing
        ",
    )
    .bind(Json(&set.store))
    .bind(Json(&set.member))
    .bind(Json(&set.package))
    .bind(Json(&set.billing))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete a permission row. Returns the number of rows removed.
pub async fn delete_permission(pool: &PgPool, id: i32) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// ============================================================================
// User Queries
// ============================================================================

/// List every user with role and permission set. Never selects the password.
pub async fn list_users_with_roles(
    pool: &PgPool,
) -> sqlx::Result<Vec<(User, Role, Option<Permission>)>> {
    let rows = sqlx::query_as::<_, UserWithRoleRow>(&format!(
        "{USER_WITH_ROLE_SELECT} ORDER BY u.id"
    ))
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_users_with_roles"))?;

    Ok(rows.into_iter().map(UserWithRoleRow::into_parts).collect())
}

/// Find a user by ID with role and permission set.
pub async fn find_user_with_role(
    pool: &PgPool,
    id: i32,
) -> sqlx::Result<Option<(User, Role, Option<Permission>)>> {
    let row = sqlx::query_as::<_, UserWithRoleRow>(&format!(
        "{USER_WITH_ROLE_SELECT} WHERE u.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_user_with_role", user_id = id))?;

    Ok(row.map(UserWithRoleRow::into_parts))
}

/// Find user by username, without the password hash.
pub async fn find_user_by_username(pool: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "SELECT id, role_id, username, email FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_user_by_username", username = %username))
}

/// Find the credentials row used by login.
pub async fn find_credentials_by_username(
    pool: &PgPool,
    username: &str,
) -> sqlx::Result<Option<UserCredentials>> {
    sqlx::query_as::<_, UserCredentials>(
        "SELECT id, role_id, username, password FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_credentials_by_username", username = %username))
}

/// Create a new user.
pub async fn create_user(pool: &PgPool, user: &UserWrite<'_>) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(
        r"
        INSERT INTO users (username, password, email, role_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, role_id, username, email
        ",
    )
    .bind(user.username)
    .bind(user.password_hash)
    .bind(user.email)
    .bind(user.role_id)
    .fetch_one(pool)
    .await
}

/// Overwrite a user, including the password hash.
///
/// Returns `None` when no user has this ID.
pub async fn update_user(
    pool: &PgPool,
    id: i32,
    user: &UserWrite<'_>,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r"
        UPDATE users
        SET username = $1, password = $2, email = $3, role_id = $4
        WHERE id = $5
        RETURNING id, role_id, username, email
        ",
    )
    .bind(user.username)
    .bind(user.password_hash)
    .bind(user.email)
    .bind(user.role_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Check whether a user row exists.
pub async fn user_exists(pool: &PgPool, id: i32) -> sqlx::Result<bool> {
    let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(result.0)
}

/// Delete a user. Returns the number of rows removed.
pub async fn delete_user(pool: &PgPool, id: i32) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
