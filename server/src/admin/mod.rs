//! Admin Module
//!
//! CRUD endpoints for roles, permission sets and users. Every route requires
//! the caller to hold the `admin` role.

pub mod permissions;
pub mod roles;
pub mod types;
pub mod users;

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::api::{not_found, AppState};
use crate::auth::{require_role, RoleGuard};

/// Role scope guarding this router.
pub const ADMIN_SCOPE: &str = "admin";

/// Create the admin router.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
        .route(
            "/permissions",
            get(permissions::list_permissions).post(permissions::create_permission),
        )
        .route(
            "/permissions/{id}",
            get(permissions::get_permission)
                .put(permissions::update_permission)
                .delete(permissions::delete_permission),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Unmatched paths under the prefix are guarded too.
        .fallback(not_found)
        .layer(from_fn_with_state(
            RoleGuard::new(state, ADMIN_SCOPE),
            require_role,
        ))
}
