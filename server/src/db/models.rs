//! Database Models

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::permissions::{CapabilityEdit, CapabilitySuspend};

/// Role model.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub role: String,
    pub description: Option<String>,
}

/// Permission model, one row per role at most.
#[derive(Debug, Clone, FromRow)]
pub struct Permission {
    pub id: i32,
    pub role_id: i32,
    pub store: Json<CapabilitySuspend>,
    pub member: Json<CapabilitySuspend>,
    pub package: Json<CapabilityEdit>,
    pub billing: Json<CapabilityEdit>,
}

/// User model without the password hash.
///
/// This is the only user shape that leaves the query layer for API use.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i32,
    pub role_id: i32,
    pub username: String,
    pub email: String,
}

/// Login lookup row; carries the bcrypt hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub role_id: i32,
    pub username: String,
    pub password: String,
}

/// Fields written on user insert and update. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct UserWrite<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub email: &'a str,
    pub role_id: i32,
}

/// `roles LEFT JOIN permissions` row.
#[derive(Debug, Clone, FromRow)]
pub struct RoleWithPermissionRow {
    pub id: i32,
    pub role: String,
    pub description: Option<String>,
    pub permission_id: Option<i32>,
    pub store: Option<Json<CapabilitySuspend>>,
    pub member: Option<Json<CapabilitySuspend>>,
    pub package: Option<Json<CapabilityEdit>>,
    pub billing: Option<Json<CapabilityEdit>>,
}

impl RoleWithPermissionRow {
    /// Split the joined row; the permission is `None` when the join missed.
    #[must_use]
    pub fn into_parts(self) -> (Role, Option<Permission>) {
        let role = Role {
            id: self.id,
            role: self.role,
            description: self.description,
        };
        let permission = self.permission_id.map(|permission_id| Permission {
            id: permission_id,
            role_id: role.id,
            store: self.store.unwrap_or_else(|| Json(CapabilitySuspend::default())),
            member: self.member.unwrap_or_else(|| Json(CapabilitySuspend::default())),
            package: self.package.unwrap_or_else(|| Json(CapabilityEdit::default())),
            billing: self.billing.unwrap_or_else(|| Json(CapabilityEdit::default())),
        });
        (role, permission)
    }
}

/// `users JOIN roles LEFT JOIN permissions` row.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithRoleRow {
    pub id: i32,
    pub role_id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub role_description: Option<String>,
    pub permission_id: Option<i32>,
    pub store: Option<Json<CapabilitySuspend>>,
    pub member: Option<Json<CapabilitySuspend>>,
    pub package: Option<Json<CapabilityEdit>>,
    pub billing: Option<Json<CapabilityEdit>>,
}

impl UserWithRoleRow {
    #[must_use]
    pub fn into_parts(self) -> (User, Role, Option<Permission>) {
        let user = User {
            id: self.id,
            role_id: self.role_id,
            username: self.username,
            email: self.email,
        };
        let (role, permission) = RoleWithPermissionRow {
            id: self.role_id,
            role: self.role,
            description: self.role_description,
            permission_id: self.permission_id,
            store: self.store,
            member: self.member,
            package: self.package,
            billing: self.billing,
        }
        .into_parts();
        (user, role, permission)
    }
}
