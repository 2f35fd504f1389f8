//! Admin module types: request bodies, validation rules and response shapes.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::db::{Permission, Role, User};
use crate::permissions::{CapabilityEdit, CapabilityGroup, CapabilitySuspend, PermissionSet};

// ============================================================================
// Request Types
// ============================================================================

/// Accept a JSON integer or an integer-valued string; anything else is `None`.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Scalar JSON as text: strings as-is, numbers and booleans in their JSON form.
fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept any JSON value for a text field so that validation, not parsing,
/// reports it. `null`, arrays and objects read as the empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_text(value).unwrap_or_default())
}

/// Optional variant of [`lenient_string`]; `null`, arrays and objects are `None`.
fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_text(value))
}

/// Body of `POST /admin/roles` and `PUT /admin/roles/{id}`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RoleRequest {
    /// Unique role name, at least 4 characters.
    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 4, message = "Role must be at least 4 characters"))]
    #[schema(example = "tester")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
}

/// The four capability groups as submitted.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PermissionGroups {
    pub store: Option<CapabilitySuspend>,
    pub member: Option<CapabilitySuspend>,
    pub package: Option<CapabilityEdit>,
    pub billing: Option<CapabilityEdit>,
}

fn group_error(present: bool) -> ValidationError {
    if present {
        ValidationError::new("not_empty").with_message("Capability group must not be empty".into())
    } else {
        ValidationError::new("required").with_message("Capability group is required".into())
    }
}

fn check_group<G: CapabilityGroup>(
    errors: &mut ValidationErrors,
    field: &'static str,
    group: Option<&G>,
) {
    match group {
        Some(group) if !group.is_empty() => {}
        Some(_) => errors.add(field, group_error(true)),
        None => errors.add(field, group_error(false)),
    }
}

impl PermissionGroups {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        check_group(errors, "store", self.store.as_ref());
        check_group(errors, "member", self.member.as_ref());
        check_group(errors, "package", self.package.as_ref());
        check_group(errors, "billing", self.billing.as_ref());
    }

    /// Validated groups as a permission set. Call only after validation.
    #[must_use]
    pub fn into_set(self) -> PermissionSet {
        PermissionSet {
            store: self.store.unwrap_or_default(),
            member: self.member.unwrap_or_default(),
            package: self.package.unwrap_or_default(),
            billing: self.billing.unwrap_or_default(),
        }
    }
}

impl Validate for PermissionGroups {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.collect_errors(&mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Body of `POST /admin/permissions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePermissionRequest {
    /// Role the set is attached to.
    #[serde(default, deserialize_with = "lenient_int")]
    #[schema(value_type = i32, example = 2)]
    pub role_id: Option<i32>,
    #[serde(flatten)]
    pub groups: PermissionGroups,
}

impl Validate for CreatePermissionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.role_id.is_none() {
            errors.add(
                "role_id",
                ValidationError::new("integer").with_message("Role id must be an integer".into()),
            );
        }
        self.groups.collect_errors(&mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Body of `POST /admin/users` and `PUT /admin/users/{id}`.
///
/// `confirm_password` is only ever compared, never stored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 4, message = "Username must be at least 4 characters"))]
    #[schema(example = "demo")]
    pub username: String,
    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters"),
        must_match(other = "confirm_password", message = "Passwords don't match")
    )]
    pub password: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub confirm_password: String,
    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(email(message = "Email must be a valid email address"))]
    #[schema(example = "demo@example.com")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_int")]
    #[validate(required(message = "Role id must be an integer"))]
    #[schema(value_type = i32, example = 2)]
    pub role_id: Option<i32>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Permission set embedded in a role.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionSummary {
    pub id: i32,
    pub store: CapabilitySuspend,
    pub member: CapabilitySuspend,
    pub package: CapabilityEdit,
    pub billing: CapabilityEdit,
}

impl From<Permission> for PermissionSummary {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.id,
            store: permission.store.0,
            member: permission.member.0,
            package: permission.package.0,
            billing: permission.billing.0,
        }
    }
}

/// Permission row as served by `/admin/permissions`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionResponse {
    pub id: i32,
    pub role_id: i32,
    pub store: CapabilitySuspend,
    pub member: CapabilitySuspend,
    pub package: CapabilityEdit,
    pub billing: CapabilityEdit,
}

impl From<Permission> for PermissionResponse {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.id,
            role_id: permission.role_id,
            store: permission.store.0,
            member: permission.member.0,
            package: permission.package.0,
            billing: permission.billing.0,
        }
    }
}

/// Role with its permission set. `permissions` is omitted when there is none.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleResponse {
    pub id: i32,
    pub role: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSummary>,
}

impl From<(Role, Option<Permission>)> for RoleResponse {
    fn from((role, permission): (Role, Option<Permission>)) -> Self {
        Self {
            id: role.id,
            role: role.role,
            description: role.description,
            permissions: permission.map(PermissionSummary::from),
        }
    }
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self::from((role, None))
    }
}

/// User with role and permission set. Never carries the password.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role_id: i32,
    pub role: RoleResponse,
}

impl From<(User, Role, Option<Permission>)> for UserResponse {
    fn from((user, role, permission): (User, Role, Option<Permission>)) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role_id: user.role_id,
            role: RoleResponse::from((role, permission)),
        }
    }
}

/// Body returned by the delete endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "Deleted successfully")]
    pub message: String,
    /// Number of rows removed.
    pub deleted: u64,
}

impl DeleteResponse {
    #[must_use]
    pub fn new(deleted: u64) -> Self {
        Self {
            message: "Deleted successfully".to_string(),
            deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use sqlx::types::Json;

    fn error_fields(result: Result<(), ValidationErrors>) -> Vec<(String, String)> {
        match ApiError::from(result.unwrap_err()) {
            ApiError::Validation(fields) => fields.into_iter().map(|f| (f.field, f.code)).collect(),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_role_name_too_short() {
        let body: RoleRequest = serde_json::from_str(r#"{"role": "abc"}"#).unwrap();
        assert_eq!(
            error_fields(body.validate()),
            vec![("role".to_string(), "length".to_string())]
        );

        let body: RoleRequest = serde_json::from_str(r#"{"role": "tester"}"#).unwrap();
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_missing_role_name_is_a_validation_error() {
        let body: RoleRequest = serde_json::from_str("{}").unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_user_reports_every_violation() {
        let body: UserRequest = serde_json::from_value(serde_json::json!({
            "username": "abc",
            "password": "short",
            "confirm_password": "other",
            "email": "not-an-email",
            "role_id": "two",
        }))
        .unwrap();

        let fields = error_fields(body.validate());
        let names: Vec<&str> = fields.iter().map(|(f, _)| f.as_str()).collect();
        assert!(names.contains(&"username"));
        assert!(names.contains(&"email"));
        assert!(names.contains(&"role_id"));
        assert!(fields.contains(&("password".to_string(), "length".to_string())));
        assert!(fields.contains(&("password".to_string(), "must_match".to_string())));
    }

    #[test]
    fn test_password_mismatch_rejected() {
        let body: UserRequest = serde_json::from_value(serde_json::json!({
            "username": "demo",
            "password": "secret1",
            "confirm_password": "secret2",
            "email": "demo@example.com",
            "role_id": 2,
        }))
        .unwrap();

        assert_eq!(
            error_fields(body.validate()),
            vec![("password".to_string(), "must_match".to_string())]
        );
    }

    #[test]
    fn test_valid_user_with_string_role_id() {
        let body: UserRequest = serde_json::from_value(serde_json::json!({
            "username": "demo",
            "password": "secret1",
            "confirm_password": "secret1",
            "email": "demo@example.com",
            "role_id": "2",
        }))
        .unwrap();

        assert!(body.validate().is_ok());
        assert_eq!(body.role_id, Some(2));
    }

    #[test]
    fn test_wrongly_typed_text_fields_reach_validation() {
        let body: UserRequest = serde_json::from_value(serde_json::json!({
            "username": null,
            "password": "abc",
            "confirm_password": "xyz",
            "email": ["nope"],
            "role_id": 2,
        }))
        .unwrap();

        assert_eq!(body.username, "");
        assert_eq!(body.email, "");
        let fields = error_fields(body.validate());
        assert!(fields.contains(&("username".to_string(), "length".to_string())));
        assert!(fields.contains(&("password".to_string(), "length".to_string())));
        assert!(fields.contains(&("password".to_string(), "must_match".to_string())));
        assert!(fields.contains(&("email".to_string(), "email".to_string())));
    }

    #[test]
    fn test_numeric_role_name_is_read_as_text() {
        let body: RoleRequest =
            serde_json::from_str(r#"{"role": 1234, "description": false}"#).unwrap();
        assert_eq!(body.role, "1234");
        assert_eq!(body.description.as_deref(), Some("false"));
        assert!(body.validate().is_ok());

        let body: RoleRequest = serde_json::from_str(r#"{"role": null, "description": {}}"#).unwrap();
        assert!(body.description.is_none());
        assert_eq!(
            error_fields(body.validate()),
            vec![("role".to_string(), "length".to_string())]
        );
    }

    #[test]
    fn test_permission_groups_required_and_non_empty() {
        let body: CreatePermissionRequest = serde_json::from_value(serde_json::json!({
            "role_id": 1,
            "store": {"view": true},
            "member": {},
            "package": {"view": true},
        }))
        .unwrap();

        let fields = error_fields(body.validate());
        assert_eq!(
            fields,
            vec![
                ("billing".to_string(), "required".to_string()),
                ("member".to_string(), "not_empty".to_string()),
            ]
        );
    }

    #[test]
    fn test_permission_missing_role_id() {
        let body: CreatePermissionRequest = serde_json::from_value(serde_json::json!({
            "store": {"view": true},
            "member": {"view": true},
            "package": {"view": true},
            "billing": {"view": true},
        }))
        .unwrap();

        assert_eq!(
            error_fields(body.validate()),
            vec![("role_id".to_string(), "integer".to_string())]
        );
    }

    #[test]
    fn test_role_response_omits_missing_permissions() {
        let role = Role {
            id: 3,
            role: "tester".into(),
            description: Some("x".into()),
        };
        let json = serde_json::to_value(RoleResponse::from(role)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"id": 3, "role": "tester", "description": "x"})
        );
    }

    #[test]
    fn test_user_response_has_no_password() {
        let user = User {
            id: 1,
            role_id: 1,
            username: "admin".into(),
            email: "admin@example.com".into(),
        };
        let role = Role {
            id: 1,
            role: "admin".into(),
            description: None,
        };
        let permission = Permission {
            id: 5,
            role_id: 1,
            store: Json(CapabilitySuspend::default()),
            member: Json(CapabilitySuspend::default()),
            package: Json(CapabilityEdit::view_only()),
            billing: Json(CapabilityEdit::default()),
        };
        let json = serde_json::to_value(UserResponse::from((user, role, Some(permission)))).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["role"]["permissions"]["id"], 5);
        assert_eq!(json["role"]["permissions"]["store"], serde_json::json!({}));
        assert!(json["role"]["permissions"].get("role_id").is_none());
    }
}
