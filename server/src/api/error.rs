//! API error types for the resource routers.
//!
//! Client mistakes (field validation, unique and foreign-key constraint
//! violations, malformed bodies) are all answered with
//! `422 {"errors": [...]}`. Everything else is an opaque 500.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::auth::AuthError;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// A single field-level error descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Offending field (or `body` for a malformed request).
    pub field: String,
    /// Machine-readable rule name, e.g. `length`, `email`, `unique`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// `422` response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

/// Generic error body for non-validation failures.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenericErrorResponse {
    pub error: String,
}

/// API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more fields failed validation.
    #[error("Validation failed: {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Unique or foreign-key constraint violated by the write.
    #[error("Constraint violated: {constraint}")]
    Constraint {
        constraint: String,
        error: FieldError,
    },

    /// Any other database error.
    #[error("Database error")]
    Database(sqlx::Error),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Constraint { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Map a constraint name like `users_email_key` or `users_role_id_fkey` to
/// its column (`email`, `role_id`).
fn constraint_field(constraint: &str) -> &str {
    let column = constraint.split_once('_').map_or(constraint, |(_, rest)| rest);
    column
        .strip_suffix("_fkey")
        .or_else(|| column.strip_suffix("_key"))
        .unwrap_or(column)
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        let classified = match &err {
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                if db_err.is_unique_violation() {
                    let field = constraint_field(&constraint).to_string();
                    let message = format!("{field} is already in use");
                    Some((constraint, FieldError::new(field, "unique", message)))
                } else if db_err.is_foreign_key_violation() {
                    let field = constraint_field(&constraint).to_string();
                    Some((
                        constraint,
                        FieldError::new(field, "foreign_key", db_err.message().to_string()),
                    ))
                } else {
                    None
                }
            }
            _ => None,
        };

        match classified {
            Some((constraint, error)) => Self::Constraint { constraint, error },
            None => Self::Database(err),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map_or_else(|| format!("Invalid value ({})", e.code), ToString::to_string);
                    FieldError::new(field.clone(), e.code.to_string(), message)
                })
            })
            .collect();

        // HashMap iteration order is random
        fields.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
        Self::Validation(fields)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(vec![FieldError::new(
            "body",
            "invalid_json",
            rejection.body_text(),
        )])
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::Validation(errors) => {
                (status, Json(ValidationErrorResponse { errors })).into_response()
            }
            Self::Constraint { constraint, error } => {
                tracing::debug!(constraint = %constraint, "Write rejected by constraint");
                (status, Json(ValidationErrorResponse { errors: vec![error] })).into_response()
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "Unhandled database error");
                internal_error_response()
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error_response()
            }
        }
    }
}

fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(GenericErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 4, message = "too short"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_constraint_field() {
        assert_eq!(constraint_field("users_email_key"), "email");
        assert_eq!(constraint_field("roles_role_key"), "role");
        assert_eq!(constraint_field("users_role_id_fkey"), "role_id");
        assert_eq!(constraint_field("permissions_role_id_key"), "role_id");
        assert_eq!(constraint_field("unknown"), "unknown");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation(vec![]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_non_constraint_database_error_is_opaque() {
        let err = ApiError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, ApiError::Database(_)));
    }

    #[test]
    fn test_validation_errors_are_all_reported() {
        let sample = Sample {
            name: "ab".into(),
            email: "nope".into(),
        };
        let err = ApiError::from(sample.validate().unwrap_err());

        let ApiError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[0].code, "email");
        assert_eq!(fields[1].field, "name");
        assert_eq!(fields[1].message, "too short");
    }
}
