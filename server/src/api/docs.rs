//! OpenAPI document and Swagger UI.

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use super::{
    error::{FieldError, GenericErrorResponse, ValidationErrorResponse},
    AppState,
};
use crate::{admin, auth, profile};

#[derive(OpenApi)]
#[openapi(
    info(title = "Staff Admin API"),
    paths(
        auth::handlers::login,
        admin::roles::list_roles,
        admin::roles::create_role,
        admin::roles::get_role,
        admin::roles::update_role,
        admin::roles::delete_role,
        admin::permissions::list_permissions,
        admin::permissions::create_permission,
        admin::permissions::get_permission,
        admin::permissions::update_permission,
        admin::permissions::delete_permission,
        admin::users::list_users,
        admin::users::create_user,
        admin::users::get_user,
        admin::users::update_user,
        admin::users::delete_user,
        profile::get_profile,
    ),
    components(schemas(
        FieldError,
        ValidationErrorResponse,
        GenericErrorResponse,
        auth::ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Token issuing"),
        (name = "roles", description = "Role management"),
        (name = "permissions", description = "Permission set management"),
        (name = "users", description = "User management"),
        (name = "user", description = "User-facing routes"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by guarded routes.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI at `/api-docs`, document at `/api-docs/openapi.json`.
pub fn router() -> Router<AppState> {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
