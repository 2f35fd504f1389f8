//! Authentication Service
//!
//! Issues access tokens and guards routes by role.

mod error;
pub(crate) mod handlers;
pub mod jwt;
mod middleware;
pub mod password;

use axum::{routing::post, Router};

use crate::api::AppState;

pub use error::{AuthError, AuthResult, ErrorResponse};
pub use middleware::{authorize, bearer_token, require_role, AuthUser, RoleGuard};

/// Create authentication router.
///
/// Public routes (no auth required):
/// - POST /login - Login with username/password
pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(handlers::login))
}
