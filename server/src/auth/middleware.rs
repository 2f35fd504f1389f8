//! Role-scoped Authentication Guard

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::db::{find_role_by_name, find_user_by_username, Role, User};

use super::error::{AuthError, AuthResult};
use super::jwt::validate_access_token;

/// Authenticated user injected into request extensions.
///
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// User ID.
    pub id: i32,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// Role the user holds (equal to the guarded scope).
    pub role_id: i32,
    /// Role name.
    pub role: String,
}

impl AuthUser {
    fn new(user: User, role: Role) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role_id: role.id,
            role: role.role,
        }
    }
}

/// Guard state: the application state plus the role scope it enforces.
///
/// # Usage
///
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .layer(from_fn_with_state(RoleGuard::new(state, "admin"), require_role))
/// ```
#[derive(Clone)]
pub struct RoleGuard {
    state: AppState,
    scope: &'static str,
}

impl RoleGuard {
    #[must_use]
    pub const fn new(state: AppState, scope: &'static str) -> Self {
        Self { state, scope }
    }
}

/// Middleware admitting only users holding the guard's role.
///
/// On success the resolved [`AuthUser`] is placed in the request extensions;
/// on failure the request is answered with 401 and never reaches the handler.
pub async fn require_role(
    State(guard): State<RoleGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_user = authorize(&guard.state, guard.scope, request.headers())
        .await
        .inspect_err(|e| {
            tracing::debug!(scope = guard.scope, error = %e, "Request rejected by role guard");
        })?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Resolve the caller for `scope`, returning the first failure encountered.
///
/// 1. bearer token present
/// 2. signature and expiry valid
/// 3. scope role exists
/// 4. token user exists
/// 5. user holds that role
pub async fn authorize(
    state: &AppState,
    scope: &str,
    headers: &HeaderMap,
) -> AuthResult<AuthUser> {
    let token = bearer_token(headers)?;

    let claims = validate_access_token(token, &state.config.jwt_secret)?;

    let role = find_role_by_name(&state.db, scope)
        .await?
        .ok_or_else(|| AuthError::RoleNotFound(scope.to_string()))?;

    let user = find_user_by_username(&state.db, &claims.username)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    if user.role_id != role.id {
        return Err(AuthError::Unauthorized);
    }

    Ok(AuthUser::new(user, role))
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> AuthResult<&str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Extractor for the authenticated user in guarded handlers.
///
/// ```ignore
/// async fn profile(auth_user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", auth_user.username)
/// }
/// ```
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}
