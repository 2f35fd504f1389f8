//! API Router and Application State
//!
//! Central routing configuration and shared state.

mod docs;
mod error;
mod extract;

use axum::{
    extract::OriginalUri,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{admin, auth, config::Config, profile};

pub use docs::ApiDoc;
pub use error::{ApiError, ApiResult, FieldError, GenericErrorResponse, ValidationErrorResponse};
pub use extract::{parse_id, AppJson, OrNoContent};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(index))
        .nest("/auth", auth::router())
        .nest("/admin", admin::router(state.clone()))
        .nest("/user", profile::router(state.clone()));

    if state.config.docs_enabled() {
        router = router.merge(docs::router());
    }

    router
        .fallback(not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // State
        .with_state(state)
}

/// Index response.
#[derive(Serialize)]
struct IndexResponse {
    /// Service status
    status: &'static str,
    /// Crate version
    version: &'static str,
}

/// Index / health endpoint.
async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Body of the unmatched-route response.
#[derive(Serialize)]
struct NotFoundResponse {
    error: &'static str,
    path: String,
}

/// JSON `404` for unmatched paths. Nested routers use it too, so the path
/// reported is the one the client sent.
pub(crate) async fn not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "No route matched");

    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Not found",
            path: uri.path().to_string(),
        }),
    )
}
