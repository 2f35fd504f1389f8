//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum router,
//! plus utilities for seeding roles and users and for JWT generation.
//!
//! ## Databases
//!
//! Tests touching `PostgreSQL` take the per-test pool from `#[sqlx::test]` and
//! wrap it with [`TestApp::with_pool`]. Tests that never reach the database
//! (header checks, token failures, fallback, CORS) use [`TestApp::lazy`], whose
//! pool never connects.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;
use staff_server::api::{create_router, AppState};
use staff_server::auth::{jwt, password};
use staff_server::config::Config;
use staff_server::db::{self, Role, User, UserWrite};
use staff_server::permissions::PermissionSet;

/// Password of every user created by [`create_test_user`].
pub const TEST_PASSWORD: &str = "Password@01";

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl TestApp {
    /// Create a test app on the given pool with the test config.
    pub fn with_pool(pool: PgPool) -> Self {
        Self::with_config(pool, Config::default_for_test())
    }

    /// Create a test app with a custom config.
    pub fn with_config(pool: PgPool, config: Config) -> Self {
        let state = AppState::new(pool.clone(), config.clone());
        let router = create_router(state);

        Self {
            router,
            pool,
            config: Arc::new(config),
        }
    }

    /// Create a test app whose pool never connects.
    pub fn lazy() -> Self {
        Self::lazy_with_config(Config::default_for_test())
    }

    /// [`TestApp::lazy`] with a custom config.
    pub fn lazy_with_config(config: Config) -> Self {
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("Failed to create lazy pool");

        Self::with_config(pool, config)
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Send a request with an optional bearer token and optional JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Self::request(method, uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.oneshot(request).await
    }

    /// Sign a token for `username` with this app's secret.
    pub fn token_for(&self, username: &str) -> String {
        generate_access_token(&self.config, username)
    }

    /// Seed an `admin` role with a user and return that user's token.
    pub async fn admin_token(&self) -> String {
        let role = ensure_role(&self.pool, "admin").await;
        create_test_user(&self.pool, role.id, "admin").await;
        self.token_for("admin")
    }
}

// ============================================================================
// Seed helpers
// ============================================================================

/// Find or create a role by name.
pub async fn ensure_role(pool: &PgPool, name: &str) -> Role {
    if let Some(role) = db::find_role_by_name(pool, name)
        .await
        .expect("Failed to look up role")
    {
        return role;
    }

    db::create_role(pool, name, None)
        .await
        .expect("Failed to create role")
}

/// Create a role with the given permission set.
pub async fn create_role_with_permissions(
    pool: &PgPool,
    name: &str,
    permissions: &PermissionSet,
) -> Role {
    let role = ensure_role(pool, name).await;
    db::create_permission(pool, role.id, permissions)
        .await
        .expect("Failed to create permission set");
    role
}

/// Create a user holding `role_id` with [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &PgPool, role_id: i32, username: &str) -> User {
    let password_hash = password::hash_password(TEST_PASSWORD)
        .await
        .expect("Failed to hash password");

    db::create_user(
        pool,
        &UserWrite {
            username,
            password_hash: &password_hash,
            email: &format!("{username}@example.com"),
            role_id,
        },
    )
    .await
    .expect("Failed to create test user")
}

/// Generate an access token for the given username.
pub fn generate_access_token(config: &Config, username: &str) -> String {
    jwt::generate_access_token(username, &config.jwt_secret, config.jwt_access_expiry)
        .expect("Failed to generate access token")
        .token
}

// ============================================================================
// Body helpers
// ============================================================================

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes()
        .to_vec()
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}

/// Field names reported in a `422` body.
pub fn error_fields(json: &serde_json::Value) -> Vec<String> {
    json["errors"]
        .as_array()
        .expect("Expected an errors array")
        .iter()
        .map(|e| e["field"].as_str().unwrap_or_default().to_string())
        .collect()
}
