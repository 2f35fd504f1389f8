//! HTTP Integration Tests for the router shell: index, fallback, CORS and docs.
//!
//! None of these touch the database.
//!
//! Run with: `cargo test --test app_http_test -- --nocapture`

mod helpers;

use axum::body::Body;
use axum::http::{header, Method};
use helpers::{body_to_json, TestApp};
use staff_server::config::{Config, Environment};

#[tokio::test]
async fn test_index() {
    let app = TestApp::lazy();

    let resp = app.send(Method::GET, "/", None, None).await;
    assert_eq!(resp.status(), 200);

    let json = body_to_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unmatched_route_is_json_404() {
    let app = TestApp::lazy();

    let resp = app.send(Method::GET, "/no/such/route", None, None).await;
    assert_eq!(resp.status(), 404);
    assert_eq!(
        body_to_json(resp).await,
        serde_json::json!({"error": "Not found", "path": "/no/such/route"})
    );
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = TestApp::lazy();
    let req = TestApp::request(Method::GET, "/")
        .header(header::ORIGIN, "https://admin.example.com")
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_preflight_skips_guard() {
    let app = TestApp::lazy();
    let req = TestApp::request(Method::OPTIONS, "/admin/roles")
        .header(header::ORIGIN, "https://admin.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await;
    assert!(resp.status().is_success());
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_openapi_served_in_development() {
    let app = TestApp::lazy();

    let resp = app
        .send(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(resp.status(), 200);

    let json = body_to_json(resp).await;
    assert!(json["paths"]["/admin/users/{id}"].is_object());
    assert!(json["paths"]["/auth/login"]["post"].is_object());
}

#[tokio::test]
async fn test_docs_hidden_in_production() {
    let config = Config {
        environment: Environment::Production,
        ..Config::default_for_test()
    };
    let app = TestApp::lazy_with_config(config);

    let resp = app
        .send(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(resp.status(), 404);
}
