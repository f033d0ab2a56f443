use axum::body::{Body, to_bytes};
use axum::http::Request;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION, ORIGIN};
use tower::ServiceExt;

use super::*;
use crate::state::test_helpers::test_app_state;

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app(test_app_state()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let (status, _) = send(get_request("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn service_health_endpoints_need_no_auth() {
    let (status, body) = send(get_request("/api/expenses/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "service": "expenses" }));

    let (status, body) = send(get_request("/api/settings/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "settings");
}

#[tokio::test]
async fn protected_routes_require_bearer_token() {
    for uri in ["/api/auth/me", "/api/expenses", "/api/budgets", "/api/settings/categories", "/api/reports/summary"] {
        let (status, body) = send(get_request(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], auth::MISSING_TOKEN);
    }
}

#[tokio::test]
async fn non_bearer_scheme_is_treated_as_missing() {
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], auth::MISSING_TOKEN);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, _) = send(get_request("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn any_origin_allowed_when_unconfigured() {
    let request = Request::builder()
        .uri("/healthz")
        .header(ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app(test_app_state()).oneshot(request).await.unwrap();
    assert_eq!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
}

#[tokio::test]
async fn configured_origins_are_enforced() {
    let mut state = test_app_state();
    let mut config = (*state.config).clone();
    config.cors_origins = vec!["https://app.example.com".into()];
    state.config = std::sync::Arc::new(config);

    let allowed = Request::builder()
        .uri("/healthz")
        .header(ORIGIN, "https://app.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app(state.clone()).oneshot(allowed).await.unwrap();
    assert_eq!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "https://app.example.com");

    let denied = Request::builder()
        .uri("/healthz")
        .header(ORIGIN, "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app(state).oneshot(denied).await.unwrap();
    assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
