use axum::body::{Body, to_bytes};
use axum::http::Request;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use tower::ServiceExt;

use super::*;
use crate::routes::{app, auth};
use crate::state::test_helpers::test_app_state;

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder.header(CONTENT_TYPE, "application/json").body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn settings_health_reports_service() {
    let (status, body) = send(test_app_state(), request("GET", "/api/settings/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "service": "settings" }));
}

#[tokio::test]
async fn category_writes_require_bearer_token() {
    let cases = [
        request("POST", "/api/settings/categories", None, Some(json!({ "name": "Travel" }))),
        request("DELETE", "/api/settings/categories/Travel", None, None),
    ];
    for req in cases {
        let (status, body) = send(test_app_state(), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "success": false, "message": auth::MISSING_TOKEN }));
    }
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn category_routes_round_trip_with_envelopes() {
    use crate::services::session;
    use crate::state::test_helpers::{integration_pool, seed_user};

    let pool = integration_pool().await;
    let user = seed_user(&pool).await;
    let token = session::create_session(&pool, user.id, 60).await.unwrap();
    let mut state = test_app_state();
    state.pool = pool;
    let token = Some(token.as_str());

    let uri = "/api/settings/categories";
    let (status, body) = send(state.clone(), request("POST", uri, token, Some(json!({ "name": "Travel" })))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Category added");
    assert!(body["categories"].as_array().unwrap().iter().any(|c| c["name"] == "Travel"));

    let (status, body) = send(state.clone(), request("POST", uri, token, Some(json!({ "name": "travel" })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "message": "Category already exists" }));

    let clash = json!({ "name": "Gifts", "color": "#10b981" });
    let (status, body) = send(state.clone(), request("POST", uri, token, Some(clash))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Color already used by another category");

    let (status, body) = send(state.clone(), request("DELETE", "/api/settings/categories/Other", token, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete 'Other' category");

    let (status, body) = send(state.clone(), request("DELETE", "/api/settings/categories/Travel", token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted");

    let (status, body) = send(state, request("DELETE", "/api/settings/categories/Travel", token, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Category not found");
}
