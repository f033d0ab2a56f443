//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds every REST endpoint under a single Axum router. Route
//! groups mirror the service modules: auth, expenses, budgets, settings
//! (categories) and reports. All API responses use the JSON envelope in
//! `error`.

pub mod auth;
pub mod body;
pub mod budgets;
pub mod categories;
pub mod error;
pub mod expenses;
pub mod reports;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db;
use crate::state::AppState;
use error::ApiError;

/// CORS policy from configured origins. No origins means any origin.
pub(crate) fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/users", get(auth::users))
        .route("/api/expenses", get(expenses::list))
        .route("/api/expenses/health", get(expenses::health))
        .route("/api/expenses/add", post(expenses::add))
        .route(
            "/api/expenses/{id}",
            put(expenses::update).patch(expenses::update).delete(expenses::remove),
        )
        .route("/api/budgets", get(budgets::list))
        .route("/api/budgets/add", post(budgets::add))
        .route("/api/budgets/{id}", put(budgets::update).delete(budgets::remove))
        .route("/api/settings/health", get(categories::health))
        .route("/api/settings/categories", get(categories::list).post(categories::add))
        .route("/api/settings/categories/{name}", delete(categories::remove))
        .route("/api/reports/summary", get(reports::summary))
        .route("/api/reports/export", get(reports::export))
        .route("/api/health", get(health))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /api/health`: confirm the database answers.
async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let name = db::ping(&state.pool).await?;
    Ok(Json(json!({ "status": "ok", "db": name })))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
