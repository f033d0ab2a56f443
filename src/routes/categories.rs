//! Settings routes: per-user expense categories.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{Value, json};

use super::auth::AuthUser;
use super::body::LenientJson;
use super::error::ApiError;
use crate::services::category;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AddCategoryBody {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// `GET /api/settings/health`
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "service": "settings" }))
}

/// `GET /api/settings/categories`
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Value>, ApiError> {
    let categories = category::list_categories(&state.pool, auth.user.id).await?;
    Ok(Json(json!({ "success": true, "categories": categories })))
}

/// `POST /api/settings/categories`
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    LenientJson(body): LenientJson<AddCategoryBody>,
) -> Result<Response, ApiError> {
    let categories = category::add_category(
        &state.pool,
        auth.user.id,
        body.name.as_deref().unwrap_or_default(),
        body.color.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Category added", "categories": categories })),
    )
        .into_response())
}

/// `DELETE /api/settings/categories/{name}`
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let categories = category::delete_category(&state.pool, auth.user.id, &name).await?;
    Ok(Json(json!({ "success": true, "message": "Category deleted", "categories": categories })))
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
