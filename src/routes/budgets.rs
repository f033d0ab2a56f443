//! Budget routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::auth::AuthUser;
use super::body::LenientJson;
use super::error::ApiError;
use crate::services::budget;
use crate::services::page::Page;
use crate::services::period::BudgetKey;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub month: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

pub(crate) fn parse_list_query(query: &ListQuery) -> Result<(Option<BudgetKey>, Page), ApiError> {
    let key = match query.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(raw) => Some(BudgetKey::parse(raw)?),
        None => None,
    };
    Ok((key, Page::parse(query.limit.as_deref(), query.skip.as_deref())?))
}

/// `POST /api/budgets/add`
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    LenientJson(body): LenientJson<Map<String, Value>>,
) -> Result<Response, ApiError> {
    let new = budget::validate_new(&body)?;
    let created = budget::create_budget(&state.pool, auth.user.id, &new).await?;
    tracing::info!(user_id = %auth.user.id, budget_id = %created.id, key = %created.month, "budget created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Budget created", "budget": created })),
    )
        .into_response())
}

/// `GET /api/budgets[?month=&limit=&skip=]`: newest first.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let (key, page) = parse_list_query(&query)?;
    let items = budget::list_budgets(&state.pool, auth.user.id, key.as_ref(), page).await?;
    Ok(Json(json!({ "success": true, "budgets": items })))
}

/// `PUT /api/budgets/{id}`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    LenientJson(body): LenientJson<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let budget_id = budget::parse_id(&id)?;
    let patch = budget::validate_patch(&body)?;
    let updated = budget::update_budget(&state.pool, auth.user.id, budget_id, &patch).await?;
    tracing::info!(user_id = %auth.user.id, %budget_id, "budget updated");
    Ok(Json(json!({ "success": true, "message": "Budget updated", "budget": updated })))
}

/// `DELETE /api/budgets/{id}`
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let budget_id = budget::parse_id(&id)?;
    budget::delete_budget(&state.pool, auth.user.id, budget_id).await?;
    tracing::info!(user_id = %auth.user.id, %budget_id, "budget deleted");
    Ok(Json(json!({ "success": true, "message": "Budget deleted" })))
}

#[cfg(test)]
#[path = "budgets_test.rs"]
mod tests;
