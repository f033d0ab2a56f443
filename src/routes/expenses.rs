//! Expense routes: create, list with filters, update, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::auth::AuthUser;
use super::body::LenientJson;
use super::error::ApiError;
use crate::services::category;
use crate::services::expense::{self, ExpenseFilter, SortOrder};
use crate::services::page::Page;
use crate::services::period::DateWindow;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
    pub q: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// Translate listing query parameters into a filter.
pub(crate) fn filter_from_query(query: &ListQuery) -> Result<ExpenseFilter, ApiError> {
    let window = DateWindow::from_list_query(
        query.from.as_deref(),
        query.to.as_deref(),
        query.month.as_deref(),
        query.year.as_deref(),
    )?;
    let filter = ExpenseFilter {
        window,
        sort: SortOrder::parse(query.sort.as_deref())?,
        page: Page::parse(query.limit.as_deref(), query.skip.as_deref())?,
        ..ExpenseFilter::default()
    };
    Ok(filter.with_search(query.q.as_deref()).with_category(query.category.as_deref()))
}

/// `GET /api/expenses/health`
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "service": "expenses" }))
}

/// `POST /api/expenses/add`: record an expense.
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    LenientJson(body): LenientJson<Map<String, Value>>,
) -> Result<Response, ApiError> {
    let allowed = category::load_set(&state.pool, auth.user.id).await?;
    let new = expense::validate_new(&body, &allowed)?;
    let created = expense::insert_expense(&state.pool, auth.user.id, &new).await?;
    tracing::info!(user_id = %auth.user.id, expense_id = %created.id, "expense added");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Expense added", "expense": created })),
    )
        .into_response())
}

/// `GET /api/expenses`: list the caller's expenses.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = filter_from_query(&query)?;
    let items = expense::list_expenses(&state.pool, auth.user.id, &filter).await?;
    Ok(Json(json!({ "success": true, "expenses": items })))
}

/// `PUT|PATCH /api/expenses/{id}`: update any subset of fields.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    LenientJson(body): LenientJson<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let expense_id = expense::parse_id(&id)?;
    let allowed = category::load_set(&state.pool, auth.user.id).await?;
    let patch = expense::validate_patch(&body, &allowed)?;
    let updated = expense::update_expense(&state.pool, auth.user.id, expense_id, &patch).await?;
    tracing::info!(user_id = %auth.user.id, %expense_id, "expense updated");
    Ok(Json(json!({ "success": true, "message": "Expense updated", "expense": updated })))
}

/// `DELETE /api/expenses/{id}`
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let expense_id = expense::parse_id(&id)?;
    expense::delete_expense(&state.pool, auth.user.id, expense_id).await?;
    tracing::info!(user_id = %auth.user.id, %expense_id, "expense deleted");
    Ok(Json(json!({ "success": true, "message": "Expense deleted" })))
}

#[cfg(test)]
#[path = "expenses_test.rs"]
mod tests;
