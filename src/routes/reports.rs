//! Report routes: spending summary and file export.

use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use time::Date;

use super::auth::AuthUser;
use super::error::ApiError;
use crate::services::export::{self, ExportFormat, ExportOptions};
use crate::services::period::{Period, RangePreset};
use crate::services::{budget, category, expense, summary};
use crate::state::AppState;

/// Interpret a query flag. Unrecognised values count as unset.
pub(crate) fn parse_flag(raw: Option<&str>) -> Option<bool> {
    raw.and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

// =============================================================================
// SUMMARY
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub period: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

pub(crate) fn resolve_period(query: &SummaryQuery, today: Date) -> Result<Period, ApiError> {
    Ok(Period::resolve(
        query.period.as_deref(),
        query.month.as_deref(),
        query.year.as_deref(),
        query.from.as_deref(),
        query.to.as_deref(),
        today,
    )?)
}

/// `GET /api/reports/summary`: totals, category split and budget status.
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Value>, ApiError> {
    let today = state.today();
    let period = resolve_period(&query, today)?;
    let user_id = auth.user.id;

    let expenses = expense::list_in_window(&state.pool, user_id, &period.window()).await?;
    let budgets = budget::list_all_budgets(&state.pool, user_id).await?;
    let categories = category::list_categories(&state.pool, user_id).await?;

    let report = summary::summarize(&period, today, &expenses, &budgets, &categories);
    tracing::debug!(%user_id, period = report.period, total = report.total, count = report.count, "summary built");
    Ok(Json(json!({ "success": true, "summary": report })))
}

// =============================================================================
// EXPORT
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    pub range: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub categories: Option<String>,
    pub include_notes: Option<String>,
}

pub(crate) fn export_options(query: &ExportQuery, today: Date, currency_symbol: &str) -> Result<ExportOptions, ApiError> {
    let format = ExportFormat::parse(query.format.as_deref())?;
    let preset = RangePreset::parse(query.range.as_deref())?;
    let (window, range_label) = preset.resolve(today, query.from.as_deref(), query.to.as_deref())?;
    Ok(ExportOptions {
        format,
        window,
        range_label,
        categories: export::parse_categories(query.categories.as_deref()),
        include_notes: parse_flag(query.include_notes.as_deref()).unwrap_or(true),
        currency_symbol: currency_symbol.to_owned(),
    })
}

/// `GET /api/reports/export`: download expenses as CSV, JSON or HTML.
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let today = state.today();
    let options = export_options(&query, today, &state.config.currency_symbol)?;
    let expenses = expense::list_in_window(&state.pool, auth.user.id, &options.window).await?;
    let file = export::render(&expenses, &options, today)?;
    tracing::info!(user_id = %auth.user.id, filename = %file.filename, bytes = file.body.len(), "export generated");

    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok(([(CONTENT_TYPE, file.content_type.to_owned()), (CONTENT_DISPOSITION, disposition)], file.body).into_response())
}

#[cfg(test)]
#[path = "reports_test.rs"]
mod tests;
