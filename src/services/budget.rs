//! Monthly and yearly spending budgets.

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use super::money::{self, AmountError, serialize_cents};
use super::page::{Page, PageError};
use super::period::{BudgetKey, PeriodError};

const BUDGET_COLUMNS: &str = "id, user_id, period_key, amount_cents, notes, created_at, updated_at";

#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid budget id")]
    InvalidId,
    #[error("Budget not found")]
    NotFound,
    #[error("stored budget key is invalid: {0}")]
    StoredKey(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AmountError> for BudgetError {
    fn from(err: AmountError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PeriodError> for BudgetError {
    fn from(err: PeriodError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PageError> for BudgetError {
    fn from(err: PageError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip)]
    pub key: BudgetKey,
    /// `YYYY-MM` or `YYYY`.
    pub month: String,
    pub kind: &'static str,
    #[serde(rename = "amount", serialize_with = "serialize_cents")]
    pub amount_cents: i64,
    pub notes: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Budget {
    #[must_use]
    pub fn new(
        id: Uuid,
        user_id: Uuid,
        key: BudgetKey,
        amount_cents: i64,
        notes: String,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self { id, user_id, month: key.key(), kind: key.kind(), key, amount_cents, notes, created_at, updated_at }
    }
}

fn budget_from_row(row: &PgRow) -> Result<Budget, BudgetError> {
    let raw: String = row.get("period_key");
    let key = BudgetKey::parse(&raw).map_err(|_| BudgetError::StoredKey(raw))?;
    Ok(Budget::new(
        row.get("id"),
        row.get("user_id"),
        key,
        row.get("amount_cents"),
        row.get("notes"),
        row.get("created_at"),
        row.get("updated_at"),
    ))
}

/// Validated create input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBudget {
    pub key: BudgetKey,
    pub amount_cents: i64,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetPatch {
    pub key: Option<BudgetKey>,
    pub amount_cents: Option<i64>,
    pub notes: Option<String>,
}

fn text(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).map(str::trim).unwrap_or_default().to_owned()
}

/// # Errors
///
/// Returns `InvalidId` when `raw` is not a UUID.
pub fn parse_id(raw: &str) -> Result<Uuid, BudgetError> {
    Uuid::parse_str(raw.trim()).map_err(|_| BudgetError::InvalidId)
}

/// # Errors
///
/// Returns `Validation` for a malformed key or amount.
pub fn validate_new(body: &Map<String, Value>) -> Result<NewBudget, BudgetError> {
    let key = BudgetKey::parse(&text(body.get("month")))?;
    let amount_cents = money::parse_amount(body.get("amount").unwrap_or(&Value::Null))?;
    Ok(NewBudget { key, amount_cents, notes: text(body.get("notes")) })
}

/// # Errors
///
/// Returns `Validation` for a bad field or when no known field is present.
pub fn validate_patch(body: &Map<String, Value>) -> Result<BudgetPatch, BudgetError> {
    let mut patch = BudgetPatch::default();
    if body.contains_key("month") {
        patch.key = Some(BudgetKey::parse(&text(body.get("month")))?);
    }
    if let Some(amount) = body.get("amount") {
        patch.amount_cents = Some(money::parse_amount(amount)?);
    }
    if body.contains_key("notes") {
        patch.notes = Some(text(body.get("notes")));
    }
    if patch == BudgetPatch::default() {
        return Err(BudgetError::Validation("No valid fields to update".into()));
    }
    Ok(patch)
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn create_budget(pool: &PgPool, user_id: Uuid, new: &NewBudget) -> Result<Budget, BudgetError> {
    let sql = format!(
        "INSERT INTO budgets (id, user_id, period_key, amount_cents, notes)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {BUDGET_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(new.key.key())
        .bind(new.amount_cents)
        .bind(&new.notes)
        .fetch_one(pool)
        .await?;
    budget_from_row(&row)
}

pub(crate) fn list_query(user_id: Uuid, key: Option<&BudgetKey>, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = "));
    builder.push_bind(user_id);
    if let Some(key) = key {
        builder.push(" AND period_key = ").push_bind(key.key());
    }
    builder.push(" ORDER BY created_at DESC LIMIT ").push_bind(page.limit);
    builder.push(" OFFSET ").push_bind(page.skip);
    builder
}

/// Budgets newest first, optionally limited to one key.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_budgets(
    pool: &PgPool,
    user_id: Uuid,
    key: Option<&BudgetKey>,
    page: Page,
) -> Result<Vec<Budget>, BudgetError> {
    let rows = list_query(user_id, key, page).build().fetch_all(pool).await?;
    rows.iter().map(budget_from_row).collect()
}

/// Every budget the user has. Used by the spending summary.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_all_budgets(pool: &PgPool, user_id: Uuid) -> Result<Vec<Budget>, BudgetError> {
    let sql = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = $1 ORDER BY created_at DESC");
    let rows = sqlx::query(&sql).bind(user_id).fetch_all(pool).await?;
    rows.iter().map(budget_from_row).collect()
}

/// # Errors
///
/// Returns `NotFound` when the id does not belong to the user.
pub async fn update_budget(
    pool: &PgPool,
    user_id: Uuid,
    budget_id: Uuid,
    patch: &BudgetPatch,
) -> Result<Budget, BudgetError> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE budgets SET updated_at = now()");
    if let Some(key) = &patch.key {
        builder.push(", period_key = ").push_bind(key.key());
    }
    if let Some(amount_cents) = patch.amount_cents {
        builder.push(", amount_cents = ").push_bind(amount_cents);
    }
    if let Some(notes) = &patch.notes {
        builder.push(", notes = ").push_bind(notes.clone());
    }
    builder.push(" WHERE id = ").push_bind(budget_id);
    builder.push(" AND user_id = ").push_bind(user_id);
    builder.push(format!(" RETURNING {BUDGET_COLUMNS}"));

    let row = builder.build().fetch_optional(pool).await?.ok_or(BudgetError::NotFound)?;
    budget_from_row(&row)
}

/// # Errors
///
/// Returns `NotFound` when the id does not belong to the user.
pub async fn delete_budget(pool: &PgPool, user_id: Uuid, budget_id: Uuid) -> Result<(), BudgetError> {
    let result = sqlx::query("DELETE FROM budgets WHERE id = $1 AND user_id = $2")
        .bind(budget_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(BudgetError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
#[path = "budget_test.rs"]
mod tests;
