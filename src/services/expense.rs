//! Expense records: validation, listing filters and persistence.
//!
//! DESIGN
//! ======
//! Request bodies arrive as loose JSON objects. `validate_new` and
//! `validate_patch` turn them into typed values before anything reaches SQL;
//! unknown keys are ignored. Listing builds a single parameterised query with
//! `QueryBuilder` so every filter is a bind, never string interpolation.

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::category::{CategorySet, MAX_NAME_LEN, OTHER};
use super::money::{self, AmountError, serialize_cents};
use super::page::{Page, PageError};
use super::period::{self, DateWindow, PeriodError, serialize_date};

const EXPENSE_COLUMNS: &str = "id, user_id, title, amount_cents, category, spent_on, notes, created_at, updated_at";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid expense id")]
    InvalidId,
    #[error("Expense not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AmountError> for ExpenseError {
    fn from(err: AmountError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PeriodError> for ExpenseError {
    fn from(err: PeriodError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PageError> for ExpenseError {
    fn from(err: PageError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(rename = "amount", serialize_with = "serialize_cents")]
    pub amount_cents: i64,
    pub category: String,
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,
    pub notes: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

fn expense_from_row(row: &PgRow) -> Expense {
    Expense {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        amount_cents: row.get("amount_cents"),
        category: row.get("category"),
        date: row.get("spent_on"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Validated input for a new expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub title: String,
    pub amount_cents: i64,
    pub category: String,
    pub date: Date,
    pub notes: String,
}

/// Validated partial update. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpensePatch {
    pub title: Option<String>,
    pub amount_cents: Option<i64>,
    pub category: Option<String>,
    pub date: Option<Date>,
    pub notes: Option<String>,
}

impl ExpensePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount_cents.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.notes.is_none()
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// # Errors
///
/// Returns `InvalidId` when `raw` is not a UUID.
pub fn parse_id(raw: &str) -> Result<Uuid, ExpenseError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ExpenseError::InvalidId)
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_owned(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Collapse whitespace; blank becomes `Other`.
///
/// # Errors
///
/// Returns `Validation` for names longer than 32 characters.
pub fn normalize_category(raw: &str) -> Result<String, ExpenseError> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Ok(OTHER.to_owned());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ExpenseError::Validation("Category must be <= 32 characters".into()));
    }
    Ok(name)
}

fn resolve_category(raw: Option<&Value>, allowed: &CategorySet) -> Result<String, ExpenseError> {
    let name = normalize_category(&text(raw))?;
    allowed.resolve(&name).ok_or_else(|| ExpenseError::Validation("Invalid category".into()))
}

fn required_title(raw: Option<&Value>) -> Result<String, ExpenseError> {
    let title = text(raw);
    if title.is_empty() {
        return Err(ExpenseError::Validation("Title is required".into()));
    }
    Ok(title)
}

fn required_date(raw: Option<&Value>) -> Result<Date, ExpenseError> {
    let date = text(raw);
    if date.is_empty() {
        return Err(ExpenseError::Validation("Date is required".into()));
    }
    Ok(period::parse_date(&date)?)
}

/// Validate a create body against the user's categories.
///
/// # Errors
///
/// Returns `Validation` with the first failing field's message.
pub fn validate_new(body: &Map<String, Value>, allowed: &CategorySet) -> Result<NewExpense, ExpenseError> {
    let title = required_title(body.get("title"))?;
    let amount_cents = money::parse_amount(body.get("amount").unwrap_or(&Value::Null))?;
    let date = required_date(body.get("date"))?;
    let category = resolve_category(body.get("category"), allowed)?;
    Ok(NewExpense { title, amount_cents, category, date, notes: text(body.get("notes")) })
}

/// Validate an update body. Only `title`, `amount`, `category`, `date` and
/// `notes` are read.
///
/// # Errors
///
/// Returns `Validation` for a bad field or when no known field is present.
pub fn validate_patch(body: &Map<String, Value>, allowed: &CategorySet) -> Result<ExpensePatch, ExpenseError> {
    let mut patch = ExpensePatch::default();
    if body.contains_key("title") {
        patch.title = Some(required_title(body.get("title"))?);
    }
    if let Some(amount) = body.get("amount") {
        patch.amount_cents = Some(money::parse_amount(amount)?);
    }
    if body.contains_key("category") {
        patch.category = Some(resolve_category(body.get("category"), allowed)?);
    }
    if body.contains_key("date") {
        patch.date = Some(required_date(body.get("date"))?);
    }
    if body.contains_key("notes") {
        patch.notes = Some(text(body.get("notes")));
    }
    if patch.is_empty() {
        return Err(ExpenseError::Validation("No valid fields to update".into()));
    }
    Ok(patch)
}

// =============================================================================
// LISTING FILTER
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

impl SortOrder {
    /// # Errors
    ///
    /// Returns `Validation` for unknown sort names.
    pub fn parse(raw: Option<&str>) -> Result<Self, ExpenseError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("date_desc") {
            "date_desc" => Ok(Self::DateDesc),
            "date_asc" => Ok(Self::DateAsc),
            "amount_desc" => Ok(Self::AmountDesc),
            "amount_asc" => Ok(Self::AmountAsc),
            other => Err(ExpenseError::Validation(format!("Unknown sort '{other}'"))),
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            Self::DateDesc => " ORDER BY spent_on DESC, created_at DESC",
            Self::DateAsc => " ORDER BY spent_on ASC, created_at ASC",
            Self::AmountDesc => " ORDER BY amount_cents DESC, spent_on DESC",
            Self::AmountAsc => " ORDER BY amount_cents ASC, spent_on DESC",
        }
    }
}

/// Filters for the expense history listing.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub window: DateWindow,
    /// Case-insensitive substring matched against title, notes and category.
    pub search: Option<String>,
    /// Exact category; `All` or blank means no filter.
    pub category: Option<String>,
    pub sort: SortOrder,
    pub page: Page,
}

impl ExpenseFilter {
    #[must_use]
    pub fn with_search(mut self, raw: Option<&str>) -> Self {
        self.search = raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
        self
    }

    #[must_use]
    pub fn with_category(mut self, raw: Option<&str>) -> Self {
        self.category = raw
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
            .map(str::to_owned);
        self
    }
}

/// Escape `LIKE` metacharacters so user text matches literally.
pub(crate) fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn push_window(builder: &mut QueryBuilder<'_, Postgres>, window: &DateWindow) {
    if let Some(from) = window.from {
        builder.push(" AND spent_on >= ").push_bind(from);
    }
    if let Some(to) = window.to {
        builder.push(" AND spent_on <= ").push_bind(to);
    }
}

pub(crate) fn list_query(user_id: Uuid, filter: &ExpenseFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_id = "));
    builder.push_bind(user_id);
    push_window(&mut builder, &filter.window);
    if let Some(category) = &filter.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR notes ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR category ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    builder.push(filter.sort.order_by());
    builder.push(" LIMIT ").push_bind(filter.page.limit);
    builder.push(" OFFSET ").push_bind(filter.page.skip);
    builder
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn insert_expense(pool: &PgPool, user_id: Uuid, new: &NewExpense) -> Result<Expense, ExpenseError> {
    let sql = format!(
        "INSERT INTO expenses (id, user_id, title, amount_cents, category, spent_on, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {EXPENSE_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&new.title)
        .bind(new.amount_cents)
        .bind(&new.category)
        .bind(new.date)
        .bind(&new.notes)
        .fetch_one(pool)
        .await?;
    Ok(expense_from_row(&row))
}

/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_expenses(pool: &PgPool, user_id: Uuid, filter: &ExpenseFilter) -> Result<Vec<Expense>, ExpenseError> {
    let rows = list_query(user_id, filter).build().fetch_all(pool).await?;
    Ok(rows.iter().map(expense_from_row).collect())
}

/// Every expense in `window`, newest first. Used by summaries and exports.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_in_window(pool: &PgPool, user_id: Uuid, window: &DateWindow) -> Result<Vec<Expense>, ExpenseError> {
    let mut builder = QueryBuilder::new(format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_id = "));
    builder.push_bind(user_id);
    push_window(&mut builder, window);
    builder.push(SortOrder::DateDesc.order_by());
    let rows = builder.build().fetch_all(pool).await?;
    Ok(rows.iter().map(expense_from_row).collect())
}

/// Apply `patch` to one of the user's expenses.
///
/// # Errors
///
/// Returns `NotFound` when the id does not belong to the user.
pub async fn update_expense(
    pool: &PgPool,
    user_id: Uuid,
    expense_id: Uuid,
    patch: &ExpensePatch,
) -> Result<Expense, ExpenseError> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE expenses SET updated_at = now()");
    if let Some(title) = &patch.title {
        builder.push(", title = ").push_bind(title.clone());
    }
    if let Some(amount_cents) = patch.amount_cents {
        builder.push(", amount_cents = ").push_bind(amount_cents);
    }
    if let Some(category) = &patch.category {
        builder.push(", category = ").push_bind(category.clone());
    }
    if let Some(date) = patch.date {
        builder.push(", spent_on = ").push_bind(date);
    }
    if let Some(notes) = &patch.notes {
        builder.push(", notes = ").push_bind(notes.clone());
    }
    builder.push(" WHERE id = ").push_bind(expense_id);
    builder.push(" AND user_id = ").push_bind(user_id);
    builder.push(format!(" RETURNING {EXPENSE_COLUMNS}"));

    let row = builder.build().fetch_optional(pool).await?.ok_or(ExpenseError::NotFound)?;
    Ok(expense_from_row(&row))
}

/// # Errors
///
/// Returns `NotFound` when the id does not belong to the user.
pub async fn delete_expense(pool: &PgPool, user_id: Uuid, expense_id: Uuid) -> Result<(), ExpenseError> {
    let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
        .bind(expense_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ExpenseError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
#[path = "expense_test.rs"]
mod tests;
