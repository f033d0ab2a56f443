//! Per-user expense categories.
//!
//! Every user has at least the default set; it is seeded lazily the first
//! time their categories are read. Names are unique case-insensitively and
//! colors are unique per user. `Other` always exists and cannot be removed.

use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

pub const OTHER: &str = "Other";
pub const MAX_NAME_LEN: usize = 32;
/// Handed out once the palette is used up. Exempt from the per-user color
/// uniqueness index, so any number of categories may share it.
pub const FALLBACK_COLOR: &str = "#6B7280";

const COLOR_INDEX: &str = "uniq_categories_user_color";

pub const DEFAULT_CATEGORIES: [(&str, &str); 6] = [
    ("Food", "#10B981"),
    ("Transport", "#3B82F6"),
    ("Bills", "#8B5CF6"),
    ("Shopping", "#F59E0B"),
    ("Health", "#EF4444"),
    (OTHER, "#6B7280"),
];

/// Colors handed out, in order, when a new category arrives without one.
pub const PALETTE: [&str; 18] = [
    "#10B981", "#3B82F6", "#8B5CF6", "#F59E0B", "#EF4444", "#6B7280", "#14B8A6", "#6366F1", "#A855F7", "#F97316",
    "#E11D48", "#64748B", "#22C55E", "#0EA5E9", "#D946EF", "#F43F5E", "#84CC16", "#A3A3A3",
];

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Category already exists")]
    Exists,
    #[error("Color already used by another category")]
    ColorTaken,
    #[error("Cannot delete 'Other' category")]
    Protected,
    #[error("Category not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub color: String,
}

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Trim, collapse inner whitespace and enforce the length limit.
///
/// # Errors
///
/// Returns `Validation` for blank or over-long names.
pub fn normalize_name(raw: &str) -> Result<String, CategoryError> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(CategoryError::Validation("Category name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CategoryError::Validation("Category name must be <= 32 characters"));
    }
    Ok(name)
}

/// Validate an optional `#RRGGBB` color. Blank means "pick one for me".
///
/// # Errors
///
/// Returns `Validation` when a non-blank value is not a six-digit hex color.
pub fn normalize_color(raw: Option<&str>) -> Result<Option<String>, CategoryError> {
    let Some(color) = raw.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    let hex = color.strip_prefix('#').unwrap_or_default();
    if color.len() != 7 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CategoryError::Validation("Color must be a hex like #RRGGBB"));
    }
    Ok(Some(color.to_ascii_uppercase()))
}

/// First palette color no existing category uses, or `FALLBACK_COLOR` once the palette
/// is exhausted.
#[must_use]
pub fn pick_unused_color(categories: &[Category]) -> String {
    PALETTE
        .iter()
        .find(|candidate| !categories.iter().any(|c| c.color.eq_ignore_ascii_case(candidate)))
        .map_or_else(|| FALLBACK_COLOR.to_owned(), |c| (*c).to_owned())
}

fn sort_by_name(categories: &mut [Category]) {
    categories.sort_by_cached_key(|c| (c.name.to_lowercase(), c.name.clone()));
}

// =============================================================================
// CATEGORY SET
// =============================================================================

/// Names a user may file expenses under.
#[derive(Debug, Clone, Default)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self { names: names.into_iter().collect() }
    }

    /// Canonical stored spelling of `name`, matched case-insensitively.
    /// `Other` always resolves.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<String> {
        let wanted = name.to_lowercase();
        if let Some(found) = self.names.iter().find(|n| n.to_lowercase() == wanted) {
            return Some(found.clone());
        }
        name.eq_ignore_ascii_case(OTHER).then(|| OTHER.to_owned())
    }
}

impl From<&[Category]> for CategorySet {
    fn from(categories: &[Category]) -> Self {
        Self::new(categories.iter().map(|c| c.name.clone()))
    }
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Seed the default categories for a user who has none.
///
/// # Errors
///
/// Returns a database error if a query fails.
pub async fn ensure_defaults(pool: &PgPool, user_id: Uuid) -> Result<(), CategoryError> {
    let existing: i64 = sqlx::query("SELECT count(*) AS n FROM categories WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?
        .get("n");
    if existing > 0 {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO categories (user_id, name, color) ");
    builder.push_values(DEFAULT_CATEGORIES, |mut row, (name, color)| {
        row.push_bind(user_id).push_bind(name).push_bind(color);
    });
    builder.push(" ON CONFLICT DO NOTHING");
    builder.build().execute(pool).await?;
    tracing::info!(%user_id, "seeded default categories");
    Ok(())
}

/// All categories for a user, sorted case-insensitively by name.
///
/// # Errors
///
/// Returns a database error if a query fails.
pub async fn list_categories(pool: &PgPool, user_id: Uuid) -> Result<Vec<Category>, CategoryError> {
    ensure_defaults(pool, user_id).await?;
    let rows = sqlx::query("SELECT name, color FROM categories WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    let mut categories: Vec<Category> =
        rows.iter().map(|row| Category { name: row.get("name"), color: row.get("color") }).collect();
    sort_by_name(&mut categories);
    Ok(categories)
}

/// # Errors
///
/// Returns a database error if a query fails.
pub async fn load_set(pool: &PgPool, user_id: Uuid) -> Result<CategorySet, CategoryError> {
    let categories = list_categories(pool, user_id).await?;
    Ok(CategorySet::from(categories.as_slice()))
}

/// Add a category and return the updated list.
///
/// # Errors
///
/// Returns validation errors, `Exists`, `ColorTaken`, or a database error.
pub async fn add_category(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    color: Option<&str>,
) -> Result<Vec<Category>, CategoryError> {
    let name = normalize_name(name)?;
    let color = normalize_color(color)?;
    let existing = list_categories(pool, user_id).await?;

    if existing.iter().any(|c| c.name.to_lowercase() == name.to_lowercase()) {
        return Err(CategoryError::Exists);
    }
    let color = match color {
        Some(color) if existing.iter().any(|c| c.color.eq_ignore_ascii_case(&color)) => {
            return Err(CategoryError::ColorTaken);
        }
        Some(color) => color,
        None => pick_unused_color(&existing),
    };

    sqlx::query("INSERT INTO categories (user_id, name, color) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(&name)
        .bind(&color)
        .execute(pool)
        .await
        .map_err(insert_error)?;
    tracing::info!(%user_id, %name, %color, "category added");

    list_categories(pool, user_id).await
}

/// Unique-index violations from a concurrent insert, keyed by which index fired.
fn insert_error(err: sqlx::Error) -> CategoryError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => unique_violation(db.constraint()),
        other => CategoryError::Database(other),
    }
}

pub(crate) fn unique_violation(constraint: Option<&str>) -> CategoryError {
    match constraint {
        Some(COLOR_INDEX) => CategoryError::ColorTaken,
        _ => CategoryError::Exists,
    }
}

/// Remove a category (matched case-insensitively) and return the updated list.
///
/// # Errors
///
/// Returns `Protected` for `Other`, `NotFound`, or a database error.
pub async fn delete_category(pool: &PgPool, user_id: Uuid, name: &str) -> Result<Vec<Category>, CategoryError> {
    let name = normalize_name(name)?;
    if name.eq_ignore_ascii_case(OTHER) {
        return Err(CategoryError::Protected);
    }
    ensure_defaults(pool, user_id).await?;

    let result = sqlx::query("DELETE FROM categories WHERE user_id = $1 AND lower(name) = lower($2)")
        .bind(user_id)
        .bind(&name)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(CategoryError::NotFound);
    }
    tracing::info!(%user_id, %name, "category deleted");

    list_categories(pool, user_id).await
}

#[cfg(test)]
#[path = "category_test.rs"]
mod tests;
