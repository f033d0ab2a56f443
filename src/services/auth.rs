//! Account service: sign-up validation, credential checks, user lookup.

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use super::password;

/// Column list for user rows; queries alias `users` as `u`.
pub(crate) const USER_COLUMNS: &str = "u.id, u.name, u.email, u.created_at, u.updated_at";
pub const MIN_PASSWORD_LEN: usize = 6;

/// Public view of an account. The password hash never leaves this module.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub(crate) fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Email already exists")]
    EmailTaken,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Password(#[from] password::PasswordError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Validated sign-up input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// # Errors
///
/// Returns `AuthError::Validation` naming the first invalid field.
pub fn validate_signup(name: Option<&str>, email: Option<&str>, password: Option<&str>) -> Result<SignUp, AuthError> {
    let name = name.unwrap_or_default().trim();
    if name.is_empty() {
        return Err(AuthError::Validation("Name is required"));
    }
    let email = normalize_email(email.unwrap_or_default());
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required"));
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(AuthError::Validation("Invalid email"));
    }
    let password = password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation("Password must be at least 6 characters"));
    }
    Ok(SignUp { name: name.to_owned(), email, password: password.to_owned() })
}

/// # Errors
///
/// Returns `AuthError::Validation` if either field is blank.
pub fn validate_signin(email: Option<&str>, password: Option<&str>) -> Result<(String, String), AuthError> {
    let email = normalize_email(email.unwrap_or_default());
    let password = password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::Validation("Email and password are required"));
    }
    Ok((email, password.to_owned()))
}

/// Insert a new user with a freshly hashed password.
///
/// # Errors
///
/// Returns `EmailTaken` on a duplicate email, a hashing error, otherwise a
/// database error.
pub async fn create_user(pool: &PgPool, signup: &SignUp) -> Result<User, AuthError> {
    let hash = password::hash_password(&signup.password)?;
    let sql = format!(
        "INSERT INTO users AS u (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(&signup.name)
        .bind(&signup.email)
        .bind(hash)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::EmailTaken,
            other => AuthError::Database(other),
        })?;
    Ok(user_from_row(&row))
}

/// Look up a user by email and check the password.
///
/// # Errors
///
/// Returns `UserNotFound`, `InvalidCredentials`, or a database error.
pub async fn verify_credentials(pool: &PgPool, email: &str, password: &str) -> Result<User, AuthError> {
    let sql = format!("SELECT {USER_COLUMNS}, u.password_hash FROM users u WHERE u.email = $1");
    let row = sqlx::query(&sql)
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let stored: String = row.get("password_hash");
    if !password::verify_password(password, &stored) {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(user_from_row(&row))
}

/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AuthError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1");
    let row = sqlx::query(&sql)
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(user_from_row))
}

/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, AuthError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u ORDER BY u.created_at ASC");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(user_from_row).collect())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
