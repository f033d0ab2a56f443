//! JSON error envelope shared by every API route.
//!
//! Failures render as `{"success": false, "message": "..."}`. Database and
//! encoder errors are logged here and reported to clients only as
//! `Server error`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::services::auth::AuthError;
use crate::services::budget::BudgetError;
use crate::services::category::CategoryError;
use crate::services::expense::ExpenseError;
use crate::services::export::ExportError;
use crate::services::page::PageError;
use crate::services::period::PeriodError;

pub const SERVER_ERROR: &str = "Server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log `err` and hide its details behind `Server error`.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "request failed");
        Self::Internal(SERVER_ERROR.to_owned())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "success": false, "message": self.to_string() }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => Self::BadRequest(msg.to_owned()),
            AuthError::EmailTaken => Self::Conflict(err.to_string()),
            AuthError::UserNotFound => Self::NotFound(err.to_string()),
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::Password(e) => Self::internal(e),
            AuthError::Database(e) => Self::internal(e),
        }
    }
}

impl From<ExpenseError> for ApiError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::Validation(msg) => Self::BadRequest(msg),
            ExpenseError::InvalidId => Self::BadRequest(err.to_string()),
            ExpenseError::NotFound => Self::NotFound(err.to_string()),
            ExpenseError::Database(e) => Self::internal(e),
        }
    }
}

impl From<BudgetError> for ApiError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::Validation(msg) => Self::BadRequest(msg),
            BudgetError::InvalidId => Self::BadRequest(err.to_string()),
            BudgetError::NotFound => Self::NotFound(err.to_string()),
            BudgetError::StoredKey(_) => Self::internal(err),
            BudgetError::Database(e) => Self::internal(e),
        }
    }
}

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::Database(e) => Self::internal(e),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Empty | ExportError::UnknownFormat(_) | ExportError::Period(_) => {
                Self::BadRequest(err.to_string())
            }
            ExportError::Csv(_) | ExportError::Json(_) | ExportError::Utf8(_) => Self::internal(err),
        }
    }
}

impl From<PeriodError> for ApiError {
    fn from(err: PeriodError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::internal(err)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
