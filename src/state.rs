//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool and the parsed configuration. Nothing mutable is
//! kept in memory; every request reads and writes through Postgres.

use std::sync::Arc;

use sqlx::PgPool;
use time::{Date, OffsetDateTime};

use crate::config::AppConfig;

/// Shared application state. Clone is required by Axum; both fields are
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self { pool, config: Arc::new(config) }
    }

    /// Calendar date used to resolve "this month" style periods.
    #[must_use]
    pub fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}
