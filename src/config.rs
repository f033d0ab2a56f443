//! Service configuration parsed from environment variables.
//!
//! `.env` is loaded by `main` before this runs, so every setting can come
//! from either the process environment or the dotenv file.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SESSION_TTL_SECS: i64 = 2_592_000;
pub const DEFAULT_CURRENCY_SYMBOL: &str = "৳";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Lifetime of a bearer session issued by sign-in.
    pub session_ttl_secs: i64,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    pub currency_symbol: String,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `SESSION_TTL_SECS`: default 2592000 (30 days)
    /// - `CORS_ORIGINS`: comma-separated list, empty allows any origin
    /// - `CURRENCY_SYMBOL`: prefix used in rendered exports
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a numeric setting
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |key: &str| std::env::var(key).ok();
        Self::from_lookup(var)
    }

    /// Build config from an arbitrary key lookup. `from_env` delegates here.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            port: parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?,
            session_ttl_secs: parse_or("SESSION_TTL_SECS", lookup("SESSION_TTL_SECS"), DEFAULT_SESSION_TTL_SECS)?,
            cors_origins: parse_origins(lookup("CORS_ORIGINS").as_deref()),
            currency_symbol: lookup("CURRENCY_SYMBOL").unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_owned()),
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: value.to_owned() }),
    }
}

pub(crate) fn parse_origins(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
