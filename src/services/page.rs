//! `limit`/`skip` paging for list endpoints.

pub const DEFAULT_LIMIT: i64 = 200;
pub const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("{0} must be an integer")]
    NotAnInteger(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub skip: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, skip: 0 }
    }
}

impl Page {
    /// Parse raw query values. `limit` is clamped to `1..=MAX_LIMIT` and a
    /// negative `skip` becomes 0.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInteger` naming the offending parameter.
    pub fn parse(limit: Option<&str>, skip: Option<&str>) -> Result<Self, PageError> {
        let limit = parse_int("limit", limit)?.unwrap_or(DEFAULT_LIMIT);
        let skip = parse_int("skip", skip)?.unwrap_or(0);
        Ok(Self { limit: limit.clamp(1, MAX_LIMIT), skip: skip.max(0) })
    }
}

fn parse_int(name: &'static str, raw: Option<&str>) -> Result<Option<i64>, PageError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.parse().map(Some).map_err(|_| PageError::NotAnInteger(name)),
        None => Ok(None),
    }
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
