//! Calendar periods: months, years, inclusive date windows and budget keys.
//!
//! DESIGN
//! ======
//! Dates travel as `YYYY-MM-DD` strings on the wire and as `time::Date`
//! internally. Windows are inclusive on both ends; an open bound means
//! "unbounded" on that side. Month and year keys are limited to 2000..=2100.

use time::macros::format_description;
use time::{Date, Month};

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

const MONTH_ABBR: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("Month must be in YYYY-MM format")]
    MonthFormat,
    #[error("Year must be in YYYY format")]
    YearFormat,
    #[error("Invalid year")]
    YearOutOfRange,
    #[error("Invalid month")]
    MonthOutOfRange,
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),
    #[error("Budget period must be YYYY-MM or YYYY")]
    BudgetKey,
    #[error("Unknown period '{0}'")]
    UnknownPeriod(String),
    #[error("Start date cannot be after end date.")]
    Inverted,
}

// =============================================================================
// DATES
// =============================================================================

/// `serialize_with` adapter that writes a date as `YYYY-MM-DD`.
pub(crate) fn serialize_date<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_date(*date))
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `PeriodError::Date` for anything that is not a real calendar date.
pub fn parse_date(raw: &str) -> Result<Date, PeriodError> {
    let trimmed = raw.trim();
    Date::parse(trimmed, format_description!("[year]-[month]-[day]")).map_err(|_| PeriodError::Date(trimmed.to_owned()))
}

#[must_use]
pub fn format_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Human label, e.g. `Jan 5, 2026`.
#[must_use]
pub fn format_date_long(date: Date) -> String {
    let idx = usize::from(u8::from(date.month())) - 1;
    format!("{} {}, {}", MONTH_ABBR[idx], date.day(), date.year())
}

fn parse_digits(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Parse a `YYYY` year within the supported range.
///
/// # Errors
///
/// Returns `YearFormat` for malformed input and `YearOutOfRange` outside
/// 2000..=2100.
pub fn parse_year(raw: &str) -> Result<i32, PeriodError> {
    let trimmed = raw.trim();
    if trimmed.len() != 4 {
        return Err(PeriodError::YearFormat);
    }
    let year = parse_digits(trimmed).ok_or(PeriodError::YearFormat)?;
    check_year(year)
}

fn check_year(year: i32) -> Result<i32, PeriodError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(PeriodError::YearOutOfRange)
    }
}

// =============================================================================
// MONTH KEY
// =============================================================================

/// One calendar month, stored as its first and last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    first: Date,
    last: Date,
}

impl MonthKey {
    /// # Errors
    ///
    /// Returns an error if the year or month is out of range.
    pub fn new(year: i32, month: u8) -> Result<Self, PeriodError> {
        let year = check_year(year)?;
        let month = Month::try_from(month).map_err(|_| PeriodError::MonthOutOfRange)?;
        let first = Date::from_calendar_date(year, month, 1).map_err(|_| PeriodError::MonthOutOfRange)?;
        let last = if month == Month::December {
            Date::from_calendar_date(year, Month::December, 31).map_err(|_| PeriodError::MonthOutOfRange)?
        } else {
            Date::from_calendar_date(year, month.next(), 1)
                .ok()
                .and_then(Date::previous_day)
                .ok_or(PeriodError::MonthOutOfRange)?
        };
        Ok(Self { first, last })
    }

    /// Parse a `YYYY-MM` key.
    ///
    /// # Errors
    ///
    /// Returns `MonthFormat` for malformed input, otherwise range errors.
    pub fn parse(raw: &str) -> Result<Self, PeriodError> {
        let trimmed = raw.trim();
        if trimmed.len() != 7 || trimmed.as_bytes()[4] != b'-' {
            return Err(PeriodError::MonthFormat);
        }
        let year = parse_digits(&trimmed[..4]).ok_or(PeriodError::MonthFormat)?;
        let month = parse_digits(&trimmed[5..]).ok_or(PeriodError::MonthFormat)?;
        let month = u8::try_from(month).map_err(|_| PeriodError::MonthOutOfRange)?;
        Self::new(year, month)
    }

    /// The month containing `date`.
    ///
    /// # Errors
    ///
    /// Returns `YearOutOfRange` for dates outside the supported years.
    pub fn containing(date: Date) -> Result<Self, PeriodError> {
        Self::new(date.year(), u8::from(date.month()))
    }

    /// # Errors
    ///
    /// Returns `YearOutOfRange` when stepping before January 2000.
    pub fn previous(&self) -> Result<Self, PeriodError> {
        let day = self.first.previous_day().ok_or(PeriodError::YearOutOfRange)?;
        Self::containing(day)
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.first.year()
    }

    #[must_use]
    pub fn month(&self) -> u8 {
        u8::from(self.first.month())
    }

    #[must_use]
    pub fn first_day(&self) -> Date {
        self.first
    }

    #[must_use]
    pub fn last_day(&self) -> Date {
        self.last
    }

    #[must_use]
    pub fn days(&self) -> u8 {
        self.last.day()
    }

    /// `YYYY-MM`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year(), self.month())
    }

    /// `January 2026`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[usize::from(self.month()) - 1], self.year())
    }
}

// =============================================================================
// DATE WINDOW
// =============================================================================

/// Inclusive date window. `None` on a side means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateWindow {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl DateWindow {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn between(from: Option<Date>, to: Option<Date>) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub fn month(month: &MonthKey) -> Self {
        Self { from: Some(month.first_day()), to: Some(month.last_day()) }
    }

    /// January 1 through December 31 of `year`.
    ///
    /// # Errors
    ///
    /// Returns `YearOutOfRange` outside 2000..=2100.
    pub fn year(year: i32) -> Result<Self, PeriodError> {
        let january = MonthKey::new(year, 1)?;
        let december = MonthKey::new(year, 12)?;
        Ok(Self { from: Some(january.first_day()), to: Some(december.last_day()) })
    }

    /// Parse optional `from`/`to` strings. Blank strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::Date` if either bound is not a valid date.
    pub fn parse_bounds(from: Option<&str>, to: Option<&str>) -> Result<Self, PeriodError> {
        let parse = |raw: Option<&str>| -> Result<Option<Date>, PeriodError> {
            match raw.map(str::trim).filter(|s| !s.is_empty()) {
                Some(s) => parse_date(s).map(Some),
                None => Ok(None),
            }
        };
        Ok(Self { from: parse(from)?, to: parse(to)? })
    }

    /// Window for an expense listing. Explicit bounds win, then `month`,
    /// then `year`; with none of them the window is unbounded.
    ///
    /// # Errors
    ///
    /// Returns the first parse error encountered.
    pub fn from_list_query(
        from: Option<&str>,
        to: Option<&str>,
        month: Option<&str>,
        year: Option<&str>,
    ) -> Result<Self, PeriodError> {
        let explicit = Self::parse_bounds(from, to)?;
        if !explicit.is_unbounded() {
            return Ok(explicit);
        }
        if let Some(month) = month.map(str::trim).filter(|s| !s.is_empty()) {
            return Ok(Self::month(&MonthKey::parse(month)?));
        }
        if let Some(year) = year.map(str::trim).filter(|s| !s.is_empty()) {
            return Self::year(parse_year(year)?);
        }
        Ok(Self::all())
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from > to)
    }

    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Whether `month` falls between the months of the two bounds.
    #[must_use]
    pub fn includes_month(&self, month: &MonthKey) -> bool {
        let index = month_index(month.first_day());
        self.from.is_none_or(|from| index >= month_index(from)) && self.to.is_none_or(|to| index <= month_index(to))
    }

    /// Inclusive number of days, when both bounds are set.
    #[must_use]
    pub fn day_count(&self) -> Option<i64> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some(((to - from).whole_days() + 1).max(1)),
            _ => None,
        }
    }

    /// `Jan 1, 2026 - Jan 31, 2026`, `From ...`, `Up to ...` or `All time`.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.from, self.to) {
            (Some(from), Some(to)) => format!("{} - {}", format_date_long(from), format_date_long(to)),
            (Some(from), None) => format!("From {}", format_date_long(from)),
            (None, Some(to)) => format!("Up to {}", format_date_long(to)),
            (None, None) => "All time".to_owned(),
        }
    }
}

fn month_index(date: Date) -> i32 {
    date.year() * 12 + i32::from(u8::from(date.month()))
}

// =============================================================================
// BUDGET KEY
// =============================================================================

/// Budget scope: a single month (`YYYY-MM`) or a whole year (`YYYY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKey {
    Month(MonthKey),
    Year(i32),
}

impl BudgetKey {
    /// # Errors
    ///
    /// Returns `BudgetKey` for unrecognised shapes, otherwise month/year
    /// range errors.
    pub fn parse(raw: &str) -> Result<Self, PeriodError> {
        let trimmed = raw.trim();
        match trimmed.len() {
            7 => MonthKey::parse(trimmed).map(Self::Month),
            4 => parse_year(trimmed).map(Self::Year),
            _ => Err(PeriodError::BudgetKey),
        }
    }

    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Month(month) => month.key(),
            Self::Year(year) => format!("{year:04}"),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Month(_) => "month",
            Self::Year(_) => "year",
        }
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        match self {
            Self::Month(month) => month.year(),
            Self::Year(year) => *year,
        }
    }

    /// Whether a budget with this key counts toward `period`.
    ///
    /// Month periods take only that month's budget; year periods take the
    /// yearly budget and every monthly budget of the year; custom windows
    /// take only monthly budgets whose month overlaps the window.
    #[must_use]
    pub fn applies_to(&self, period: &Period) -> bool {
        match (self, period) {
            (_, Period::All) => true,
            (Self::Month(own), Period::Month(month)) => own == month,
            (Self::Year(_), Period::Month(_)) => false,
            (key, Period::Year(year)) => key.year() == *year,
            (Self::Month(own), Period::Custom(window)) => window.includes_month(own),
            (Self::Year(_), Period::Custom(_)) => false,
        }
    }
}

// =============================================================================
// PERIOD
// =============================================================================

/// Reporting period used by the spending summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Month(MonthKey),
    Year(i32),
    Custom(DateWindow),
}

impl Period {
    /// Resolve a `period` query. Missing month/year default to the ones
    /// containing `today`.
    ///
    /// # Errors
    ///
    /// Returns parse errors, `UnknownPeriod`, or `Inverted` for a custom
    /// window whose start is after its end.
    pub fn resolve(
        kind: Option<&str>,
        month: Option<&str>,
        year: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
        today: Date,
    ) -> Result<Self, PeriodError> {
        let non_blank = |raw: Option<&str>| raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
        match non_blank(kind).as_deref().unwrap_or("month") {
            "all" => Ok(Self::All),
            "month" => match non_blank(month) {
                Some(raw) => MonthKey::parse(&raw).map(Self::Month),
                None => MonthKey::containing(today).map(Self::Month),
            },
            "year" => match non_blank(year) {
                Some(raw) => parse_year(&raw).map(Self::Year),
                None => check_year(today.year()).map(Self::Year),
            },
            "custom" => {
                let window = DateWindow::parse_bounds(from, to)?;
                if window.is_inverted() {
                    return Err(PeriodError::Inverted);
                }
                Ok(Self::Custom(window))
            }
            other => Err(PeriodError::UnknownPeriod(other.to_owned())),
        }
    }

    #[must_use]
    pub fn window(&self) -> DateWindow {
        match self {
            Self::All => DateWindow::all(),
            Self::Month(month) => DateWindow::month(month),
            Self::Year(year) => DateWindow::year(*year).unwrap_or_default(),
            Self::Custom(window) => *window,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Month(_) => "month",
            Self::Year(_) => "year",
            Self::Custom(_) => "custom",
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::All => "All Time".to_owned(),
            Self::Month(month) => month.label(),
            Self::Year(year) => year.to_string(),
            Self::Custom(window) if window.is_unbounded() => "Custom".to_owned(),
            Self::Custom(window) => window.label(),
        }
    }
}

// =============================================================================
// EXPORT RANGE PRESETS
// =============================================================================

/// Relative ranges offered by the export screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    All,
    ThisMonth,
    LastMonth,
    ThisYear,
    Custom,
}

impl RangePreset {
    /// # Errors
    ///
    /// Returns `UnknownPeriod` for unrecognised names.
    pub fn parse(raw: Option<&str>) -> Result<Self, PeriodError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("all") {
            "all" => Ok(Self::All),
            "month" => Ok(Self::ThisMonth),
            "last-month" => Ok(Self::LastMonth),
            "year" => Ok(Self::ThisYear),
            "custom" => Ok(Self::Custom),
            other => Err(PeriodError::UnknownPeriod(other.to_owned())),
        }
    }

    /// Resolve to a window and its display label. `from`/`to` are only read
    /// for `Custom`.
    ///
    /// # Errors
    ///
    /// Returns date parse errors, or `Inverted` for a backwards custom range.
    pub fn resolve(self, today: Date, from: Option<&str>, to: Option<&str>) -> Result<(DateWindow, String), PeriodError> {
        let window = match self {
            Self::All => return Ok((DateWindow::all(), "All time".to_owned())),
            Self::ThisMonth => DateWindow::month(&MonthKey::containing(today)?),
            Self::LastMonth => DateWindow::month(&MonthKey::containing(today)?.previous()?),
            Self::ThisYear => DateWindow::year(today.year())?,
            Self::Custom => {
                let window = DateWindow::parse_bounds(from, to)?;
                if window.is_inverted() {
                    return Err(PeriodError::Inverted);
                }
                if window.is_unbounded() {
                    return Ok((window, "Custom: not set".to_owned()));
                }
                window
            }
        };
        Ok((window, window.label()))
    }
}

#[cfg(test)]
#[path = "period_test.rs"]
mod tests;
