//! Spending summary for a reporting period.
//!
//! DESIGN
//! ======
//! `summarize` is a pure single pass over already-fetched rows: expenses are
//! filtered to the period window, bucketed per category and compared against
//! the budgets whose key applies to the period. Totals stay in cents until
//! serialization so per-category sums always equal the overall total.

use std::collections::HashMap;

use serde::Serialize;
use time::Date;

use super::budget::Budget;
use super::category::{Category, FALLBACK_COLOR, OTHER};
use super::expense::Expense;
use super::money::serialize_cents;
use super::period::{Period, format_date};

/// Divisor for "average daily" when a period has no natural day count.
const DAYS_PER_YEAR: i64 = 365;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub name: String,
    pub color: String,
    #[serde(serialize_with = "serialize_cents")]
    pub total: i64,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    /// Number of budgets counted toward the period.
    pub budgets: usize,
    #[serde(serialize_with = "serialize_cents")]
    pub budgeted: i64,
    #[serde(serialize_with = "serialize_cents")]
    pub spent: i64,
    #[serde(serialize_with = "serialize_cents")]
    pub remaining: i64,
    pub used_pct: f64,
    pub exceeded: bool,
    #[serde(serialize_with = "serialize_cents")]
    pub over_by: i64,
}

impl BudgetStatus {
    fn new(budgets: usize, budgeted: i64, spent: i64) -> Self {
        let exceeded = budgeted > 0 && spent > budgeted;
        let used_pct = if budgeted > 0 { round2((ratio(spent, budgeted) * 100.0).min(100.0)) } else { 0.0 };
        Self {
            budgets,
            budgeted,
            spent,
            remaining: (budgeted - spent).max(0),
            used_pct,
            exceeded,
            over_by: if exceeded { spent - budgeted } else { 0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub period: &'static str,
    pub label: String,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(serialize_with = "serialize_cents")]
    pub total: i64,
    pub count: usize,
    /// Mean amount per expense.
    pub average: f64,
    pub average_daily: f64,
    pub by_category: Vec<CategoryTotal>,
    pub budget: BudgetStatus,
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: i64, denominator: i64) -> f64 {
    numerator as f64 / denominator as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `cents / divisor` in currency units, rounded to two decimals.
fn per_unit(cents: i64, divisor: i64) -> f64 {
    if divisor <= 0 {
        return 0.0;
    }
    round2(ratio(cents, divisor) / 100.0)
}

/// Days to spread the total over when computing the daily average.
///
/// The current month or year counts only the days elapsed so far; past
/// periods use their full length. Custom windows use their inclusive length
/// when both ends are set.
#[must_use]
pub fn daily_divisor(period: &Period, today: Date) -> i64 {
    match period {
        Period::Month(month) if month.first_day() <= today && today <= month.last_day() => i64::from(today.day()),
        Period::Month(month) => i64::from(month.days()),
        Period::Year(year) if *year == today.year() => i64::from(today.ordinal()),
        Period::Year(year) => i64::from(time::util::days_in_year(*year)),
        Period::Custom(window) => window.day_count().unwrap_or(DAYS_PER_YEAR),
        Period::All => DAYS_PER_YEAR,
    }
}

/// Build the summary for `period` from the user's expenses, budgets and
/// categories. Expenses outside the period window are ignored; categories
/// the user no longer has are reported under `Other`.
#[must_use]
pub fn summarize(
    period: &Period,
    today: Date,
    expenses: &[Expense],
    budgets: &[Budget],
    categories: &[Category],
) -> SpendingSummary {
    let window = period.window();
    let colors: HashMap<&str, &str> = categories.iter().map(|c| (c.name.as_str(), c.color.as_str())).collect();

    let mut total = 0_i64;
    let mut count = 0_usize;
    let mut buckets: HashMap<&str, i64> = HashMap::new();
    for expense in expenses.iter().filter(|e| window.contains(e.date)) {
        let bucket = if colors.contains_key(expense.category.as_str()) { expense.category.as_str() } else { OTHER };
        *buckets.entry(bucket).or_default() += expense.amount_cents;
        total += expense.amount_cents;
        count += 1;
    }

    let mut by_category: Vec<CategoryTotal> = buckets
        .into_iter()
        .filter(|(_, cents)| *cents > 0)
        .map(|(name, cents)| CategoryTotal {
            name: name.to_owned(),
            color: colors.get(name).copied().unwrap_or(FALLBACK_COLOR).to_owned(),
            total: cents,
            share_pct: if total > 0 { round2(ratio(cents, total) * 100.0) } else { 0.0 },
        })
        .collect();
    by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

    let applicable: Vec<&Budget> = budgets.iter().filter(|b| b.key.applies_to(period)).collect();
    let budgeted = applicable.iter().map(|b| b.amount_cents).sum();

    let average = per_unit(total, i64::try_from(count).unwrap_or(0));
    let average_daily = per_unit(total, daily_divisor(period, today));

    SpendingSummary {
        period: period.kind(),
        label: period.label(),
        from: window.from.map(format_date),
        to: window.to.map(format_date),
        total,
        count,
        average,
        average_daily,
        by_category,
        budget: BudgetStatus::new(applicable.len(), budgeted, total),
    }
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;
