use time::macros::date;

use super::*;

// =============================================================================
// parse_date / parse_year
// =============================================================================

#[test]
fn parse_date_accepts_iso_dates() {
    assert_eq!(parse_date("2026-01-25").unwrap(), date!(2026 - 01 - 25));
    assert_eq!(parse_date(" 2024-02-29 ").unwrap(), date!(2024 - 02 - 29));
}

#[test]
fn parse_date_rejects_impossible_or_malformed_dates() {
    assert!(matches!(parse_date("2025-02-29"), Err(PeriodError::Date(_))));
    assert!(matches!(parse_date("2026-1-5"), Err(PeriodError::Date(_))));
    assert!(matches!(parse_date("25/01/2026"), Err(PeriodError::Date(_))));
    assert!(matches!(parse_date(""), Err(PeriodError::Date(_))));
}

#[test]
fn format_date_round_trips_through_parse() {
    let day = date!(2026 - 03 - 07);
    assert_eq!(format_date(day), "2026-03-07");
    assert_eq!(parse_date(&format_date(day)).unwrap(), day);
}

#[test]
fn format_date_long_is_human_readable() {
    assert_eq!(format_date_long(date!(2026 - 01 - 05)), "Jan 5, 2026");
    assert_eq!(format_date_long(date!(2025 - 12 - 31)), "Dec 31, 2025");
}

#[test]
fn parse_year_validates_shape_and_range() {
    assert_eq!(parse_year("2026"), Ok(2026));
    assert_eq!(parse_year("26"), Err(PeriodError::YearFormat));
    assert_eq!(parse_year("20x6"), Err(PeriodError::YearFormat));
    assert_eq!(parse_year("1999"), Err(PeriodError::YearOutOfRange));
    assert_eq!(parse_year("2101"), Err(PeriodError::YearOutOfRange));
}

// =============================================================================
// MonthKey
// =============================================================================

#[test]
fn month_key_parse_and_bounds() {
    let month = MonthKey::parse("2026-01").unwrap();
    assert_eq!(month.first_day(), date!(2026 - 01 - 01));
    assert_eq!(month.last_day(), date!(2026 - 01 - 31));
    assert_eq!(month.key(), "2026-01");
    assert_eq!(month.label(), "January 2026");
}

#[test]
fn month_key_february_respects_leap_years() {
    assert_eq!(MonthKey::parse("2024-02").unwrap().last_day(), date!(2024 - 02 - 29));
    assert_eq!(MonthKey::parse("2026-02").unwrap().last_day(), date!(2026 - 02 - 28));
    assert_eq!(MonthKey::parse("2100-02").unwrap().days(), 28);
}

#[test]
fn month_key_december_ends_on_31st() {
    assert_eq!(MonthKey::parse("2025-12").unwrap().last_day(), date!(2025 - 12 - 31));
}

#[test]
fn month_key_rejects_bad_input() {
    assert_eq!(MonthKey::parse("2026-1"), Err(PeriodError::MonthFormat));
    assert_eq!(MonthKey::parse("2026/01"), Err(PeriodError::MonthFormat));
    assert_eq!(MonthKey::parse("2026-ab"), Err(PeriodError::MonthFormat));
    assert_eq!(MonthKey::parse("2026-13"), Err(PeriodError::MonthOutOfRange));
    assert_eq!(MonthKey::parse("2026-00"), Err(PeriodError::MonthOutOfRange));
    assert_eq!(MonthKey::parse("1999-05"), Err(PeriodError::YearOutOfRange));
}

#[test]
fn month_key_previous_crosses_year_boundary() {
    let january = MonthKey::parse("2026-01").unwrap();
    assert_eq!(january.previous().unwrap().key(), "2025-12");
}

#[test]
fn month_key_previous_stops_at_min_year() {
    let first = MonthKey::parse("2000-01").unwrap();
    assert_eq!(first.previous(), Err(PeriodError::YearOutOfRange));
}

// =============================================================================
// DateWindow
// =============================================================================

#[test]
fn window_contains_both_boundaries() {
    let window = DateWindow::between(Some(date!(2026 - 01 - 10)), Some(date!(2026 - 01 - 20)));
    assert!(window.contains(date!(2026 - 01 - 10)));
    assert!(window.contains(date!(2026 - 01 - 20)));
    assert!(window.contains(date!(2026 - 01 - 15)));
    assert!(!window.contains(date!(2026 - 01 - 09)));
    assert!(!window.contains(date!(2026 - 01 - 21)));
}

#[test]
fn window_open_sides_are_unbounded() {
    let from_only = DateWindow::between(Some(date!(2026 - 01 - 10)), None);
    assert!(from_only.contains(date!(2099 - 01 - 01)));
    assert!(!from_only.contains(date!(2026 - 01 - 09)));

    let all = DateWindow::all();
    assert!(all.contains(date!(2000 - 01 - 01)));
    assert!(all.is_unbounded());
}

#[test]
fn window_year_covers_whole_year() {
    let window = DateWindow::year(2026).unwrap();
    assert_eq!(window.from, Some(date!(2026 - 01 - 01)));
    assert_eq!(window.to, Some(date!(2026 - 12 - 31)));
    assert_eq!(window.day_count(), Some(365));
}

#[test]
fn window_inverted_detection() {
    let window = DateWindow::between(Some(date!(2026 - 02 - 01)), Some(date!(2026 - 01 - 01)));
    assert!(window.is_inverted());
    assert!(!DateWindow::between(Some(date!(2026 - 01 - 01)), Some(date!(2026 - 01 - 01))).is_inverted());
}

#[test]
fn window_day_count_is_inclusive() {
    let single = DateWindow::between(Some(date!(2026 - 01 - 01)), Some(date!(2026 - 01 - 01)));
    assert_eq!(single.day_count(), Some(1));
    let week = DateWindow::between(Some(date!(2026 - 01 - 01)), Some(date!(2026 - 01 - 07)));
    assert_eq!(week.day_count(), Some(7));
    assert_eq!(DateWindow::between(Some(date!(2026 - 01 - 01)), None).day_count(), None);
}

#[test]
fn window_includes_month_compares_month_granularity() {
    let window = DateWindow::between(Some(date!(2026 - 01 - 15)), Some(date!(2026 - 03 - 02)));
    assert!(window.includes_month(&MonthKey::parse("2026-01").unwrap()));
    assert!(window.includes_month(&MonthKey::parse("2026-03").unwrap()));
    assert!(!window.includes_month(&MonthKey::parse("2025-12").unwrap()));
    assert!(!window.includes_month(&MonthKey::parse("2026-04").unwrap()));
}

#[test]
fn window_labels() {
    let both = DateWindow::between(Some(date!(2026 - 01 - 01)), Some(date!(2026 - 01 - 31)));
    assert_eq!(both.label(), "Jan 1, 2026 - Jan 31, 2026");
    assert_eq!(DateWindow::between(Some(date!(2026 - 01 - 01)), None).label(), "From Jan 1, 2026");
    assert_eq!(DateWindow::between(None, Some(date!(2026 - 01 - 31))).label(), "Up to Jan 31, 2026");
    assert_eq!(DateWindow::all().label(), "All time");
}

#[test]
fn list_query_prefers_explicit_bounds_then_month_then_year() {
    let explicit = DateWindow::from_list_query(Some("2026-01-05"), None, Some("2025-02"), Some("2024")).unwrap();
    assert_eq!(explicit.from, Some(date!(2026 - 01 - 05)));
    assert_eq!(explicit.to, None);

    let by_month = DateWindow::from_list_query(None, Some(""), Some("2025-02"), Some("2024")).unwrap();
    assert_eq!(by_month.from, Some(date!(2025 - 02 - 01)));
    assert_eq!(by_month.to, Some(date!(2025 - 02 - 28)));

    let by_year = DateWindow::from_list_query(None, None, None, Some("2024")).unwrap();
    assert_eq!(by_year.from, Some(date!(2024 - 01 - 01)));
    assert_eq!(by_year.to, Some(date!(2024 - 12 - 31)));

    assert!(DateWindow::from_list_query(None, None, None, None).unwrap().is_unbounded());
}

#[test]
fn list_query_surfaces_parse_errors() {
    assert!(matches!(
        DateWindow::from_list_query(Some("nope"), None, None, None),
        Err(PeriodError::Date(_))
    ));
    assert_eq!(
        DateWindow::from_list_query(None, None, Some("2026-13"), None),
        Err(PeriodError::MonthOutOfRange)
    );
}

// =============================================================================
// BudgetKey
// =============================================================================

#[test]
fn budget_key_parses_month_and_year() {
    let month = BudgetKey::parse("2026-02").unwrap();
    assert_eq!(month.kind(), "month");
    assert_eq!(month.key(), "2026-02");

    let year = BudgetKey::parse("2026").unwrap();
    assert_eq!(year.kind(), "year");
    assert_eq!(year.key(), "2026");
}

#[test]
fn budget_key_rejects_other_shapes() {
    assert_eq!(BudgetKey::parse("2026-02-01"), Err(PeriodError::BudgetKey));
    assert_eq!(BudgetKey::parse(""), Err(PeriodError::BudgetKey));
    assert_eq!(BudgetKey::parse("2026-13"), Err(PeriodError::MonthOutOfRange));
}

#[test]
fn budget_key_applies_to_periods() {
    let feb = BudgetKey::parse("2026-02").unwrap();
    let yearly = BudgetKey::parse("2026").unwrap();
    let feb_period = Period::Month(MonthKey::parse("2026-02").unwrap());
    let mar_period = Period::Month(MonthKey::parse("2026-03").unwrap());

    assert!(feb.applies_to(&Period::All));
    assert!(feb.applies_to(&feb_period));
    assert!(!feb.applies_to(&mar_period));
    assert!(!yearly.applies_to(&feb_period));

    assert!(feb.applies_to(&Period::Year(2026)));
    assert!(yearly.applies_to(&Period::Year(2026)));
    assert!(!feb.applies_to(&Period::Year(2025)));
}

#[test]
fn budget_key_custom_window_rules() {
    let feb = BudgetKey::parse("2026-02").unwrap();
    let yearly = BudgetKey::parse("2026").unwrap();

    let q1 = Period::Custom(DateWindow::between(Some(date!(2026 - 01 - 01)), Some(date!(2026 - 03 - 31))));
    assert!(feb.applies_to(&q1));
    assert!(!yearly.applies_to(&q1));

    let whole = Period::Custom(DateWindow::between(Some(date!(2025 - 12 - 01)), Some(date!(2027 - 01 - 01))));
    assert!(feb.applies_to(&whole));
    assert!(!yearly.applies_to(&whole));
}

// =============================================================================
// Period
// =============================================================================

#[test]
fn period_defaults_to_current_month() {
    let today = date!(2026 - 10 - 16);
    let period = Period::resolve(None, None, None, None, None, today).unwrap();
    assert_eq!(period, Period::Month(MonthKey::parse("2026-10").unwrap()));
    assert_eq!(period.kind(), "month");
    assert_eq!(period.label(), "October 2026");
}

#[test]
fn period_year_defaults_to_current_year() {
    let today = date!(2026 - 10 - 16);
    let period = Period::resolve(Some("year"), None, None, None, None, today).unwrap();
    assert_eq!(period, Period::Year(2026));
    assert_eq!(period.window().to, Some(date!(2026 - 12 - 31)));
}

#[test]
fn period_custom_rejects_inverted_range() {
    let today = date!(2026 - 10 - 16);
    let err = Period::resolve(Some("custom"), None, None, Some("2026-02-01"), Some("2026-01-01"), today).unwrap_err();
    assert_eq!(err, PeriodError::Inverted);
    assert_eq!(err.to_string(), "Start date cannot be after end date.");
}

#[test]
fn period_unknown_kind_is_rejected() {
    let today = date!(2026 - 10 - 16);
    assert_eq!(
        Period::resolve(Some("week"), None, None, None, None, today),
        Err(PeriodError::UnknownPeriod("week".into()))
    );
}

#[test]
fn period_all_has_unbounded_window() {
    assert!(Period::All.window().is_unbounded());
    assert_eq!(Period::All.label(), "All Time");
}

// =============================================================================
// RangePreset
// =============================================================================

#[test]
fn range_preset_this_and_last_month() {
    let today = date!(2026 - 01 - 16);
    let (window, label) = RangePreset::ThisMonth.resolve(today, None, None).unwrap();
    assert_eq!(window.from, Some(date!(2026 - 01 - 01)));
    assert_eq!(window.to, Some(date!(2026 - 01 - 31)));
    assert_eq!(label, "Jan 1, 2026 - Jan 31, 2026");

    let (window, _) = RangePreset::LastMonth.resolve(today, None, None).unwrap();
    assert_eq!(window.from, Some(date!(2025 - 12 - 01)));
    assert_eq!(window.to, Some(date!(2025 - 12 - 31)));
}

#[test]
fn range_preset_all_and_custom_labels() {
    let today = date!(2026 - 01 - 16);
    let (window, label) = RangePreset::All.resolve(today, Some("2026-01-01"), None).unwrap();
    assert!(window.is_unbounded());
    assert_eq!(label, "All time");

    let (_, label) = RangePreset::Custom.resolve(today, None, None).unwrap();
    assert_eq!(label, "Custom: not set");

    let (_, label) = RangePreset::Custom.resolve(today, None, Some("2026-01-10")).unwrap();
    assert_eq!(label, "Up to Jan 10, 2026");
}

#[test]
fn range_preset_parse() {
    assert_eq!(RangePreset::parse(None), Ok(RangePreset::All));
    assert_eq!(RangePreset::parse(Some("last-month")), Ok(RangePreset::LastMonth));
    assert!(RangePreset::parse(Some("decade")).is_err());
}
