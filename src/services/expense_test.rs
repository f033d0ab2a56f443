use serde_json::json;
use time::macros::{date, datetime};

use super::*;

fn body(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("test body must be an object"),
    }
}

fn defaults() -> CategorySet {
    CategorySet::new(["Food", "Transport", "Bills", "Shopping", "Health", "Other"].map(str::to_owned))
}

// =============================================================================
// validate_new
// =============================================================================

#[test]
fn new_expense_is_normalized() {
    let new = validate_new(
        &body(json!({
            "title": "  Lunch ",
            "amount": "12.5",
            "category": " food ",
            "date": "2026-02-28",
            "notes": " with team ",
            "userId": "ignored",
        })),
        &defaults(),
    )
    .unwrap();
    assert_eq!(new.title, "Lunch");
    assert_eq!(new.amount_cents, 1250);
    assert_eq!(new.category, "Food");
    assert_eq!(new.date, date!(2026 - 02 - 28));
    assert_eq!(new.notes, "with team");
}

#[test]
fn missing_category_defaults_to_other() {
    let new = validate_new(&body(json!({"title": "Gift", "amount": 5, "date": "2026-01-01"})), &defaults()).unwrap();
    assert_eq!(new.category, "Other");
    assert_eq!(new.notes, "");
}

#[test]
fn title_is_required() {
    let err = validate_new(&body(json!({"title": " ", "amount": 5, "date": "2026-01-01"})), &defaults()).unwrap_err();
    assert_eq!(err.to_string(), "Title is required");
}

#[test]
fn non_positive_or_non_numeric_amounts_are_rejected() {
    let set = defaults();
    for (amount, message) in [
        (json!(0), "Amount must be > 0"),
        (json!(-4.5), "Amount must be > 0"),
        (json!("abc"), "Amount must be a number"),
        (json!(null), "Amount must be a number"),
    ] {
        let err = validate_new(&body(json!({"title": "x", "amount": amount, "date": "2026-01-01"})), &set).unwrap_err();
        assert_eq!(err.to_string(), message);
    }
}

#[test]
fn date_is_required_and_must_be_real() {
    let set = defaults();
    let err = validate_new(&body(json!({"title": "x", "amount": 1})), &set).unwrap_err();
    assert_eq!(err.to_string(), "Date is required");
    let err = validate_new(&body(json!({"title": "x", "amount": 1, "date": "2026-02-30"})), &set).unwrap_err();
    assert!(matches!(err, ExpenseError::Validation(_)));
}

#[test]
fn unknown_category_is_rejected() {
    let err = validate_new(
        &body(json!({"title": "x", "amount": 1, "date": "2026-01-01", "category": "Travel"})),
        &defaults(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Invalid category");
}

#[test]
fn long_category_is_rejected_before_lookup() {
    let err = normalize_category(&"c".repeat(33)).unwrap_err();
    assert_eq!(err.to_string(), "Category must be <= 32 characters");
}

// =============================================================================
// validate_patch
// =============================================================================

#[test]
fn patch_reads_only_known_fields() {
    let patch = validate_patch(&body(json!({"amount": 7, "userId": "x", "createdAt": "y"})), &defaults()).unwrap();
    assert_eq!(patch, ExpensePatch { amount_cents: Some(700), ..ExpensePatch::default() });
}

#[test]
fn empty_patch_is_rejected() {
    let err = validate_patch(&body(json!({"foo": 1})), &defaults()).unwrap_err();
    assert_eq!(err.to_string(), "No valid fields to update");
}

#[test]
fn patch_with_blank_title_is_rejected() {
    let err = validate_patch(&body(json!({"title": ""})), &defaults()).unwrap_err();
    assert_eq!(err.to_string(), "Title is required");
}

#[test]
fn patch_can_clear_notes() {
    let patch = validate_patch(&body(json!({"notes": null})), &defaults()).unwrap();
    assert_eq!(patch.notes.as_deref(), Some(""));
}

// =============================================================================
// ids / sort / search
// =============================================================================

#[test]
fn malformed_id_is_invalid() {
    assert!(matches!(parse_id("not-a-uuid"), Err(ExpenseError::InvalidId)));
    assert_eq!(parse_id(" 00000000-0000-0000-0000-000000000000 ").unwrap(), Uuid::nil());
}

#[test]
fn sort_order_parses_known_names() {
    assert_eq!(SortOrder::parse(None).unwrap(), SortOrder::DateDesc);
    assert_eq!(SortOrder::parse(Some("amount_asc")).unwrap(), SortOrder::AmountAsc);
    assert!(SortOrder::parse(Some("random")).is_err());
}

#[test]
fn like_pattern_escapes_metacharacters() {
    assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
}

#[test]
fn all_category_means_no_filter() {
    let filter = ExpenseFilter::default().with_category(Some("All")).with_search(Some("  "));
    assert!(filter.category.is_none());
    assert!(filter.search.is_none());
}

#[test]
fn list_query_binds_every_filter() {
    let filter = ExpenseFilter {
        window: DateWindow::between(Some(date!(2026 - 01 - 01)), Some(date!(2026 - 01 - 31))),
        sort: SortOrder::AmountDesc,
        ..ExpenseFilter::default()
    }
    .with_category(Some("Food"))
    .with_search(Some("coffee"));
    let query = list_query(Uuid::nil(), &filter);
    let sql = query.sql();
    assert!(sql.contains("WHERE user_id = $1"));
    assert!(sql.contains("spent_on >= $2"));
    assert!(sql.contains("spent_on <= $3"));
    assert!(sql.contains("category = $4"));
    assert!(sql.contains("title ILIKE $5 OR notes ILIKE $6 OR category ILIKE $7"));
    assert!(sql.contains("ORDER BY amount_cents DESC"));
    assert!(sql.ends_with("LIMIT $8 OFFSET $9"));
}

#[test]
fn unfiltered_list_query_only_pages() {
    let query = list_query(Uuid::nil(), &ExpenseFilter::default());
    let sql = query.sql();
    assert!(!sql.contains("spent_on >="));
    assert!(!sql.contains("ILIKE"));
    assert!(sql.contains("ORDER BY spent_on DESC, created_at DESC LIMIT $2 OFFSET $3"));
}

// =============================================================================
// serialization
// =============================================================================

#[test]
fn expense_serializes_wire_shape() {
    let expense = Expense {
        id: Uuid::nil(),
        user_id: Uuid::nil(),
        title: "Lunch".into(),
        amount_cents: 1250,
        category: "Food".into(),
        date: date!(2026 - 03 - 04),
        notes: String::new(),
        created_at: datetime!(2026-03-04 12:00 UTC),
        updated_at: datetime!(2026-03-04 12:00 UTC),
    };
    let value = serde_json::to_value(&expense).unwrap();
    assert_eq!(value["_id"], "00000000-0000-0000-0000-000000000000");
    assert_eq!(value["amount"], 12.5);
    assert_eq!(value["date"], "2026-03-04");
    assert_eq!(value["userId"], "00000000-0000-0000-0000-000000000000");
    assert_eq!(value["updatedAt"], "2026-03-04T12:00:00Z");
}

// =============================================================================
// live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn expense_crud_round_trip() {
    use crate::state::test_helpers::{integration_pool, seed_user};

    let pool = integration_pool().await;
    let user = seed_user(&pool).await;
    let other = seed_user(&pool).await;

    let new = validate_new(&body(json!({"title": "Coffee", "amount": 3.5, "date": "2026-01-15"})), &defaults()).unwrap();
    let created = insert_expense(&pool, user.id, &new).await.expect("insert should succeed");
    assert_eq!(created.amount_cents, 350);

    let filter = ExpenseFilter {
        window: DateWindow::between(Some(date!(2026 - 01 - 15)), Some(date!(2026 - 01 - 15))),
        ..ExpenseFilter::default()
    }
    .with_search(Some("COFF"));
    let listed = list_expenses(&pool, user.id, &filter).await.expect("list should succeed");
    assert_eq!(listed.len(), 1);
    assert!(list_expenses(&pool, other.id, &filter).await.expect("list should succeed").is_empty());

    let patch = validate_patch(&body(json!({"amount": 4})), &defaults()).unwrap();
    let updated = update_expense(&pool, user.id, created.id, &patch).await.expect("update should succeed");
    assert_eq!(updated.amount_cents, 400);
    assert!(matches!(update_expense(&pool, other.id, created.id, &patch).await, Err(ExpenseError::NotFound)));

    delete_expense(&pool, user.id, created.id).await.expect("delete should succeed");
    assert!(matches!(delete_expense(&pool, user.id, created.id).await, Err(ExpenseError::NotFound)));
}
