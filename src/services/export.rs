//! Expense export files: CSV, JSON and a printable HTML report.
//!
//! Rows are filtered to a date window and an optional category list, sorted
//! newest first, then rendered in one pass. `excel` is an alias for CSV and
//! `pdf` produces an HTML document meant to be printed to PDF.

use std::fmt::Write;

use serde::Serialize;
use time::Date;
use uuid::Uuid;

use super::category::OTHER;
use super::expense::Expense;
use super::money::{self, cents_to_f64, serialize_cents};
use super::period::{DateWindow, PeriodError, format_date, serialize_date};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No expenses to export.")]
    Empty,
    #[error("Unknown export format '{0}'")]
    UnknownFormat(String),
    #[error(transparent)]
    Period(#[from] PeriodError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Pdf,
    Excel,
}

impl ExportFormat {
    /// # Errors
    ///
    /// Returns `UnknownFormat` for anything but csv, json, pdf or excel.
    pub fn parse(raw: Option<&str>) -> Result<Self, ExportError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_ascii_lowercase).as_deref() {
            None | Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            Some("pdf") => Ok(Self::Pdf),
            Some("excel") => Ok(Self::Excel),
            Some(other) => Err(ExportError::UnknownFormat(other.to_owned())),
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv | Self::Excel => "csv",
            Self::Json => "json",
            Self::Pdf => "html",
        }
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv | Self::Excel => "text/csv; charset=utf-8",
            Self::Json => "application/json; charset=utf-8",
            Self::Pdf => "text/html; charset=utf-8",
        }
    }
}

/// What to export and how.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub window: DateWindow,
    /// Shown in the HTML report header.
    pub range_label: String,
    /// `None` exports every category.
    pub categories: Option<Vec<String>>,
    pub include_notes: bool,
    pub currency_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Parse `a,b,c`. Blank input or an `All` entry means no category filter.
#[must_use]
pub fn parse_categories(raw: Option<&str>) -> Option<Vec<String>> {
    let names: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if names.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case("all")) {
        return None;
    }
    Some(names)
}

#[must_use]
pub fn filename(format: ExportFormat, today: Date) -> String {
    format!("expenses-export-{}.{}", format_date(today), format.extension())
}

fn category_of(expense: &Expense) -> &str {
    if expense.category.is_empty() { OTHER } else { expense.category.as_str() }
}

/// Rows inside the window and category filter, newest date first.
#[must_use]
pub fn select_rows<'a>(expenses: &'a [Expense], options: &ExportOptions) -> Vec<&'a Expense> {
    let mut rows: Vec<&Expense> = expenses
        .iter()
        .filter(|e| options.window.contains(e.date))
        .filter(|e| {
            options
                .categories
                .as_ref()
                .is_none_or(|wanted| wanted.iter().any(|c| c == category_of(e)))
        })
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

/// Render the export file.
///
/// # Errors
///
/// Returns `Empty` when no rows survive filtering, otherwise encoder errors.
pub fn render(expenses: &[Expense], options: &ExportOptions, today: Date) -> Result<ExportFile, ExportError> {
    let rows = select_rows(expenses, options);
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }
    let body = match options.format {
        ExportFormat::Csv | ExportFormat::Excel => render_csv(&rows, options.include_notes)?,
        ExportFormat::Json => render_json(&rows, options.include_notes)?,
        ExportFormat::Pdf => render_html(&rows, options),
    };
    Ok(ExportFile { filename: filename(options.format, today), content_type: options.format.content_type(), body })
}

// =============================================================================
// CSV
// =============================================================================

fn render_csv(rows: &[&Expense], include_notes: bool) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut header = vec!["Date", "Title", "Amount", "Category"];
    if include_notes {
        header.push("Notes");
    }
    writer.write_record(&header)?;

    for expense in rows {
        let mut record = vec![
            format_date(expense.date),
            expense.title.clone(),
            cents_to_f64(expense.amount_cents).to_string(),
            category_of(expense).to_owned(),
        ];
        if include_notes {
            record.push(expense.notes.clone());
        }
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

// =============================================================================
// JSON
// =============================================================================

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(rename = "_id")]
    id: Uuid,
    title: &'a str,
    #[serde(serialize_with = "serialize_cents")]
    amount: i64,
    category: &'a str,
    #[serde(serialize_with = "serialize_date")]
    date: Date,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

fn render_json(rows: &[&Expense], include_notes: bool) -> Result<String, ExportError> {
    let items: Vec<JsonRow<'_>> = rows
        .iter()
        .map(|e| JsonRow {
            id: e.id,
            title: &e.title,
            amount: e.amount_cents,
            category: category_of(e),
            date: e.date,
            notes: include_notes.then_some(e.notes.as_str()),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)?)
}

// =============================================================================
// HTML
// =============================================================================

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

const HTML_HEAD: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Expenses Export</title>
  <style>
    body{font-family:system-ui,Segoe UI,Roboto,Arial; padding:24px;}
    h1{margin:0 0 8px;}
    .meta{color:#555; margin-bottom:16px;}
    table{border-collapse:collapse; width:100%;}
    th,td{border:1px solid #ddd; padding:8px; font-size:12px;}
    th{background:#f5f5f5; text-align:left;}
  </style>
</head>
<body>
  <h1>Expenses Export</h1>
"#;

const HTML_TAIL: &str = r#"    </tbody>
  </table>
  <p style="color:#666; margin-top:16px;">Tip: open this file in a browser and print it to PDF.</p>
</body>
</html>
"#;

fn render_html(rows: &[&Expense], options: &ExportOptions) -> String {
    let total: i64 = rows.iter().map(|e| e.amount_cents).sum();
    let mut html = String::from(HTML_HEAD);

    // Writing into a String cannot fail.
    let _ = writeln!(
        html,
        "  <div class=\"meta\">Rows: {} \u{2022} Total: {} \u{2022} Range: {}</div>",
        rows.len(),
        escape_html(&money::format_grouped(total, &options.currency_symbol)),
        escape_html(&options.range_label),
    );
    html.push_str("  <table>\n    <thead>\n      <tr>\n        ");
    html.push_str("<th>Date</th><th>Title</th><th>Amount</th><th>Category</th>");
    if options.include_notes {
        html.push_str("<th>Notes</th>");
    }
    html.push_str("\n      </tr>\n    </thead>\n    <tbody>\n");

    for expense in rows {
        let _ = write!(
            html,
            "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            format_date(expense.date),
            escape_html(&expense.title),
            money::format_plain(expense.amount_cents),
            escape_html(category_of(expense)),
        );
        if options.include_notes {
            let _ = write!(html, "<td>{}</td>", escape_html(&expense.notes));
        }
        html.push_str("</tr>\n");
    }

    html.push_str(HTML_TAIL);
    html
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
