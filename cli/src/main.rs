use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, HeaderMap, HeaderValue};
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing session token; pass --token or set SPENDBOOK_TOKEN")]
    MissingToken,
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("server returned {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: std::io::Error },
}

#[derive(Parser, Debug)]
#[command(name = "spendbook", about = "Spendbook expense tracker API CLI")]
struct Cli {
    #[arg(long, env = "SPENDBOOK_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "SPENDBOOK_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in and print the bearer token to reuse via `SPENDBOOK_TOKEN`.
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Me,
    Logout,
    Expense(ExpenseCommand),
    Budget(BudgetCommand),
    Category(CategoryCommand),
    Summary(SummaryArgs),
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ExpenseCommand {
    #[command(subcommand)]
    command: ExpenseSubcommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseSubcommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, help = "YYYY-MM-DD")]
        date: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    List(ExpenseListArgs),
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug, Default)]
struct ExpenseListArgs {
    #[arg(long)]
    month: Option<String>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    to: Option<String>,
    #[arg(long)]
    q: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long, help = "date_desc, date_asc, amount_desc or amount_asc")]
    sort: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    skip: Option<u32>,
}

#[derive(Args, Debug)]
struct BudgetCommand {
    #[command(subcommand)]
    command: BudgetSubcommand,
}

#[derive(Subcommand, Debug)]
enum BudgetSubcommand {
    Add {
        #[arg(long, help = "YYYY-MM for a monthly budget, YYYY for a yearly one")]
        month: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        notes: Option<String>,
    },
    List {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        skip: Option<u32>,
    },
    Update {
        id: String,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct CategoryCommand {
    #[command(subcommand)]
    command: CategorySubcommand,
}

#[derive(Subcommand, Debug)]
enum CategorySubcommand {
    List,
    Add {
        name: String,
        #[arg(long, help = "#RRGGBB; picked from the palette when omitted")]
        color: Option<String>,
    },
    Delete {
        name: String,
    },
}

#[derive(Args, Debug, Default)]
struct SummaryArgs {
    #[arg(long, help = "month, year, custom or all")]
    period: Option<String>,
    #[arg(long)]
    month: Option<String>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    to: Option<String>,
}

#[derive(Args, Debug, Default)]
struct ExportArgs {
    #[arg(long, help = "csv, json, pdf or excel")]
    format: Option<String>,
    #[arg(long, help = "all, month, last-month, year or custom")]
    range: Option<String>,
    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    to: Option<String>,
    #[arg(long, help = "Comma-separated category names")]
    categories: Option<String>,
    #[arg(long, default_value_t = false, help = "Leave the notes column out")]
    no_notes: bool,
    #[arg(long, help = "Output path; defaults to the server-suggested filename")]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url, token: cli.token };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Signup { name, email, password } => {
            let body = serde_json::json!({ "name": name, "email": email, "password": password });
            let json = public_request(&ctx, reqwest::Method::POST, &["api", "auth", "signup"], Some(body)).await?;
            print_json(&json)
        }
        Command::Signin { email, password } => {
            let body = serde_json::json!({ "email": email, "password": password });
            let json = public_request(&ctx, reqwest::Method::POST, &["api", "auth", "signin"], Some(body)).await?;
            print_json(&json)
        }
        Command::Me => {
            let json = api_request(&ctx, reqwest::Method::GET, &["api", "auth", "me"], &[], None).await?;
            print_json(&json)
        }
        Command::Logout => {
            let json = api_request(&ctx, reqwest::Method::POST, &["api", "auth", "logout"], &[], None).await?;
            print_json(&json)
        }
        Command::Expense(expense) => run_expense(&ctx, expense).await,
        Command::Budget(budget) => run_budget(&ctx, budget).await,
        Command::Category(category) => run_category(&ctx, category).await,
        Command::Summary(args) => {
            let query = summary_query(&args);
            let json = api_request(&ctx, reqwest::Method::GET, &["api", "reports", "summary"], &query, None).await?;
            print_json(&json)
        }
        Command::Export(args) => run_export(&ctx, args).await,
    }
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    let url = api_url(&cli.base_url, &["healthz"])?;
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_expense(cli: &CliContext, expense: ExpenseCommand) -> Result<(), CliError> {
    match expense.command {
        ExpenseSubcommand::Add { title, amount, date, category, notes } => {
            let body = fields(vec![
                ("title", Some(Value::String(title))),
                ("amount", Some(Value::from(amount))),
                ("date", Some(Value::String(date))),
                ("category", category.map(Value::String)),
                ("notes", notes.map(Value::String)),
            ]);
            let json = api_request(cli, reqwest::Method::POST, &["api", "expenses", "add"], &[], Some(body)).await?;
            print_json(&json)
        }
        ExpenseSubcommand::List(args) => {
            let query = expense_list_query(&args);
            let json = api_request(cli, reqwest::Method::GET, &["api", "expenses"], &query, None).await?;
            print_json(&json)
        }
        ExpenseSubcommand::Update { id, title, amount, date, category, notes } => {
            let body = fields(vec![
                ("title", title.map(Value::String)),
                ("amount", amount.map(Value::from)),
                ("date", date.map(Value::String)),
                ("category", category.map(Value::String)),
                ("notes", notes.map(Value::String)),
            ]);
            let path = ["api", "expenses", id.as_str()];
            let json = api_request(cli, reqwest::Method::PATCH, &path, &[], Some(body)).await?;
            print_json(&json)
        }
        ExpenseSubcommand::Delete { id } => {
            let path = ["api", "expenses", id.as_str()];
            let json = api_request(cli, reqwest::Method::DELETE, &path, &[], None).await?;
            print_json(&json)
        }
    }
}

async fn run_budget(cli: &CliContext, budget: BudgetCommand) -> Result<(), CliError> {
    match budget.command {
        BudgetSubcommand::Add { month, amount, notes } => {
            let body = fields(vec![
                ("month", Some(Value::String(month))),
                ("amount", Some(Value::from(amount))),
                ("notes", notes.map(Value::String)),
            ]);
            let json = api_request(cli, reqwest::Method::POST, &["api", "budgets", "add"], &[], Some(body)).await?;
            print_json(&json)
        }
        BudgetSubcommand::List { month, limit, skip } => {
            let query = query_pairs(vec![
                ("month", month),
                ("limit", limit.map(|v| v.to_string())),
                ("skip", skip.map(|v| v.to_string())),
            ]);
            let json = api_request(cli, reqwest::Method::GET, &["api", "budgets"], &query, None).await?;
            print_json(&json)
        }
        BudgetSubcommand::Update { id, month, amount, notes } => {
            let body = fields(vec![
                ("month", month.map(Value::String)),
                ("amount", amount.map(Value::from)),
                ("notes", notes.map(Value::String)),
            ]);
            let path = ["api", "budgets", id.as_str()];
            let json = api_request(cli, reqwest::Method::PUT, &path, &[], Some(body)).await?;
            print_json(&json)
        }
        BudgetSubcommand::Delete { id } => {
            let path = ["api", "budgets", id.as_str()];
            let json = api_request(cli, reqwest::Method::DELETE, &path, &[], None).await?;
            print_json(&json)
        }
    }
}

async fn run_category(cli: &CliContext, category: CategoryCommand) -> Result<(), CliError> {
    match category.command {
        CategorySubcommand::List => {
            let json = api_request(cli, reqwest::Method::GET, &["api", "settings", "categories"], &[], None).await?;
            print_json(&json)
        }
        CategorySubcommand::Add { name, color } => {
            let body = fields(vec![("name", Some(Value::String(name))), ("color", color.map(Value::String))]);
            let json = api_request(cli, reqwest::Method::POST, &["api", "settings", "categories"], &[], Some(body)).await?;
            print_json(&json)
        }
        CategorySubcommand::Delete { name } => {
            let path = ["api", "settings", "categories", name.as_str()];
            let json = api_request(cli, reqwest::Method::DELETE, &path, &[], None).await?;
            print_json(&json)
        }
    }
}

async fn run_export(cli: &CliContext, args: ExportArgs) -> Result<(), CliError> {
    let query = export_query(&args);
    let response = send(cli, reqwest::Method::GET, &["api", "reports", "export"], &query, None, true).await?;
    let status = response.status();
    if !status.is_success() {
        let value = response.json::<Value>().await.unwrap_or(Value::Null);
        return Err(CliError::ServerError { status: status.as_u16(), message: error_message(&value) });
    }

    let suggested = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(attachment_filename)
        .unwrap_or_else(|| "expenses-export.csv".to_owned());
    let path = args.out.unwrap_or_else(|| PathBuf::from(suggested));

    let bytes = response.bytes().await?;
    std::fs::write(&path, &bytes).map_err(|source| CliError::Write { path: path.display().to_string(), source })?;
    println!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

// =============================================================================
// HTTP
// =============================================================================

async fn send(
    cli: &CliContext,
    method: reqwest::Method,
    path: &[&str],
    query: &[(&'static str, String)],
    body: Option<Value>,
    authenticated: bool,
) -> Result<reqwest::Response, CliError> {
    let mut headers = HeaderMap::new();
    if authenticated {
        let token = cli.token.as_deref().ok_or(CliError::MissingToken)?;
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    }

    let client = reqwest::Client::builder().default_headers(headers).build()?;
    let url = api_url(&cli.base_url, path)?;

    let request = client.request(method, url).query(query);
    let request = if let Some(json) = body { request.json(&json) } else { request };
    Ok(request.send().await?)
}

async fn api_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &[&str],
    query: &[(&'static str, String)],
    body: Option<Value>,
) -> Result<Value, CliError> {
    let response = send(cli, method, path, query, body, true).await?;
    read_json(response).await
}

async fn public_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &[&str],
    body: Option<Value>,
) -> Result<Value, CliError> {
    let response = send(cli, method, path, &[], body, false).await?;
    read_json(response).await
}

async fn read_json(response: reqwest::Response) -> Result<Value, CliError> {
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or_else(|_| Value::Null);

    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: error_message(&value) });
    }

    Ok(value)
}

// =============================================================================
// HELPERS
// =============================================================================

/// Pulls `message` out of the error envelope, falling back to the raw body.
fn error_message(value: &Value) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .map_or_else(|| value.to_string(), str::to_owned)
}

/// JSON object containing only the fields that were supplied.
fn fields(entries: Vec<(&str, Option<Value>)>) -> Value {
    let map: Map<String, Value> = entries
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_owned(), v)))
        .collect();
    Value::Object(map)
}

fn query_pairs(entries: Vec<(&'static str, Option<String>)>) -> Vec<(&'static str, String)> {
    entries
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
}

fn expense_list_query(args: &ExpenseListArgs) -> Vec<(&'static str, String)> {
    query_pairs(vec![
        ("month", args.month.clone()),
        ("year", args.year.clone()),
        ("from", args.from.clone()),
        ("to", args.to.clone()),
        ("q", args.q.clone()),
        ("category", args.category.clone()),
        ("sort", args.sort.clone()),
        ("limit", args.limit.map(|v| v.to_string())),
        ("skip", args.skip.map(|v| v.to_string())),
    ])
}

fn summary_query(args: &SummaryArgs) -> Vec<(&'static str, String)> {
    query_pairs(vec![
        ("period", args.period.clone()),
        ("month", args.month.clone()),
        ("year", args.year.clone()),
        ("from", args.from.clone()),
        ("to", args.to.clone()),
    ])
}

fn export_query(args: &ExportArgs) -> Vec<(&'static str, String)> {
    query_pairs(vec![
        ("format", args.format.clone()),
        ("range", args.range.clone()),
        ("from", args.from.clone()),
        ("to", args.to.clone()),
        ("categories", args.categories.clone()),
        ("include_notes", args.no_notes.then(|| "false".to_owned())),
    ])
}

/// `base_url` joined with `segments`, each percent-encoded as a single path
/// segment, so a category named `a/b` stays one segment.
fn api_url(base_url: &str, segments: &[&str]) -> Result<reqwest::Url, CliError> {
    let mut url = reqwest::Url::parse(base_url).map_err(|e| CliError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| CliError::InvalidBaseUrl(base_url.to_owned()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// `attachment; filename="x.csv"` -> `x.csv`.
fn attachment_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_owned())
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
