mod config;
mod db;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real environment variables still apply.
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    let port = config.port;
    let state = state::AppState::new(pool, config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "spendbook listening");
    axum::serve(listener, app).await.expect("server failed");
}
