mod config;

use std::sync::Arc;

use tracing::info;

use config::Config;
use warble_api::auth::{AppState, AppStateInner};
use warble_api::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warble=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    let db = warble_db::Database::open(&config.db_path)?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        secret_key: config.secret_key.clone(),
        per_page: config.per_page,
    });

    let app = build_router(state);

    let addr = config.bind_addr()?;
    info!("warble listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
