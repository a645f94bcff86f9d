//! Server binary: loads settings from the environment (and `.env`), prepares the store, serves the API.

use restaurant_manager::{
    app, apply_migrations, ensure_database_exists, AppState, MemoryStore, PgStore, Settings,
    Store, StoreBackend,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("restaurant_manager=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let store: Arc<dyn Store> = match settings.backend {
        StoreBackend::Postgres => {
            let database_url = settings
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL is required for the postgres backend")?;
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(database_url)
                .await?;
            apply_migrations(&pool, &settings.db_schema).await?;
            Arc::new(PgStore::new(pool, settings.db_schema.clone()))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, settings.api_prefix.clone());
    let router = app(state, settings.body_limit);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
