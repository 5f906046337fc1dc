use staylist::{
    AppState,
    config::{AppConfig, Env, StorageBackend},
    create_router,
    repository::{MemoryRepository, PostgresRepository, RepositoryState},
};

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, storage backend construction, and the
/// HTTP server.
#[tokio::main]
async fn main() {
    // Configuration loading (fail-fast on missing production values).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // Log filter: RUST_LOG wins, with sensible local defaults otherwise.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "staylist=debug,tower_http=info,axum=trace".into());

    // Pretty output for local debugging, JSON for log aggregation in
    // production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // Storage backend construction. Both backends sit behind the same
    // repository contract, so nothing downstream knows which one is live.
    let repo: RepositoryState = match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage (no persistence)");
            Arc::new(MemoryRepository::new())
        }
        StorageBackend::Postgres => {
            let db_url = config
                .db_url
                .as_deref()
                .expect("FATAL: DATABASE_URL required for the postgres backend");

            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("FATAL: Failed to run database migrations.");

            tracing::info!("Using Postgres storage");
            Arc::new(PostgresRepository::new(pool))
        }
    };

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState { repo, config };
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: Failed to bind {bind_addr}: {e}"));

    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API documentation (Swagger UI) at /swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
