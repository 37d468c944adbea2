//! LifeFlow REST API Server Binary
//!
//! # Environment Variables
//!
//! See [`lifeflow_api::config`] for the full list. `JWT_SECRET` is required;
//! `RUST_LOG` controls log filtering (default: info).
//!
//! # Example
//!
//! ```bash
//! export JWT_SECRET=change-me-to-something-at-least-32-bytes
//! export DATABASE_URL=sqlite://./data/lifeflow.db
//! export PORT=4000
//! cargo run --bin lifeflow-api
//! ```

use std::path::Path;
use std::sync::Arc;

use lifeflow_api::{
    create_router,
    shutdown::{serve_with_shutdown, GracefulShutdown},
    ApiConfig, AppState,
};
use lifeflow_store::{HabitStore, SqliteHabitStore};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("LifeFlow REST API starting...");

    let config = ApiConfig::from_env()?;
    info!(?config, "configuration loaded");

    let store = connect_store(&config.database_url).await?;
    info!("store connected");

    let port = config.port;
    let shutdown = GracefulShutdown::with_timeout(config.shutdown_timeout);
    let prefix = config.api_prefix.clone();

    let state = AppState::new(store, config)?;
    let router = create_router(state);

    info!("REST API Server Ready");
    info!("  API: http://localhost:{}{}", port, prefix);

    serve_with_shutdown(router, port, shutdown).await?;

    Ok(())
}

async fn connect_store(url: &str) -> Result<Arc<dyn HabitStore>, Box<dyn std::error::Error>> {
    if url.starts_with("postgresql://") || url.starts_with("postgres://") {
        #[cfg(feature = "postgres")]
        {
            info!("  Using PostgreSQL");
            return Ok(Arc::new(
                lifeflow_store::PostgresHabitStore::new(url).await?,
            ));
        }
        #[cfg(not(feature = "postgres"))]
        {
            return Err("PostgreSQL URL provided but postgres feature not enabled".into());
        }
    }

    info!("  Using SQLite");
    let path = url.strip_prefix("sqlite://").unwrap_or(url);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !path.starts_with(':') {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(Arc::new(SqliteHabitStore::new(url).await?))
}
