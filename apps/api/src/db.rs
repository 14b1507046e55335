use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the connection pool shared by every handler.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!(max_connections = MAX_CONNECTIONS, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("PostgreSQL pool ready");
    Ok(pool)
}

/// Applies the bundled reference schema. Only used when `RUN_MIGRATIONS` is set;
/// production databases are managed externally.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Applying database migrations");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Database migration failed")?;
    info!("Database migrations applied");
    Ok(())
}
