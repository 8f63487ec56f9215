use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::SchemaName;

/// Anything that can hand out the pool and the schema the mirrored
/// tables live in.
pub trait PgState {
    fn pool(&self) -> &PgPool;
    fn schema(&self) -> &SchemaName;
}

pub struct PgPoolFactory;

impl PgPoolFactory {
    /// Build a pool without touching the network; connections are opened
    /// on first use, so the app starts even while the database is down.
    pub fn connect_lazy(url: &str, max_connections: u32) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(url)
            .context("invalid DATABASE_URL")?;

        tracing::debug!(max_connections, "postgres pool configured");
        Ok(pool)
    }

    /// Connect eagerly and fail fast when the database is unreachable.
    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .context("failed to connect to postgres")?;

        tracing::info!(max_connections, "postgres pool connected");
        Ok(pool)
    }
}
