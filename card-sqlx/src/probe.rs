use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use sqlx::PgPool;

use crate::SchemaName;

/// Whether `schema` exists in the connected database.
pub async fn schema_exists(pool: &PgPool, schema: &SchemaName) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name = $1",
    )
    .bind(schema.as_str())
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Watches for the schema the sync service creates when it is provisioned.
///
/// Once the schema has been seen the answer is cached for the life of the
/// process; a miss is re-checked on every call.
pub struct SchemaProbe {
    pool: PgPool,
    schema: SchemaName,
    seen: AtomicBool,
}

impl SchemaProbe {
    pub fn new(pool: PgPool, schema: SchemaName) -> Self {
        Self {
            pool,
            schema,
            seen: AtomicBool::new(false),
        }
    }

    pub async fn is_ready(&self) -> Result<bool> {
        if self.seen.load(Ordering::Acquire) {
            return Ok(true);
        }

        let exists = schema_exists(&self.pool, &self.schema).await?;
        if exists {
            tracing::info!(schema = %self.schema, "sync schema detected");
            self.seen.store(true, Ordering::Release);
        } else {
            tracing::debug!(schema = %self.schema, "sync schema not present yet");
        }
        Ok(exists)
    }
}
