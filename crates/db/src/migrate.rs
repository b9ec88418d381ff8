//! Idempotent DDL execution against the MySQL pool.

use anyhow::Context;
use sqlx::mysql::MySqlPool;

/// Execute a single migration statement. Statements are expected to be
/// idempotent (`CREATE TABLE IF NOT EXISTS ...`); nothing is recorded.
pub async fn apply(pool: &MySqlPool, module: &str, id: &str, up: &str) -> anyhow::Result<()> {
    tracing::info!(target: "bookstore-db", module, migration = id, "applying migration");

    sqlx::raw_sql(up)
        .execute(pool)
        .await
        .with_context(|| format!("migration '{module}/{id}' failed"))?;

    tracing::info!(target: "bookstore-db", module, migration = id, "migration applied");
    Ok(())
}
