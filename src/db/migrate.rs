use sqlx::PgPool;
use tracing::info;

use crate::error::StoreError;

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Create the snapshot table and its index when missing. Runs on every start.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("snapshot schema ready");
    Ok(())
}
