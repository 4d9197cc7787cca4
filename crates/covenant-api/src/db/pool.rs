//! # Database Pool Initialization

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

/// Build a Postgres connection pool and run pending migrations.
///
/// `database_url` comes from process configuration; this is the core's
/// only storage dependency (§6 — persistent state layout).
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        sqlx::Error::Configuration(format!("migration failed: {e}").into())
    })?;

    Ok(pool)
}

/// Health check used by the liveness/readiness probes: a trivial round trip
/// to the database.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    let row: PgRow = sqlx::query("SELECT 1 AS one").fetch_one(pool).await?;
    let _: i32 = row.try_get("one")?;
    Ok(())
}
