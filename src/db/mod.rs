//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! Hosts call [`init_pool`] once at startup to build the shared SQLx pool
//! and bring the schema up to date before constructing the session
//! controller or spawning the refresh task.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::services::refresh::env_parse;

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// Pool size defaults to a small client-appropriate cap and can be raised
/// via `DB_MAX_CONNECTIONS`.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS))
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
