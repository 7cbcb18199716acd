//! PostgreSQL persistence for the notification subsystem.
//!
//! Four tables back delivery: the in-app feed (`notifications`), per-business
//! delivery preferences (`notification_preferences`), web push device
//! registrations (`push_subscriptions`), and the append-only delivery audit
//! trail (`notification_log`).

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Apply any pending migrations from the bundled `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
