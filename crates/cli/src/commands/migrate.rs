//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! registry-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `REGISTRY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migration files live in `crates/server/migrations/`.

use customer_registry_server::config::database_url_from_env;
use customer_registry_server::db;

use super::CommandError;

/// Apply all pending registry migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to registry database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running registry migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Registry migrations complete");
    Ok(())
}
