// Diesel migration runner for PostgreSQL
// Migrations are embedded in the binary; diesel_migrations requires a sync
// connection, so they run in a blocking task at startup.

use diesel::Connection;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use std::error::Error;
use tracing::{debug, info};

use crate::db::MIGRATIONS;

/// Check if migrations should run based on configuration
pub fn should_run_migrations() -> bool {
    !crate::app_config::config().disable_embedded_migrations
}

/// Run all pending Diesel migrations
/// Returns the number of migrations applied
pub async fn run_migrations() -> Result<usize, Box<dyn Error + Send + Sync>> {
    info!("[MIGRATIONS] Starting migration process...");

    let database_url = crate::app_config::config().database_url.clone();

    let applied_migrations =
        tokio::task::spawn_blocking(move || -> Result<usize, Box<dyn Error + Send + Sync>> {
            debug!("[MIGRATIONS] Establishing sync connection for migrations...");

            let mut conn = PgConnection::establish(&database_url)
                .map_err(|e| format!("Failed to establish sync connection: {}", e))?;

            let pending = conn
                .pending_migrations(MIGRATIONS)
                .map_err(|e| format!("Failed to check pending migrations: {}", e))?;

            if pending.is_empty() {
                return Ok(0);
            }

            let applied = conn
                .run_pending_migrations(MIGRATIONS)
                .map_err(|e| format!("Failed to run migrations: {}", e))?;

            Ok(applied.len())
        })
        .await
        .map_err(|e| format!("Migration task panicked: {}", e))??;

    if applied_migrations > 0 {
        info!("[MIGRATIONS] ✓ Applied {} migrations", applied_migrations);
    } else {
        info!("[MIGRATIONS] ✓ Migrations up to date");
    }

    Ok(applied_migrations)
}
