//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! bridgia migrate
//! ```
//!
//! Migrations live in `crates/site/migrations/` and are embedded into the
//! site crate at build time.

use thiserror::Error;

use bridgia_site::db::MIGRATOR;

use super::{DatabaseError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run pending site database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running site migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Site migrations complete!");
    Ok(())
}
