//! Admin password commands.
//!
//! # Usage
//!
//! ```bash
//! # First-time setup (fails if a password already exists)
//! bridgia admin init --password 'long-random-secret'
//!
//! # Rotate the password
//! bridgia admin set-password --current 'old' --new 'new-secret'
//! ```
//!
//! Both go through the same service as the HTTP API, so the same length rule
//! and one-time initialization apply.

use thiserror::Error;

use bridgia_site::db::PgStore;
use bridgia_site::services::auth::{AdminAuthService, AuthError};

use super::{DatabaseError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Set the admin password for the first time.
///
/// # Errors
///
/// Returns `AdminError::Auth` with `AuthError::AlreadyInitialized` if a
/// password has already been set.
pub async fn init(password: &str) -> Result<(), AdminError> {
    let store = PgStore::new(connect().await?);

    AdminAuthService::new(&store)
        .initialize_password(password)
        .await?;

    tracing::info!("Admin password initialized");
    Ok(())
}

/// Change the admin password.
///
/// # Errors
///
/// Returns `AdminError::Auth` if the current password is wrong, the new one
/// is too short, or no password has been set yet.
pub async fn set_password(current: &str, new: &str) -> Result<(), AdminError> {
    let store = PgStore::new(connect().await?);

    AdminAuthService::new(&store)
        .set_password(current, new)
        .await?;

    tracing::info!("Admin password changed");
    Ok(())
}
