//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin credential operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A credential already exists; initialization is one-time.
    #[error("admin password already initialized")]
    AlreadyInitialized,

    /// No credential has been initialized yet.
    #[error("admin password not initialized")]
    NotInitialized,

    /// The presented secret does not match the stored hash.
    #[error("invalid password")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
