//! Admin authentication service.
//!
//! Owns the lifecycle of the single admin secret:
//!
//! ```text
//! Unset --initialize_password--> Set --set_password--> Set
//! ```
//!
//! There is no way back to `Unset`. Successful [`AdminAuthService::login`]
//! only proves the secret; issuing the session marker is the caller's job.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash as ParsedHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::instrument;

use bridgia_core::PasswordHash;

use crate::db::{CredentialStore, RepositoryError};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Admin authentication service.
///
/// Generic over the store so it can borrow either a concrete backend or the
/// `dyn Store` held by `AppState`.
pub struct AdminAuthService<'a, S: ?Sized> {
    credentials: &'a S,
}

impl<'a, S: CredentialStore + ?Sized> AdminAuthService<'a, S> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(credentials: &'a S) -> Self {
        Self { credentials }
    }

    /// Set the admin secret for the first time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::AlreadyInitialized` if a credential exists, including
    /// when a concurrent caller won the race.
    #[instrument(skip_all)]
    pub async fn initialize_password(&self, password: &str) -> Result<(), AuthError> {
        validate_password(password)?;

        if self.credentials.get_credential().await?.is_some() {
            return Err(AuthError::AlreadyInitialized);
        }

        let hash = hash_blocking(password).await?;
        self.credentials
            .insert_credential(&hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AlreadyInitialized,
                other => AuthError::Repository(other),
            })?;

        tracing::info!("Admin password initialized");
        Ok(())
    }

    /// Replace the admin secret, given proof of the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password is too short.
    /// Returns `AuthError::NotInitialized` if no credential exists.
    /// Returns `AuthError::InvalidCredentials` if `current` does not match;
    /// the stored secret is left unchanged.
    #[instrument(skip_all)]
    pub async fn set_password(&self, current: &str, new: &str) -> Result<(), AuthError> {
        validate_password(new)?;

        let credential = self
            .credentials
            .get_credential()
            .await?
            .ok_or(AuthError::NotInitialized)?;

        verify_blocking(current, credential.password_hash).await?;

        let hash = hash_blocking(new).await?;
        self.credentials
            .replace_credential(&hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::NotInitialized,
                other => AuthError::Repository(other),
            })?;

        tracing::info!("Admin password changed");
        Ok(())
    }

    /// Check a login attempt against the stored secret.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotInitialized` if no credential exists.
    /// Returns `AuthError::InvalidCredentials` on mismatch.
    #[instrument(skip_all)]
    pub async fn login(&self, password: &str) -> Result<(), AuthError> {
        let credential = self
            .credentials
            .get_credential()
            .await?
            .ok_or(AuthError::NotInitialized)?;

        verify_blocking(password, credential.password_hash).await
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if shorter than [`MIN_PASSWORD_LENGTH`]
/// characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<PasswordHash, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordHash::new(hash.to_string()))
        .map_err(|_| AuthError::PasswordHash)
}

/// Hash on the blocking pool so Argon2 does not stall runtime workers.
async fn hash_blocking(password: &str) -> Result<PasswordHash, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// Verify on the blocking pool.
async fn verify_blocking(password: &str, hash: PasswordHash) -> Result<(), AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// Verify a password against a hash.
///
/// A stored hash that cannot be parsed is treated as a mismatch.
fn verify_password(password: &str, hash: &PasswordHash) -> Result<(), AuthError> {
    let parsed_hash = ParsedHash::new(hash.as_str()).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
