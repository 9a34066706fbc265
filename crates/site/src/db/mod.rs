//! Persistence for contact submissions and the admin credential.
//!
//! # Tables
//!
//! - `contact_submission` - Append-only contact form entries
//! - `admin_credential` - The single admin password hash (at most one row)
//!
//! # Backends
//!
//! Handlers never talk to a pool directly. They receive a [`Store`] handle
//! through `AppState`:
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryStore`] - process-local, used by tests and `SITE_STORE=memory`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p bridgia-cli -- migrate
//! ```

pub mod admin_credential;
pub mod memory;
pub mod submissions;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bridgia_core::{AdminCredential, ContactSubmission, NewSubmission, PasswordHash};

pub use admin_credential::AdminCredentialRepository;
pub use memory::MemoryStore;
pub use submissions::SubmissionRepository;

/// Embedded migrations for the site database.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., credential already present).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Append-only storage of contact form entries.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a new submission, assigning its ID and creation time.
    async fn create_submission(
        &self,
        new: NewSubmission,
    ) -> Result<ContactSubmission, RepositoryError>;

    /// All submissions, newest first.
    async fn list_submissions(&self) -> Result<Vec<ContactSubmission>, RepositoryError>;

    /// The `limit` most recent submissions, newest first.
    async fn recent_submissions(
        &self,
        limit: u32,
    ) -> Result<Vec<ContactSubmission>, RepositoryError>;
}

/// Storage of the singleton admin credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The current credential, if one has been initialized.
    async fn get_credential(&self) -> Result<Option<AdminCredential>, RepositoryError>;

    /// Create the credential.
    ///
    /// Fails with [`RepositoryError::Conflict`] if one already exists. Of two
    /// concurrent callers exactly one succeeds.
    async fn insert_credential(&self, hash: &PasswordHash) -> Result<(), RepositoryError>;

    /// Overwrite the existing credential.
    ///
    /// Fails with [`RepositoryError::NotFound`] if none exists.
    async fn replace_credential(&self, hash: &PasswordHash) -> Result<(), RepositoryError>;
}

/// A complete storage backend.
#[async_trait]
pub trait Store: SubmissionStore + CredentialStore {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Shared handle to the configured backend.
pub type DynStore = Arc<dyn Store>;

/// `PostgreSQL`-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn create_submission(
        &self,
        new: NewSubmission,
    ) -> Result<ContactSubmission, RepositoryError> {
        SubmissionRepository::new(&self.pool).create(new).await
    }

    async fn list_submissions(&self) -> Result<Vec<ContactSubmission>, RepositoryError> {
        SubmissionRepository::new(&self.pool).list_all().await
    }

    async fn recent_submissions(
        &self,
        limit: u32,
    ) -> Result<Vec<ContactSubmission>, RepositoryError> {
        SubmissionRepository::new(&self.pool).list_recent(limit).await
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn get_credential(&self) -> Result<Option<AdminCredential>, RepositoryError> {
        AdminCredentialRepository::new(&self.pool).get().await
    }

    async fn insert_credential(&self, hash: &PasswordHash) -> Result<(), RepositoryError> {
        AdminCredentialRepository::new(&self.pool).insert(hash).await
    }

    async fn replace_credential(&self, hash: &PasswordHash) -> Result<(), RepositoryError> {
        AdminCredentialRepository::new(&self.pool).replace(hash).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
