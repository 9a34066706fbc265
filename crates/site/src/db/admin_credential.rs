//! Admin credential repository.
//!
//! The table holds at most one row, keyed by the constant `TRUE`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bridgia_core::{AdminCredential, PasswordHash};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct CredentialRow {
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for the singleton admin credential.
pub struct AdminCredentialRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminCredentialRepository<'a> {
    /// Create a new credential repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the credential if it has been initialized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self) -> Result<Option<AdminCredential>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT password_hash, created_at, updated_at
            FROM admin_credential
            WHERE id = TRUE
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| AdminCredential {
            password_hash: PasswordHash::new(r.password_hash),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }))
    }

    /// Insert the credential.
    ///
    /// `ON CONFLICT DO NOTHING` makes the existence check and the insert a
    /// single statement, so concurrent initializers cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a credential already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, hash: &PasswordHash) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO admin_credential (id, password_hash)
            VALUES (TRUE, $1)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(hash.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(
                "admin credential already initialized".to_owned(),
            ));
        }

        Ok(())
    }

    /// Overwrite the credential hash in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no credential exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn replace(&self, hash: &PasswordHash) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE admin_credential
            SET password_hash = $1, updated_at = NOW()
            WHERE id = TRUE
            ",
        )
        .bind(hash.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
