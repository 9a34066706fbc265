//! Contact submission repository.
//!
//! Queries are checked at runtime (`query_as`) so the crate builds without a
//! live database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bridgia_core::{ContactSubmission, Email, NewSubmission, SubmissionId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: SubmissionId,
    name: String,
    email: Email,
    company: Option<String>,
    message: String,
    created_at: DateTime<Utc>,
}

impl From<SubmissionRow> for ContactSubmission {
    fn from(row: SubmissionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            company: row.company,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

/// Repository for contact submission database operations.
pub struct SubmissionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubmissionRepository<'a> {
    /// Create a new submission repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a submission. The ID is generated here and `created_at` is the
    /// database clock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: NewSubmission) -> Result<ContactSubmission, RepositoryError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r"
            INSERT INTO contact_submission (id, name, email, company, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, company, message, created_at
            ",
        )
        .bind(SubmissionId::generate())
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.company.as_deref())
        .bind(&new.message)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get every submission, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ContactSubmission>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r"
            SELECT id, name, email, company, message, created_at
            FROM contact_submission
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get the `limit` most recent submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<ContactSubmission>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r"
            SELECT id, name, email, company, message, created_at
            FROM contact_submission
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
