//! Print recent contact submissions.

use thiserror::Error;

use bridgia_core::ContactSubmission;
use bridgia_site::db::{PgStore, RepositoryError, SubmissionStore};

use super::{DatabaseError, connect};

/// Errors that can occur while reading the inbox.
#[derive(Debug, Error)]
pub enum InboxError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Failed to load submissions: {0}")]
    Repository(#[from] RepositoryError),
}

/// Show the `limit` most recent submissions, newest first.
///
/// # Errors
///
/// Returns `InboxError` if the database cannot be queried.
pub async fn show(limit: u32) -> Result<(), InboxError> {
    let store = PgStore::new(connect().await?);
    let submissions = store.recent_submissions(limit).await?;

    if submissions.is_empty() {
        tracing::info!("No submissions yet");
        return Ok(());
    }

    #[allow(clippy::print_stdout)]
    for submission in &submissions {
        println!("{}\n", format_submission(submission));
    }

    Ok(())
}

fn format_submission(submission: &ContactSubmission) -> String {
    let company = submission
        .company
        .as_deref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default();

    format!(
        "[{}] {} <{}>{company}\n{}",
        submission.created_at.format("%Y-%m-%d %H:%M UTC"),
        submission.name,
        submission.email,
        submission.message
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bridgia_core::{Email, NewSubmission, SubmissionId};
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_format_submission() {
        let email = Email::parse("jane@example.com").unwrap();
        let submission = NewSubmission {
            name: "Jane Smith".to_owned(),
            email,
            company: Some("Acme".to_owned()),
            message: "Hello there".to_owned(),
        }
        .into_submission(
            SubmissionId::generate(),
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        );

        assert_eq!(
            format_submission(&submission),
            "[2026-03-01 09:30 UTC] Jane Smith <jane@example.com> (Acme)\nHello there"
        );
    }
}
