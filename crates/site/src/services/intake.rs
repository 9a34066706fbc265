//! Contact intake service.
//!
//! `submit` validates the form, stores the submission and then notifies the
//! owner. The submission is never rolled back: when notification fails the
//! visitor gets an error but the entry stays in the inbox.

use std::time::Duration;

use thiserror::Error;
use tracing::instrument;

use bridgia_core::{ContactSubmission, SubmissionInput, ValidationErrors};

use crate::db::{RepositoryError, SubmissionStore};
use crate::services::notify::{Notification, Notifier, NotifyError};

/// Title of every owner notification.
pub const NOTIFICATION_TITLE: &str = "New Contact Form Submission from Bridgia";

/// Errors that can occur while taking a submission.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// One or more fields failed validation.
    #[error("invalid submission: {0}")]
    Validation(ValidationErrors),

    /// The submission could not be stored.
    #[error("failed to store submission: {0}")]
    Repository(#[from] RepositoryError),

    /// The submission was stored but the owner was not notified.
    #[error("failed to notify owner: {0}")]
    Notify(#[from] NotifyError),
}

/// Contact intake service.
pub struct ContactIntakeService<'a, S: ?Sized> {
    store: &'a S,
    notifier: &'a dyn Notifier,
    notify_timeout: Duration,
}

impl<'a, S: SubmissionStore + ?Sized> ContactIntakeService<'a, S> {
    /// Create a new intake service.
    #[must_use]
    pub const fn new(
        store: &'a S,
        notifier: &'a dyn Notifier,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            notify_timeout,
        }
    }

    /// Validate, store and announce a contact form submission.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Validation` listing every failing field.
    /// Returns `IntakeError::Repository` if the submission cannot be stored.
    /// Returns `IntakeError::Notify` if the owner notification fails or times
    /// out; the submission has already been stored at that point.
    #[instrument(skip_all)]
    pub async fn submit(&self, input: SubmissionInput) -> Result<ContactSubmission, IntakeError> {
        let new = input.validate().map_err(IntakeError::Validation)?;

        let submission = self.store.create_submission(new).await?;
        tracing::info!(submission_id = %submission.id, "Contact submission stored");

        let notification = notification_for(&submission);
        match tokio::time::timeout(self.notify_timeout, self.notifier.notify(&notification)).await
        {
            Ok(Ok(())) => Ok(submission),
            Ok(Err(e)) => {
                tracing::error!(submission_id = %submission.id, error = %e, "Owner notification failed");
                Err(IntakeError::Notify(e))
            }
            Err(_) => {
                let secs = self.notify_timeout.as_secs();
                tracing::error!(submission_id = %submission.id, timeout_secs = secs, "Owner notification timed out");
                Err(IntakeError::Notify(NotifyError::Timeout(secs)))
            }
        }
    }
}

/// Build the owner notification for a stored submission.
#[must_use]
pub fn notification_for(submission: &ContactSubmission) -> Notification {
    let company = submission
        .company
        .as_deref()
        .map(|c| format!(" at {c}"))
        .unwrap_or_default();

    Notification {
        title: NOTIFICATION_TITLE.to_owned(),
        content: format!(
            "New inquiry from {} ({}){company}\n\nMessage: {}",
            submission.name, submission.email, submission.message
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bridgia_core::{NewSubmission, SubmissionId};
    use chrono::Utc;

    use super::*;
    use crate::db::MemoryStore;

    /// Records every notification it receives.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    /// Always fails with a webhook status error.
    pub struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Status(502))
        }
    }

    struct SlowNotifier;

    #[async_trait]
    impl Notifier for SlowNotifier {
        async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl SubmissionStore for BrokenStore {
        async fn create_submission(
            &self,
            _new: NewSubmission,
        ) -> Result<ContactSubmission, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn list_submissions(&self) -> Result<Vec<ContactSubmission>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn recent_submissions(
            &self,
            _limit: u32,
        ) -> Result<Vec<ContactSubmission>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn jane(company: Option<&str>) -> SubmissionInput {
        SubmissionInput {
            name: "Jane Smith".to_owned(),
            email: "jane@example.com".to_owned(),
            company: company.map(str::to_owned),
            message: "I'd like to learn more about your services.".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_submit_stores_and_notifies() {
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::default();
        let intake = ContactIntakeService::new(&store, &notifier, Duration::from_secs(1));

        let submission = intake.submit(jane(Some("Acme"))).await.unwrap();

        assert_eq!(submission.company.as_deref(), Some("Acme"));
        assert_eq!(store.list_submissions().await.unwrap().len(), 1);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, NOTIFICATION_TITLE);
        assert_eq!(
            sent[0].content,
            "New inquiry from Jane Smith (jane@example.com) at Acme\n\n\
             Message: I'd like to learn more about your services."
        );
    }

    #[tokio::test]
    async fn test_submit_without_company() {
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::default();
        let intake = ContactIntakeService::new(&store, &notifier, Duration::from_secs(1));

        let submission = intake.submit(jane(Some("  "))).await.unwrap();

        assert_eq!(submission.company, None);
        let sent = notifier.sent.lock().unwrap();
        assert!(sent[0].content.starts_with("New inquiry from Jane Smith (jane@example.com)\n\n"));
    }

    #[tokio::test]
    async fn test_invalid_input_stores_nothing() {
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::default();
        let intake = ContactIntakeService::new(&store, &notifier, Duration::from_secs(1));

        let input = SubmissionInput {
            email: "not-an-email".to_owned(),
            ..SubmissionInput::default()
        };
        let Err(IntakeError::Validation(errors)) = intake.submit(input).await else {
            panic!("expected validation error");
        };

        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("email"), Some("Invalid email"));
        assert_eq!(errors.get("message"), Some("Message is required"));
        assert!(store.list_submissions().await.unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notify_failure_keeps_submission() {
        let store = MemoryStore::new();
        let intake = ContactIntakeService::new(&store, &FailingNotifier, Duration::from_secs(1));

        let result = intake.submit(jane(None)).await;

        assert!(matches!(result, Err(IntakeError::Notify(NotifyError::Status(502)))));
        let stored = store.list_submissions().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Jane Smith");
    }

    #[tokio::test]
    async fn test_notify_timeout() {
        let store = MemoryStore::new();
        let intake = ContactIntakeService::new(&store, &SlowNotifier, Duration::from_millis(50));

        let result = intake.submit(jane(None)).await;

        assert!(matches!(result, Err(IntakeError::Notify(NotifyError::Timeout(_)))));
        assert_eq!(store.list_submissions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_skips_notification() {
        let notifier = RecordingNotifier::default();
        let intake = ContactIntakeService::new(&BrokenStore, &notifier, Duration::from_secs(1));

        let result = intake.submit(jane(None)).await;

        assert!(matches!(result, Err(IntakeError::Repository(_))));
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_notification_format() {
        let submission = NewSubmission {
            name: "Omar".to_owned(),
            email: "omar@bridgia.sa".parse().unwrap(),
            company: None,
            message: "Hi".to_owned(),
        }
        .into_submission(SubmissionId::generate(), Utc::now());

        let notification = notification_for(&submission);
        assert_eq!(notification.content, "New inquiry from Omar (omar@bridgia.sa)\n\nMessage: Hi");
    }
}
