//! Log-only notifier.

use async_trait::async_trait;

use super::{Notification, Notifier, NotifyError};

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            title = %notification.title,
            content = %notification.content,
            "Owner notification (log only)"
        );
        Ok(())
    }
}
