//! Owner notifications for new contact submissions.
//!
//! The intake flow only knows the [`Notifier`] trait. Which adapter backs it
//! is decided once at startup from [`NotifyConfig`]:
//!
//! 1. `NOTIFY_WEBHOOK_URL` set - [`WebhookNotifier`]
//! 2. otherwise `NOTIFY_SMTP_HOST` set - [`SmtpNotifier`]
//! 3. otherwise [`LogNotifier`] (development default)
//!
//! Delivery is best effort. Adapters report failures but never retry.

mod log_only;
mod smtp;
mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::NotifyConfig;

pub use log_only::LogNotifier;
pub use smtp::SmtpNotifier;
pub use webhook::WebhookNotifier;

/// A message for the site owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub content: String,
}

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP request could not be sent.
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The webhook answered with a non-success status.
    #[error("webhook returned status {0}")]
    Status(u16),

    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Failed to build the email message.
    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// A configured address could not be parsed.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Delivery did not finish within the configured timeout.
    #[error("notification timed out after {0} seconds")]
    Timeout(u64),
}

/// Delivers owner notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Shared handle to the configured notifier.
pub type DynNotifier = Arc<dyn Notifier>;

/// Build the notifier selected by configuration.
///
/// # Errors
///
/// Returns `NotifyError` if the SMTP transport or an address cannot be set up.
pub fn from_config(config: &NotifyConfig) -> Result<DynNotifier, NotifyError> {
    if let Some(webhook) = &config.webhook {
        tracing::info!(url = %webhook.url, "Notifications via webhook");
        return Ok(Arc::new(WebhookNotifier::new(webhook, config.timeout)?));
    }

    if let Some(smtp) = &config.smtp {
        tracing::info!(host = %smtp.host, to = %smtp.to_address, "Notifications via SMTP");
        return Ok(Arc::new(SmtpNotifier::new(smtp)?));
    }

    tracing::warn!("No notifier configured, new submissions will only be logged");
    Ok(Arc::new(LogNotifier))
}
