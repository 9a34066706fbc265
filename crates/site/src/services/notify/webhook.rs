//! Webhook notifier: POSTs `{title, content}` as JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};
use url::Url;

use super::{Notification, Notifier, NotifyError};
use crate::config::WebhookConfig;

/// Sends notifications to an HTTP endpoint (chat relay, mail relay, etc.).
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &self.url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl WebhookNotifier {
    /// Create a webhook notifier.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Request` if the HTTP client cannot be built.
    pub fn new(config: &WebhookConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, notification), fields(url = %self.url, title = %notification.title))]
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut request = self.client.post(self.url.clone()).json(notification);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            error!(status = status.as_u16(), "Notification webhook rejected request");
            return Err(NotifyError::Status(status.as_u16()));
        }

        debug!(status = status.as_u16(), "Notification delivered");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let config = WebhookConfig {
            url: Url::parse("https://hooks.example.com/notify").unwrap(),
            token: Some(SecretString::from("super_secret_webhook_token")),
        };
        let notifier = WebhookNotifier::new(&config, Duration::from_secs(5)).unwrap();
        let debug = format!("{notifier:?}");

        assert!(debug.contains("hooks.example.com"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super_secret_webhook_token"));
    }
}
