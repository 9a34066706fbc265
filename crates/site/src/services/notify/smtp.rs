//! SMTP notifier using lettre.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::ExposeSecret;

use super::{Notification, Notifier, NotifyError};
use crate::config::SmtpConfig;

/// Emails each notification to the site owner.
#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// Create an SMTP notifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Smtp` if the relay cannot be configured, or
    /// `NotifyError::InvalidAddress` if the from/to addresses do not parse.
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().to_string(),
            ));
        }

        let from = config
            .from_address
            .parse()
            .map_err(|_| NotifyError::InvalidAddress(config.from_address.clone()))?;
        let to = config
            .to_address
            .parse()
            .map_err(|_| NotifyError::InvalidAddress(config.to_address.clone()))?;

        Ok(Self {
            mailer: builder.build(),
            from,
            to,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notification.title.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.content.clone())?;

        self.mailer.send(email).await?;

        tracing::info!(to = %self.to, subject = %notification.title, "Notification email sent");
        Ok(())
    }
}
