//! SMTP notifier using the `lettre` crate.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use rolegate_application::Notifier;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::EmailAddress;

/// SMTP relay settings.
#[derive(Clone)]
pub struct SmtpNotifierConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Sender address, optionally with a display name.
    pub from_address: String,
}

/// Delivers notifications through an authenticated SMTP relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    from: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    /// Builds the relay transport once and validates the sender address.
    pub fn new(config: SmtpNotifierConfig) -> AppResult<Self> {
        let from = config.from_address.parse::<Mailbox>().map_err(|error| {
            AppError::Validation(format!(
                "invalid sender address '{}': {error}",
                config.from_address
            ))
        })?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|error| {
                AppError::Internal(format!("failed to create SMTP transport: {error}"))
            })?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { from, mailer })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, to: &EmailAddress, subject: &str, body: &str) -> AppResult<()> {
        let recipient = to.as_str().parse::<Mailbox>().map_err(|error| {
            AppError::Internal(format!("invalid recipient address '{to}': {error}"))
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())
            .map_err(|error| AppError::Internal(format!("failed to build message: {error}")))?;

        self.mailer
            .send(message)
            .await
            .map_err(|error| AppError::Internal(format!("failed to send notification: {error}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rolegate_core::AppError;

    use super::{SmtpNotifier, SmtpNotifierConfig};

    fn config(from_address: &str) -> SmtpNotifierConfig {
        SmtpNotifierConfig {
            host: "smtp.clinic.test".to_owned(),
            port: 587,
            username: "mailer".to_owned(),
            password: "secret".to_owned(),
            from_address: from_address.to_owned(),
        }
    }

    #[test]
    fn malformed_sender_is_rejected() {
        let result = SmtpNotifier::new(config("not an address"));

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn named_sender_is_accepted() {
        let result = SmtpNotifier::new(config("Rolegate <no-reply@clinic.test>"));

        assert!(result.is_ok());
    }
}
