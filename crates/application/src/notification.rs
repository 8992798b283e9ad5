use std::sync::Arc;

use rolegate_domain::EmailAddress;
use tracing::warn;

use crate::Notifier;

/// Message handed to the notifier after a transition commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Recipient.
    pub to: EmailAddress,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Fire-and-forget notification delivery.
///
/// Each message is sent on its own task; delivery errors are logged and
/// dropped.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher over a notifier port.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Schedules delivery and returns immediately.
    pub fn dispatch(&self, notification: Notification) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(error) = notifier
                .notify(
                    &notification.to,
                    notification.subject.as_str(),
                    notification.body.as_str(),
                )
                .await
            {
                warn!(
                    error = %error,
                    to = %notification.to,
                    subject = %notification.subject,
                    "notification delivery failed"
                );
            }
        });
    }
}
