//! Notifier for local runs. Writes messages to the tracing output.

use async_trait::async_trait;
use tracing::info;

use rolegate_application::Notifier;
use rolegate_core::AppResult;
use rolegate_domain::EmailAddress;

/// Logs every notification instead of delivering it.
#[derive(Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Creates a console notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, to: &EmailAddress, subject: &str, body: &str) -> AppResult<()> {
        info!(
            to = %to,
            subject = subject,
            "--- NOTIFICATION (console) ---\n{body}\n--- END NOTIFICATION ---"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rolegate_application::Notifier;
    use rolegate_domain::EmailAddress;

    use super::ConsoleNotifier;

    #[tokio::test]
    async fn console_delivery_always_succeeds() {
        let to = EmailAddress::new("eve@clinic.test").unwrap_or_else(|_| unreachable!());

        let result = ConsoleNotifier::new()
            .notify(&to, "Request approved", "Welcome aboard.")
            .await;

        assert!(result.is_ok());
    }
}
