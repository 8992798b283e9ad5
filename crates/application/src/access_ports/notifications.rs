use async_trait::async_trait;

use rolegate_core::AppResult;
use rolegate_domain::EmailAddress;

/// Port for delivering notifications. Infrastructure provides SMTP or console implementations.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a plain-text message.
    async fn notify(&self, to: &EmailAddress, subject: &str, body: &str) -> AppResult<()>;
}
