use std::sync::Arc;

use rolegate_application::Notifier;
use rolegate_core::AppError;
use rolegate_infrastructure::{ConsoleNotifier, SmtpNotifier, SmtpNotifierConfig};

use crate::api_config::NotifierConfig;

pub fn build_notifier(config: &NotifierConfig) -> Result<Arc<dyn Notifier>, AppError> {
    let notifier: Arc<dyn Notifier> = match config {
        NotifierConfig::Console => Arc::new(ConsoleNotifier::new()),
        NotifierConfig::Smtp(smtp) => Arc::new(SmtpNotifier::new(SmtpNotifierConfig {
            host: smtp.host.clone(),
            port: smtp.port,
            username: smtp.username.clone(),
            password: smtp.password.clone(),
            from_address: smtp.from_address.clone(),
        })?),
    };

    Ok(notifier)
}
