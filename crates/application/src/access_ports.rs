mod audit;
mod catalog;
mod notifications;
mod requests;
mod users;

pub use audit::{AuditEvent, AuditLogEntry, AuditLogRepository, AuditRepository};
pub use catalog::{CatalogFamily, RoleCatalogRepository};
pub use notifications::Notifier;
pub use requests::{PendingRequestQuery, RequestRepository};
pub use users::UserRepository;
