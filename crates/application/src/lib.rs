//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod access_service;
mod catalog_service;
mod notification;
mod request_workflow_service;
mod user_locks;

#[cfg(test)]
mod test_support;

pub use access_ports::{
    AuditEvent, AuditLogEntry, AuditLogRepository, AuditRepository, CatalogFamily, Notifier,
    PendingRequestQuery, RequestRepository, RoleCatalogRepository, UserRepository,
};
pub use access_service::{AccessService, DEFAULT_RETRY_LIMIT, UserProfile};
pub use catalog_service::{CatalogService, MAX_AUDIT_PAGE};
pub use notification::{Notification, NotificationDispatcher};
pub use request_workflow_service::{RequestWorkflowService, SignupRequestInput};
pub use user_locks::{LockScope, ScopeGuard, UserLocks};
