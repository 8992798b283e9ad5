//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_notifier;
mod in_memory_store;
mod postgres_audit_log_repository;
mod postgres_audit_repository;
mod postgres_request_repository;
mod postgres_role_catalog_repository;
mod postgres_rows;
mod postgres_user_repository;
mod smtp_notifier;

#[cfg(test)]
mod postgres_test_support;

pub use console_notifier::ConsoleNotifier;
pub use in_memory_store::InMemoryStore;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_request_repository::PostgresRequestRepository;
pub use postgres_role_catalog_repository::PostgresRoleCatalogRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use smtp_notifier::{SmtpNotifier, SmtpNotifierConfig};
