use std::sync::Arc;

use rolegate_application::{
    AuditLogRepository, AuditRepository, RequestRepository, RoleCatalogRepository,
    UserRepository,
};
use rolegate_infrastructure::{
    InMemoryStore, PostgresAuditLogRepository, PostgresAuditRepository,
    PostgresRequestRepository, PostgresRoleCatalogRepository, PostgresUserRepository,
};
use sqlx::PgPool;

/// Port implementations backing one running instance.
pub struct RepositorySet {
    pub(super) backend: &'static str,
    pub(super) catalog: Arc<dyn RoleCatalogRepository>,
    pub(super) users: Arc<dyn UserRepository>,
    pub(super) requests: Arc<dyn RequestRepository>,
    pub(super) audit: Arc<dyn AuditRepository>,
    pub(super) audit_log: Arc<dyn AuditLogRepository>,
}

impl RepositorySet {
    /// One process-local store serving every port.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());

        Self {
            backend: "memory",
            catalog: store.clone(),
            users: store.clone(),
            requests: store.clone(),
            audit: store.clone(),
            audit_log: store,
        }
    }

    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            backend: "postgres",
            catalog: Arc::new(PostgresRoleCatalogRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            requests: Arc::new(PostgresRequestRepository::new(pool.clone())),
            audit: Arc::new(PostgresAuditRepository::new(pool.clone())),
            audit_log: Arc::new(PostgresAuditLogRepository::new(pool.clone())),
        }
    }
}
