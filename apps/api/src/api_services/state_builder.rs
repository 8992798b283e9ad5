use std::sync::Arc;

use rolegate_application::{
    AccessService, CatalogService, NotificationDispatcher, Notifier, RequestWorkflowService,
    UserLocks,
};

use crate::state::AppState;

mod repositories;

pub use repositories::RepositorySet;

/// Wires the services over one repository set.
///
/// The access and workflow services share one lock registry.
pub fn build_app_state(
    repositories: RepositorySet,
    notifier: Arc<dyn Notifier>,
    lock_retry_limit: usize,
) -> AppState {
    let locks = UserLocks::new();

    let access_service = AccessService::new(
        repositories.catalog.clone(),
        repositories.users.clone(),
        repositories.audit.clone(),
        locks.clone(),
    )
    .with_retry_limit(lock_retry_limit);

    let catalog_service = CatalogService::new(
        repositories.catalog.clone(),
        repositories.audit.clone(),
        repositories.audit_log,
    );

    let request_workflow_service = RequestWorkflowService::new(
        repositories.catalog,
        repositories.users,
        repositories.requests,
        repositories.audit,
        access_service.clone(),
        locks,
        NotificationDispatcher::new(notifier),
    );

    AppState {
        access_service,
        catalog_service,
        request_workflow_service,
        storage_backend: repositories.backend,
    }
}
