use rolegate_application::{AccessService, CatalogService, RequestWorkflowService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub catalog_service: CatalogService,
    pub request_workflow_service: RequestWorkflowService,
    pub storage_backend: &'static str,
}
