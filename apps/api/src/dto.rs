mod catalog;
mod common;
mod requests;
mod users;

pub use catalog::{
    AuditEventResponse, CatalogFamilyResponse, CreateCatalogRoleRequest,
    CreateCatalogSubRoleRequest, RoleResponse,
};
pub use common::{HealthResponse, PermissionListResponse};
pub use requests::{
    AccessRequestResponse, PermissionChangeRequestBody, RejectRequestBody, RoleChangeRequestBody,
    SignupRequestBody,
};
pub use users::{PermissionChangeBody, UpdateUserStatusRequest, UserProfileResponse};
