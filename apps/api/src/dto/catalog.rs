use rolegate_application::{AuditLogEntry, CatalogFamily};
use rolegate_domain::Role;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for catalog role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-catalog-role-request.ts"
)]
pub struct CreateCatalogRoleRequest {
    pub name: String,
    pub permissions: Vec<String>,
}

/// Incoming payload for catalog sub-role creation under a primary.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-catalog-sub-role-request.ts"
)]
pub struct CreateCatalogSubRoleRequest {
    pub sub_name: String,
    pub permissions: Vec<String>,
}

/// API representation of a catalog role or a user fork.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub is_catalog: bool,
    pub owner_id: Option<String>,
    pub permissions: Vec<String>,
}

impl From<&Role> for RoleResponse {
    fn from(value: &Role) -> Self {
        Self {
            role_id: value.id().to_string(),
            name: value.name().as_str().to_owned(),
            is_catalog: value.is_catalog(),
            owner_id: value.owner().map(|owner| owner.to_string()),
            permissions: value.permissions().to_names(),
        }
    }
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self::from(&value)
    }
}

/// A primary catalog role with the sub-roles named after it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/catalog-family-response.ts"
)]
pub struct CatalogFamilyResponse {
    pub primary: RoleResponse,
    pub sub_roles: Vec<RoleResponse>,
    pub standalone: bool,
}

impl From<CatalogFamily> for CatalogFamilyResponse {
    fn from(value: CatalogFamily) -> Self {
        let standalone = value.is_standalone();
        Self {
            primary: RoleResponse::from(value.primary),
            sub_roles: value.sub_roles.into_iter().map(RoleResponse::from).collect(),
            standalone,
        }
    }
}

/// API representation of an audit trail entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-event-response.ts"
)]
pub struct AuditEventResponse {
    pub event_id: String,
    pub subject: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<String>,
    pub created_at: String,
}

impl From<AuditLogEntry> for AuditEventResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            subject: value.subject,
            action: value.action,
            resource_type: value.resource_type,
            resource_id: value.resource_id,
            detail: value.detail,
            created_at: value.created_at,
        }
    }
}
