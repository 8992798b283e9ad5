use rolegate_domain::PermissionSet;
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
}

/// Sorted permission names.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-list-response.ts"
)]
pub struct PermissionListResponse {
    pub permissions: Vec<String>,
}

impl From<PermissionSet> for PermissionListResponse {
    fn from(value: PermissionSet) -> Self {
        Self {
            permissions: value.to_names(),
        }
    }
}
