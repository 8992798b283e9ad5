use chrono::SecondsFormat;
use rolegate_application::UserProfile;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::RoleResponse;

/// Incoming payload for direct grant and revoke operations.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-change-body.ts"
)]
pub struct PermissionChangeBody {
    pub permissions: Vec<String>,
}

/// Incoming payload for account status changes.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-status-request.ts"
)]
pub struct UpdateUserStatusRequest {
    pub status: String,
}

/// API representation of a user with resolved roles.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-profile-response.ts"
)]
pub struct UserProfileResponse {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub status: String,
    pub roles: Vec<RoleResponse>,
    pub effective_permissions: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            user_id: value.user.id().to_string(),
            email: value.user.email().as_str().to_owned(),
            name: value.user.name().as_str().to_owned(),
            status: value.user.status().as_str().to_owned(),
            roles: value.roles.iter().map(RoleResponse::from).collect(),
            effective_permissions: value.effective_permissions.to_names(),
            created_at: value
                .user
                .created_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            updated_at: value
                .user
                .updated_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
