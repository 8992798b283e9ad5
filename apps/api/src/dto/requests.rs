use chrono::SecondsFormat;
use rolegate_domain::{AccessRequest, RequestPayload};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for an account request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/signup-request-body.ts"
)]
pub struct SignupRequestBody {
    pub email: String,
    pub name: String,
    pub credential: String,
    pub requested_role: String,
}

/// Incoming payload for an additional catalog role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-change-request-body.ts"
)]
pub struct RoleChangeRequestBody {
    pub email: String,
    pub requested_role: String,
}

/// Incoming payload for additional permissions.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-change-request-body.ts"
)]
pub struct PermissionChangeRequestBody {
    pub email: String,
    pub requested_permissions: Vec<String>,
}

/// Optional rejection reason.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/reject-request-body.ts"
)]
pub struct RejectRequestBody {
    #[serde(default)]
    pub reason: Option<String>,
}

/// API representation of an approval request.
///
/// Kind-specific snapshot fields are `null` for other kinds.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-request-response.ts"
)]
pub struct AccessRequestResponse {
    pub request_id: String,
    pub kind: String,
    pub status: String,
    pub subject_email: String,
    pub name: Option<String>,
    pub requested_role: Option<String>,
    pub current_role_names: Option<Vec<String>>,
    pub current_permissions: Option<Vec<String>>,
    pub requested_permissions: Option<Vec<String>>,
    pub submitted_at: String,
    pub decided_at: Option<String>,
    pub decision_reason: Option<String>,
}

impl From<AccessRequest> for AccessRequestResponse {
    fn from(value: AccessRequest) -> Self {
        let payload = value.payload();
        let mut response = Self {
            request_id: value.id().to_string(),
            kind: value.kind().as_str().to_owned(),
            status: value.status().as_str().to_owned(),
            subject_email: payload.subject_email().as_str().to_owned(),
            name: None,
            requested_role: payload
                .requested_role()
                .map(|role| role.as_str().to_owned()),
            current_role_names: None,
            current_permissions: None,
            requested_permissions: None,
            submitted_at: value
                .submitted_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            decided_at: value
                .decided_at()
                .map(|decided_at| decided_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            decision_reason: value.decision_reason().map(str::to_owned),
        };

        match payload {
            RequestPayload::Signup { name, .. } => {
                response.name = Some(name.as_str().to_owned());
            }
            RequestPayload::RoleChange {
                current_role_names, ..
            } => {
                response.current_role_names = Some(current_role_names.clone());
            }
            RequestPayload::PermissionChange {
                current_permissions,
                requested_permissions,
                ..
            } => {
                response.current_permissions = Some(current_permissions.to_names());
                response.requested_permissions = Some(requested_permissions.to_names());
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rolegate_core::NonEmptyString;
    use rolegate_domain::{
        AccessRequest, CredentialMaterial, EmailAddress, RequestPayload, RoleName,
    };

    use super::AccessRequestResponse;

    #[test]
    fn signup_response_hides_credential_and_other_kind_fields() {
        let submitted_at = Utc
            .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
            .single()
            .unwrap_or_else(|| unreachable!());
        let request = AccessRequest::submit(
            RequestPayload::Signup {
                email: EmailAddress::new("eve@clinic.test").unwrap_or_else(|_| unreachable!()),
                name: NonEmptyString::new("Eve").unwrap_or_else(|_| unreachable!()),
                credential_material: CredentialMaterial::new("opaque-hash"),
                requested_role: RoleName::new("Patient").unwrap_or_else(|_| unreachable!()),
            },
            submitted_at,
        );

        let json = serde_json::to_value(AccessRequestResponse::from(request))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(json["kind"], "signup");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["name"], "Eve");
        assert_eq!(json["submitted_at"], "2024-03-01T09:30:00.000Z");
        assert!(json["current_permissions"].is_null());
        assert!(json["decided_at"].is_null());
        assert!(!json.to_string().contains("opaque-hash"));
    }
}
