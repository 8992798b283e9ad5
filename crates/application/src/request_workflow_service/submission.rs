use super::*;

use rolegate_domain::{PermissionSet, RequestPayload};

impl RequestWorkflowService {
    /// Records a pending account request.
    ///
    /// The requested catalog role must exist. A second pending signup or an
    /// existing account for the same email is a conflict.
    pub async fn submit_signup(&self, input: SignupRequestInput) -> AppResult<AccessRequest> {
        self.require_catalog_role(&input.requested_role).await?;

        let _guard = self
            .locks
            .acquire(LockScope::Email(input.email.clone()))
            .await;

        if self.users.find_user_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "an account for '{}' already exists",
                input.email
            )));
        }

        if self.requests.has_pending_signup(&input.email).await? {
            return Err(AppError::Conflict(format!(
                "a signup request for '{}' is already pending",
                input.email
            )));
        }

        let request = AccessRequest::submit(
            RequestPayload::Signup {
                email: input.email,
                name: input.name,
                credential_material: input.credential_material,
                requested_role: input.requested_role,
            },
            Utc::now(),
        );

        self.record_submission(request).await
    }

    /// Records a pending request for an additional catalog role.
    pub async fn submit_role_change(
        &self,
        subject_email: EmailAddress,
        requested_role: RoleName,
    ) -> AppResult<AccessRequest> {
        self.require_catalog_role(&requested_role).await?;
        let profile = self.access.find_user_by_email(&subject_email).await?;

        let request = AccessRequest::submit(
            RequestPayload::RoleChange {
                subject_email,
                current_role_names: profile
                    .roles
                    .iter()
                    .map(|role| role.name().as_str().to_owned())
                    .collect(),
                requested_role,
            },
            Utc::now(),
        );

        self.record_submission(request).await
    }

    /// Records a pending request for additional permissions.
    pub async fn submit_permission_change(
        &self,
        subject_email: EmailAddress,
        requested_permissions: PermissionSet,
    ) -> AppResult<AccessRequest> {
        if requested_permissions.is_empty() {
            return Err(AppError::Conflict(
                "requested permission set must not be empty".to_owned(),
            ));
        }

        let profile = self.access.find_user_by_email(&subject_email).await?;

        let request = AccessRequest::submit(
            RequestPayload::PermissionChange {
                subject_email,
                current_permissions: profile.effective_permissions,
                requested_permissions,
            },
            Utc::now(),
        );

        self.record_submission(request).await
    }

    async fn record_submission(&self, request: AccessRequest) -> AppResult<AccessRequest> {
        let request = self.requests.create_request(request).await?;

        self.audit_request(
            &request,
            AuditAction::RequestSubmitted,
            format!("submitted {} request", kind_label(request.kind())),
        )
        .await;

        info!(
            request_id = %request.id(),
            kind = request.kind().as_str(),
            "request submitted"
        );
        Ok(request)
    }
}
