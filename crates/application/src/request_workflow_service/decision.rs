use super::*;

use rolegate_domain::{RequestPayload, User};

impl RequestWorkflowService {
    /// Applies a pending request and marks it approved.
    ///
    /// The subject is notified after the decision is stored; delivery errors
    /// do not affect the result.
    pub async fn approve_request(&self, request_id: RequestId) -> AppResult<AccessRequest> {
        let _request_guard = self.locks.acquire(LockScope::Request(request_id)).await;
        let mut request = self.get_request(request_id).await?;
        request.ensure_pending()?;

        let notification = match request.payload() {
            RequestPayload::Signup {
                email,
                name,
                credential_material,
                requested_role,
            } => {
                let role = self.require_catalog_role(requested_role).await?;
                let _guard = self.locks.acquire(LockScope::Email(email.clone())).await;

                match self.users.find_user_by_email(email).await? {
                    Some(existing) if opened_by_signup(&existing, &role, credential_material) => {
                        info!(
                            request_id = %request_id,
                            user_id = %existing.id(),
                            "account already opened by this request"
                        );
                    }
                    Some(_) => {
                        return Err(AppError::Conflict(format!(
                            "an account for '{email}' already exists"
                        )));
                    }
                    None => {
                        let user = self
                            .users
                            .create_user(User::register(
                                email.clone(),
                                name.clone(),
                                role.id(),
                                Some(credential_material.clone()),
                                Utc::now(),
                            ))
                            .await?;
                        info!(user_id = %user.id(), role_id = %role.id(), "account created");
                    }
                }

                Notification {
                    to: email.clone(),
                    subject: "Your signup request was approved".to_owned(),
                    body: format!(
                        "Hello {name}, your account with the role '{requested_role}' is now active."
                    ),
                }
            }
            RequestPayload::RoleChange {
                subject_email,
                current_role_names,
                requested_role,
            } => {
                let role = self.require_catalog_role(requested_role).await?;
                let user = self.require_user(subject_email).await?;
                let _guard = self.access.lock_user(user.id()).await;

                let current = self.access.resolve(user).await?;
                let held: Vec<&str> = current
                    .roles()
                    .iter()
                    .map(|role| role.name().as_str())
                    .collect();
                if held != *current_role_names {
                    info!(
                        request_id = %request_id,
                        user_id = %current.user().id(),
                        "role snapshot diverged since submission"
                    );
                }

                self.access
                    .append_role_locked(current.user().id(), &role)
                    .await?;

                Notification {
                    to: subject_email.clone(),
                    subject: "Your role request was approved".to_owned(),
                    body: format!("The role '{requested_role}' was added to your account."),
                }
            }
            RequestPayload::PermissionChange {
                subject_email,
                current_permissions,
                requested_permissions,
            } => {
                let user = self.require_user(subject_email).await?;
                let _guard = self.access.lock_user(user.id()).await;

                let current = self.access.resolve(user).await?;
                if current.effective_permissions() != *current_permissions {
                    info!(
                        request_id = %request_id,
                        user_id = %current.user().id(),
                        "permission snapshot diverged since submission"
                    );
                }

                self.access
                    .grant_permissions_locked(current.user().id(), requested_permissions)
                    .await?;

                Notification {
                    to: subject_email.clone(),
                    subject: "Your permission request was approved".to_owned(),
                    body: format!(
                        "The permissions [{}] were added to your account.",
                        requested_permissions.to_names().join(", ")
                    ),
                }
            }
        };

        request.approve(Utc::now())?;
        self.requests.save_decision(&request).await?;
        self.audit_request(
            &request,
            AuditAction::RequestApproved,
            format!("approved {} request", kind_label(request.kind())),
        )
        .await;

        info!(
            request_id = %request_id,
            kind = request.kind().as_str(),
            "request approved"
        );
        self.notifications.dispatch(notification);
        Ok(request)
    }

    /// Marks a pending request rejected without touching any user or role.
    pub async fn reject_request(
        &self,
        request_id: RequestId,
        reason: Option<String>,
    ) -> AppResult<AccessRequest> {
        let _request_guard = self.locks.acquire(LockScope::Request(request_id)).await;
        let mut request = self.get_request(request_id).await?;

        request.reject(Utc::now(), reason)?;
        self.requests.save_decision(&request).await?;
        self.audit_request(
            &request,
            AuditAction::RequestRejected,
            request
                .decision_reason()
                .map_or_else(
                    || format!("rejected {} request", kind_label(request.kind())),
                    |reason| format!("rejected {} request: {reason}", kind_label(request.kind())),
                ),
        )
        .await;

        info!(
            request_id = %request_id,
            kind = request.kind().as_str(),
            "request rejected"
        );

        let mut body = format!(
            "Your {} request was rejected.",
            kind_label(request.kind())
        );
        if let Some(reason) = request.decision_reason() {
            body.push_str(&format!(" Reason: {reason}"));
        }
        self.notifications.dispatch(Notification {
            to: request.payload().subject_email().clone(),
            subject: format!("Your {} request was rejected", kind_label(request.kind())),
            body,
        });

        Ok(request)
    }

    async fn require_user(&self, email: &EmailAddress) -> AppResult<User> {
        self.users
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no user with email '{email}'")))
    }
}

/// An account left behind by an earlier approval attempt of the same signup:
/// it holds only the requested role and the submitted credential.
fn opened_by_signup(user: &User, role: &Role, credential: &CredentialMaterial) -> bool {
    user.roles().as_slice() == [role.id()] && user.credential() == Some(credential)
}
