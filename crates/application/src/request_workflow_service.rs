//! Approval pipeline for signup, role-change and permission-change requests.
//!
//! Decisions lock the request first and the subject second. Submissions only
//! ever take the subject's email scope, so the order cannot invert.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use rolegate_core::{AppError, AppResult, NonEmptyString};
use rolegate_domain::{
    AccessRequest, AuditAction, CredentialMaterial, EmailAddress, RequestId, RequestKind, Role,
    RoleName,
};

use crate::notification::{Notification, NotificationDispatcher};
use crate::user_locks::{LockScope, UserLocks};
use crate::{
    AccessService, AuditEvent, AuditRepository, PendingRequestQuery, RequestRepository,
    RoleCatalogRepository, UserRepository,
};

mod decision;
mod submission;

/// Input payload for account requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequestInput {
    /// Email of the future account.
    pub email: EmailAddress,
    /// Display name.
    pub name: NonEmptyString,
    /// Opaque credential forwarded to the created user.
    pub credential_material: CredentialMaterial,
    /// Catalog role the account starts with.
    pub requested_role: RoleName,
}

/// Application service driving the request state machine.
#[derive(Clone)]
pub struct RequestWorkflowService {
    catalog: Arc<dyn RoleCatalogRepository>,
    users: Arc<dyn UserRepository>,
    requests: Arc<dyn RequestRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    access: AccessService,
    locks: UserLocks,
    notifications: NotificationDispatcher,
}

impl RequestWorkflowService {
    /// Creates a new workflow service.
    ///
    /// `locks` must be the registry shared with `access`.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn RoleCatalogRepository>,
        users: Arc<dyn UserRepository>,
        requests: Arc<dyn RequestRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        access: AccessService,
        locks: UserLocks,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            catalog,
            users,
            requests,
            audit_repository,
            access,
            locks,
            notifications,
        }
    }

    /// Lists pending requests, oldest first.
    pub async fn list_pending_requests(
        &self,
        query: &PendingRequestQuery,
    ) -> AppResult<Vec<AccessRequest>> {
        self.requests.list_pending_requests(query).await
    }

    /// Returns one request in any state.
    pub async fn get_request(&self, request_id: RequestId) -> AppResult<AccessRequest> {
        self.requests
            .find_request(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("request '{request_id}' does not exist")))
    }

    async fn require_catalog_role(&self, name: &RoleName) -> AppResult<Role> {
        self.catalog
            .find_catalog_role(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("catalog role '{name}' does not exist")))
    }

    /// Records a stored request transition. Failures are logged, not returned.
    async fn audit_request(&self, request: &AccessRequest, action: AuditAction, detail: String) {
        let appended = self
            .audit_repository
            .append_event(AuditEvent {
                subject: request.payload().subject_email().as_str().to_owned(),
                action,
                resource_type: "access_request".to_owned(),
                resource_id: request.id().to_string(),
                detail: Some(detail),
            })
            .await;

        if let Err(error) = appended {
            warn!(
                request_id = %request.id(),
                action = action.as_str(),
                error = %error,
                "failed to record audit event"
            );
        }
    }
}

fn kind_label(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Signup => "signup",
        RequestKind::RoleChange => "role change",
        RequestKind::PermissionChange => "permission change",
    }
}
