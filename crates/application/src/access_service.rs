//! Per-user role composition use-cases.
//!
//! Every mutation runs under the user's [`LockScope::User`] guard and commits a
//! [`RoleSetChange`] with the version it was planned against. Version
//! collisions from other processes are retried a bounded number of times.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{PermissionSet, ResolvedRoleSet, Role, RoleSetChange, User, UserId};

use crate::user_locks::{LockScope, UserLocks};
use crate::{AuditEvent, AuditRepository, RoleCatalogRepository, UserRepository};

mod mutations;
mod queries;

/// Default number of reload-and-retry rounds after a version conflict.
pub const DEFAULT_RETRY_LIMIT: usize = 3;

/// A user with resolved roles and their effective permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// The user record.
    pub user: User,
    /// Held roles in role-list order.
    pub roles: Vec<Role>,
    /// Union of every held role's permissions.
    pub effective_permissions: PermissionSet,
}

impl From<ResolvedRoleSet> for UserProfile {
    fn from(set: ResolvedRoleSet) -> Self {
        let effective_permissions = set.effective_permissions();
        let roles = set.roles().to_vec();
        Self {
            user: set.into_user(),
            roles,
            effective_permissions,
        }
    }
}

/// Application service for the composition engine operations.
#[derive(Clone)]
pub struct AccessService {
    catalog: Arc<dyn RoleCatalogRepository>,
    users: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    locks: UserLocks,
    retry_limit: usize,
}

impl AccessService {
    /// Creates a new access service.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn RoleCatalogRepository>,
        users: Arc<dyn UserRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        locks: UserLocks,
    ) -> Self {
        Self {
            catalog,
            users,
            audit_repository,
            locks,
            retry_limit: DEFAULT_RETRY_LIMIT,
        }
    }

    /// Overrides the optimistic retry budget.
    #[must_use]
    pub fn with_retry_limit(mut self, retry_limit: usize) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    async fn load_user(&self, user_id: UserId) -> AppResult<User> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    pub(crate) async fn resolve(&self, user: User) -> AppResult<ResolvedRoleSet> {
        let roles = self.catalog.find_roles(user.roles().as_slice()).await?;
        ResolvedRoleSet::new(user, roles)
    }

    async fn resolve_user(&self, user_id: UserId) -> AppResult<ResolvedRoleSet> {
        let user = self.load_user(user_id).await?;
        self.resolve(user).await
    }

    /// Plans and commits a role-set change. The caller holds the user's lock.
    ///
    /// Returns the resolved set after the commit and whether anything changed.
    pub(crate) async fn commit_with_retry<F>(
        &self,
        user_id: UserId,
        plan: F,
    ) -> AppResult<(ResolvedRoleSet, bool)>
    where
        F: Fn(&ResolvedRoleSet) -> AppResult<RoleSetChange> + Send + Sync,
    {
        let mut attempt = 0;
        loop {
            let set = self.resolve_user(user_id).await?;
            let change = plan(&set)?;
            if change.is_noop(set.user().roles()) {
                return Ok((set, false));
            }

            let updated_user = change.apply_to(set.user(), Utc::now());
            match self
                .users
                .commit_role_set_change(change, updated_user)
                .await
            {
                Ok(user) => return Ok((self.resolve(user).await?, true)),
                Err(AppError::Conflict(message)) if attempt < self.retry_limit => {
                    attempt += 1;
                    info!(
                        user_id = %user_id,
                        attempt,
                        reason = %message,
                        "retrying role-set commit after version conflict"
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }

    pub(crate) async fn lock_user(&self, user_id: UserId) -> crate::user_locks::ScopeGuard {
        self.locks.acquire(LockScope::User(user_id)).await
    }

    /// Records a committed user change. Failures are logged, not returned.
    async fn audit_user_event(
        &self,
        user: &User,
        action: rolegate_domain::AuditAction,
        detail: String,
    ) {
        let appended = self
            .audit_repository
            .append_event(AuditEvent {
                subject: user.email().as_str().to_owned(),
                action,
                resource_type: "user".to_owned(),
                resource_id: user.id().to_string(),
                detail: Some(detail),
            })
            .await;

        if let Err(error) = appended {
            warn!(
                user_id = %user.id(),
                action = action.as_str(),
                error = %error,
                "failed to record audit event"
            );
        }
    }
}

fn describe(permissions: &PermissionSet) -> String {
    permissions.to_names().join(", ")
}
