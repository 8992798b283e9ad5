use super::*;

use rolegate_domain::{
    AuditAction, RoleName, UserStatus, append_role, grant_permissions, remove_role,
    revoke_permissions,
};

impl AccessService {
    /// Adds permissions through the user's primary role.
    pub async fn grant_permissions(
        &self,
        user_id: UserId,
        permissions: PermissionSet,
    ) -> AppResult<UserProfile> {
        let _guard = self.lock_user(user_id).await;
        self.grant_permissions_locked(user_id, &permissions).await
    }

    /// Grants while the caller already holds the user's lock.
    pub(crate) async fn grant_permissions_locked(
        &self,
        user_id: UserId,
        permissions: &PermissionSet,
    ) -> AppResult<UserProfile> {
        ensure_not_empty(permissions)?;

        let (set, changed) = self
            .commit_with_retry(user_id, |set| grant_permissions(set, permissions))
            .await?;

        if changed {
            self.audit_user_event(
                set.user(),
                AuditAction::UserPermissionsGranted,
                format!("granted [{}]", describe(permissions)),
            )
            .await;
            info!(
                user_id = %user_id,
                role_id = %set.primary().id(),
                "granted permissions"
            );
        }

        Ok(UserProfile::from(set))
    }

    /// Removes permissions across every held role.
    pub async fn revoke_permissions(
        &self,
        user_id: UserId,
        permissions: PermissionSet,
    ) -> AppResult<UserProfile> {
        ensure_not_empty(&permissions)?;
        let _guard = self.lock_user(user_id).await;

        let (set, changed) = self
            .commit_with_retry(user_id, |set| revoke_permissions(set, &permissions))
            .await?;

        if changed {
            self.audit_user_event(
                set.user(),
                AuditAction::UserPermissionsRevoked,
                format!("revoked [{}]", describe(&permissions)),
            )
            .await;
            info!(
                user_id = %user_id,
                role_count = set.roles().len(),
                "revoked permissions"
            );
        }

        Ok(UserProfile::from(set))
    }

    /// Drops a held catalog role by name.
    pub async fn remove_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
    ) -> AppResult<UserProfile> {
        let role = self
            .catalog
            .find_catalog_role(role_name)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("catalog role '{role_name}' does not exist"))
            })?;

        let _guard = self.lock_user(user_id).await;
        let (set, changed) = self
            .commit_with_retry(user_id, |set| remove_role(set, &role))
            .await?;

        if changed {
            self.audit_user_event(
                set.user(),
                AuditAction::UserRoleRemoved,
                format!("removed role '{role_name}'"),
            )
            .await;
            info!(user_id = %user_id, role_id = %role.id(), "removed role");
        }

        Ok(UserProfile::from(set))
    }

    /// Appends a catalog role while the caller holds the user's lock.
    pub(crate) async fn append_role_locked(
        &self,
        user_id: UserId,
        role: &Role,
    ) -> AppResult<UserProfile> {
        let (set, changed) = self
            .commit_with_retry(user_id, |set| append_role(set, role))
            .await?;

        if changed {
            info!(user_id = %user_id, role_id = %role.id(), "appended role");
        }

        Ok(UserProfile::from(set))
    }

    /// Changes the account status.
    pub async fn update_user_status(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> AppResult<UserProfile> {
        let _guard = self.lock_user(user_id).await;

        let mut attempt = 0;
        let user = loop {
            let current = self.load_user(user_id).await?;
            if current.status() == status {
                break current;
            }

            let previous = current.status();
            let updated = current.with_status(status, Utc::now());
            match self
                .users
                .save_user_status(updated, current.version())
                .await
            {
                Ok(user) => {
                    self.audit_user_event(
                        &user,
                        AuditAction::UserStatusChanged,
                        format!("{} -> {}", previous.as_str(), status.as_str()),
                    )
                    .await;
                    info!(user_id = %user_id, status = status.as_str(), "user status changed");
                    break user;
                }
                Err(AppError::Conflict(_)) if attempt < self.retry_limit => attempt += 1,
                Err(error) => return Err(error),
            }
        };

        self.resolve(user).await.map(UserProfile::from)
    }
}

fn ensure_not_empty(permissions: &PermissionSet) -> AppResult<()> {
    if permissions.is_empty() {
        return Err(AppError::Conflict(
            "requested permission set must not be empty".to_owned(),
        ));
    }

    Ok(())
}
