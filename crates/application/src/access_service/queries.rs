use super::*;

use rolegate_domain::{EmailAddress, available_permissions, available_roles, removable_permissions};

impl AccessService {
    /// Catalog roles of the user's primary family not held yet.
    ///
    /// An empty result means no roles are available; it is not an error.
    pub async fn available_roles_for(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let set = self.resolve_user(user_id).await?;
        let family = self
            .catalog
            .find_roles_by_prefix(set.primary().name().prefix_token())
            .await?;

        let mut roles = available_roles(&set, &family);
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    /// Family permissions the user could still acquire.
    pub async fn available_permissions_for(&self, user_id: UserId) -> AppResult<PermissionSet> {
        let set = self.resolve_user(user_id).await?;
        let family = self
            .catalog
            .find_roles_by_prefix(set.primary().name().prefix_token())
            .await?;

        Ok(available_permissions(&set, &family))
    }

    /// Permissions the user may give up without crossing the primary floor.
    pub async fn removable_permissions_for(&self, user_id: UserId) -> AppResult<PermissionSet> {
        let set = self.resolve_user(user_id).await?;
        let ancestor = if set.primary().is_fork() {
            self.catalog.find_catalog_role(set.primary().name()).await?
        } else {
            None
        };

        Ok(removable_permissions(&set, ancestor.as_ref()))
    }

    /// Returns a user with resolved roles.
    pub async fn get_user(&self, user_id: UserId) -> AppResult<UserProfile> {
        self.resolve_user(user_id).await.map(UserProfile::from)
    }

    /// Looks a user up by email.
    pub async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<UserProfile> {
        let user = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no user with email '{email}'")))?;

        self.resolve(user).await.map(UserProfile::from)
    }
}
