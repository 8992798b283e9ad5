use async_trait::async_trait;

use rolegate_core::AppResult;
use rolegate_domain::{EmailAddress, RoleSetChange, User, UserId};

/// Repository port for users and the forks they own.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds a user by normalized email.
    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>>;

    /// Inserts a new user. A taken email is a conflict.
    async fn create_user(&self, user: User) -> AppResult<User>;

    /// Applies a role-set change as one unit.
    ///
    /// Inserts, updates and deletes the carried forks and replaces the role
    /// list with `user`'s. Fails with `Conflict` when the stored version no
    /// longer equals `change.expected_version`.
    async fn commit_role_set_change(&self, change: RoleSetChange, user: User) -> AppResult<User>;

    /// Stores a status change guarded by `expected_version`.
    async fn save_user_status(&self, user: User, expected_version: u64) -> AppResult<User>;
}
