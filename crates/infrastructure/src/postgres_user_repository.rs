//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use rolegate_application::UserRepository;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{EmailAddress, Role, RoleSetChange, User, UserId};

use crate::postgres_rows::{
    USER_COLUMNS, UserRow, insert_role, replace_permissions, replace_user_roles, version_to_db,
};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

mod lookup;
mod role_sets;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        self.find_user_impl(user_id).await
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        self.find_user_by_email_impl(email).await
    }

    async fn create_user(&self, user: User) -> AppResult<User> {
        self.create_user_impl(user).await
    }

    async fn commit_role_set_change(&self, change: RoleSetChange, user: User) -> AppResult<User> {
        self.commit_role_set_change_impl(change, user).await
    }

    async fn save_user_status(&self, user: User, expected_version: u64) -> AppResult<User> {
        self.save_user_status_impl(user, expected_version).await
    }
}
