use super::*;

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn create_user(&self, user: User) -> AppResult<User> {
        let mut state = self.state.write().await;

        if state
            .users
            .values()
            .any(|existing| existing.email() == user.email())
        {
            return Err(AppError::Conflict(format!(
                "an account for '{}' already exists",
                user.email()
            )));
        }

        if let Some(missing) = user
            .roles()
            .as_slice()
            .iter()
            .find(|role_id| !state.roles.contains_key(*role_id))
        {
            return Err(AppError::NotFound(format!("role '{missing}' does not exist")));
        }

        state.users.insert(user.id(), user.clone());
        Ok(user)
    }

    async fn commit_role_set_change(&self, change: RoleSetChange, user: User) -> AppResult<User> {
        let mut state = self.state.write().await;

        let stored_version = state.users.get(&change.user_id).map(User::version);
        match stored_version {
            None => {
                return Err(AppError::NotFound(format!(
                    "user '{}' does not exist",
                    change.user_id
                )));
            }
            Some(version) if version != change.expected_version => {
                return Err(AppError::Conflict(format!(
                    "user '{}' was modified concurrently",
                    change.user_id
                )));
            }
            Some(_) => {}
        }

        let owned_by_user =
            |role: Option<&Role>| role.and_then(Role::owner) == Some(change.user_id);
        for role in &change.updated_roles {
            if !owned_by_user(state.roles.get(&role.id())) {
                return Err(AppError::Internal(format!(
                    "fork '{}' is not owned by user '{}'",
                    role.id(),
                    change.user_id
                )));
            }
        }
        for role_id in &change.deleted_role_ids {
            if !owned_by_user(state.roles.get(role_id)) {
                return Err(AppError::Internal(format!(
                    "fork '{role_id}' is not owned by user '{}'",
                    change.user_id
                )));
            }
        }
        if let Some(foreign) = change
            .created_roles
            .iter()
            .find(|role| role.owner() != Some(change.user_id))
        {
            return Err(AppError::Internal(format!(
                "new role '{}' is not a fork of user '{}'",
                foreign.id(),
                change.user_id
            )));
        }

        for role in change.created_roles.into_iter().chain(change.updated_roles) {
            state.roles.insert(role.id(), role);
        }
        for role_id in &change.deleted_role_ids {
            state.roles.remove(role_id);
        }
        state.users.insert(user.id(), user.clone());

        Ok(user)
    }

    async fn save_user_status(&self, user: User, expected_version: u64) -> AppResult<User> {
        let mut state = self.state.write().await;

        match state.users.get(&user.id()).map(User::version) {
            None => Err(AppError::NotFound(format!(
                "user '{}' does not exist",
                user.id()
            ))),
            Some(version) if version != expected_version => Err(AppError::Conflict(format!(
                "user '{}' was modified concurrently",
                user.id()
            ))),
            Some(_) => {
                state.users.insert(user.id(), user.clone());
                Ok(user)
            }
        }
    }
}
