use super::*;

#[async_trait]
impl RoleCatalogRepository for InMemoryStore {
    async fn find_catalog_role(&self, name: &RoleName) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .values()
            .find(|role| role.is_catalog() && role.name() == name)
            .cloned())
    }

    async fn find_roles_by_prefix(&self, prefix_token: &str) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = state
            .roles
            .values()
            .filter(|role| role.is_catalog() && role.name().prefix_token() == prefix_token)
            .cloned()
            .collect();
        roles.sort_by(|left, right| left.name().cmp(right.name()));

        Ok(roles)
    }

    async fn list_catalog_roles(&self) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = state
            .roles
            .values()
            .filter(|role| role.is_catalog())
            .cloned()
            .collect();
        roles.sort_by(|left, right| left.name().cmp(right.name()));

        Ok(roles)
    }

    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;

        Ok(role_ids
            .iter()
            .filter_map(|role_id| state.roles.get(role_id).cloned())
            .collect())
    }

    async fn create_catalog_role(&self, role: Role) -> AppResult<Role> {
        if !role.is_catalog() {
            return Err(AppError::Internal(format!(
                "fork '{}' cannot be stored as a catalog role",
                role.id()
            )));
        }

        let mut state = self.state.write().await;
        if state
            .roles
            .values()
            .any(|existing| existing.is_catalog() && existing.name() == role.name())
        {
            return Err(AppError::Conflict(format!(
                "catalog role '{}' already exists",
                role.name()
            )));
        }

        state.roles.insert(role.id(), role.clone());
        Ok(role)
    }
}
