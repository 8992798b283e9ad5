use async_trait::async_trait;

use rolegate_core::AppResult;
use rolegate_domain::{Role, RoleId, RoleName};

/// Catalog roles grouped by the `"<Primary> (<Sub>)"` naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFamily {
    /// The primary catalog role.
    pub primary: Role,
    /// Catalog sub-roles named after the primary.
    pub sub_roles: Vec<Role>,
}

impl CatalogFamily {
    /// Returns true when the primary has no sub-roles.
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.sub_roles.is_empty()
    }
}

/// Repository port for the role namespace.
///
/// Reads are unsynchronized. Forks are never written here; they travel with
/// a [`rolegate_domain::RoleSetChange`] through the user repository.
#[async_trait]
pub trait RoleCatalogRepository: Send + Sync {
    /// Finds a catalog role by exact name. Forks are never returned.
    async fn find_catalog_role(&self, name: &RoleName) -> AppResult<Option<Role>>;

    /// Lists catalog roles whose first name token equals `prefix_token`.
    async fn find_roles_by_prefix(&self, prefix_token: &str) -> AppResult<Vec<Role>>;

    /// Lists every catalog role.
    async fn list_catalog_roles(&self) -> AppResult<Vec<Role>>;

    /// Loads roles of any kind by identifier. Unknown identifiers are skipped.
    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>>;

    /// Inserts a catalog role. Duplicate names are a conflict.
    async fn create_catalog_role(&self, role: Role) -> AppResult<Role>;
}
