//! Administration of the shared role catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{AuditAction, PermissionSet, Role, RoleName};

use crate::{
    AuditEvent, AuditLogEntry, AuditLogRepository, AuditRepository, CatalogFamily,
    RoleCatalogRepository,
};

/// Upper bound for audit listings.
pub const MAX_AUDIT_PAGE: usize = 500;

/// Application service for catalog roles and the audit trail.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn RoleCatalogRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    audit_log_repository: Arc<dyn AuditLogRepository>,
}

impl CatalogService {
    /// Creates a new catalog service.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn RoleCatalogRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        audit_log_repository: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            catalog,
            audit_repository,
            audit_log_repository,
        }
    }

    /// Creates a shared catalog role.
    pub async fn create_catalog_role(
        &self,
        name: RoleName,
        permissions: PermissionSet,
    ) -> AppResult<Role> {
        let role = self
            .catalog
            .create_catalog_role(Role::catalog(name, permissions))
            .await?;

        let appended = self
            .audit_repository
            .append_event(AuditEvent {
                subject: "catalog".to_owned(),
                action: AuditAction::CatalogRoleCreated,
                resource_type: "role".to_owned(),
                resource_id: role.id().to_string(),
                detail: Some(format!("created catalog role '{}'", role.name())),
            })
            .await;
        if let Err(error) = appended {
            warn!(role_id = %role.id(), error = %error, "failed to record audit event");
        }

        info!(role_id = %role.id(), name = %role.name(), "catalog role created");
        Ok(role)
    }

    /// Creates `"<primary> (<sub>)"` under an existing primary catalog role.
    pub async fn create_catalog_sub_role(
        &self,
        primary_name: &RoleName,
        sub_name: &str,
        permissions: PermissionSet,
    ) -> AppResult<Role> {
        if self.catalog.find_catalog_role(primary_name).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "primary catalog role '{primary_name}' does not exist"
            )));
        }

        let name = RoleName::sub_role(primary_name, sub_name)?;
        self.create_catalog_role(name, permissions).await
    }

    /// Lists catalog roles sorted by name.
    pub async fn list_catalog_roles(&self) -> AppResult<Vec<Role>> {
        let mut roles = self.catalog.list_catalog_roles().await?;
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    /// Union of every catalog role's permissions.
    pub async fn list_catalog_permissions(&self) -> AppResult<PermissionSet> {
        Ok(self
            .catalog
            .list_catalog_roles()
            .await?
            .iter()
            .fold(PermissionSet::new(), |acc, role| acc.union(role.permissions())))
    }

    /// Groups catalog roles into primary roles and their sub-roles.
    ///
    /// Sub-roles whose primary no longer exists are reported as standalone
    /// families of their own.
    pub async fn catalog_families(&self) -> AppResult<Vec<CatalogFamily>> {
        let roles = self.list_catalog_roles().await?;
        let mut families: BTreeMap<String, CatalogFamily> = roles
            .iter()
            .filter(|role| !role.name().is_sub_role())
            .map(|role| {
                (
                    role.name().as_str().to_owned(),
                    CatalogFamily {
                        primary: role.clone(),
                        sub_roles: Vec::new(),
                    },
                )
            })
            .collect();

        for role in roles.into_iter().filter(|role| role.name().is_sub_role()) {
            match families.get_mut(role.name().primary_name()) {
                Some(family) => family.sub_roles.push(role),
                None => {
                    families.insert(
                        role.name().as_str().to_owned(),
                        CatalogFamily {
                            primary: role,
                            sub_roles: Vec::new(),
                        },
                    );
                }
            }
        }

        Ok(families.into_values().collect())
    }

    /// Inserts missing catalog roles and returns how many were created.
    pub async fn seed_catalog(&self, entries: Vec<(RoleName, PermissionSet)>) -> AppResult<usize> {
        let mut created = 0;
        for (name, permissions) in entries {
            if self.catalog.find_catalog_role(&name).await?.is_some() {
                continue;
            }

            match self.create_catalog_role(name, permissions).await {
                Ok(_) => created += 1,
                Err(AppError::Conflict(_)) => {}
                Err(error) => return Err(error),
            }
        }

        Ok(created)
    }

    /// Lists the most recent audit entries, newest first.
    pub async fn list_audit_events(&self, limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        self.audit_log_repository
            .list_recent_entries(limit.clamp(1, MAX_AUDIT_PAGE))
            .await
    }
}
