//! Catalog and fork role definitions.
//!
//! Catalog roles are shared, canonical definitions. Fork roles are private
//! copies synthesized for exactly one user when that user's permissions
//! diverge from the catalog. The owner is part of the fork itself, so a role
//! can never be both or neither.

use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permission::PermissionSet;
use crate::user::UserId;

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Display name of a role.
///
/// Sub-roles are named `"<Primary> (<Sub>)"`. Stored data depends on this
/// exact format: the family of a role is the first space-delimited token of
/// its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Creates a validated role name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Builds the catalog name of a sub-role belonging to `primary`.
    pub fn sub_role(primary: &RoleName, sub_name: &str) -> AppResult<Self> {
        if primary.is_sub_role() {
            return Err(AppError::Validation(format!(
                "role '{primary}' is itself a sub-role and cannot own sub-roles"
            )));
        }

        let sub_name = sub_name.trim();
        if sub_name.is_empty() {
            return Err(AppError::Validation(
                "sub-role name must not be empty".to_owned(),
            ));
        }

        if sub_name.contains(['(', ')']) {
            return Err(AppError::Validation(format!(
                "sub-role name '{sub_name}' must not contain parentheses"
            )));
        }

        Ok(Self(format!("{} ({sub_name})", primary.as_str())))
    }

    /// Returns the stored name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the text before the first space, used for family discovery.
    #[must_use]
    pub fn prefix_token(&self) -> &str {
        self.0
            .split_once(' ')
            .map_or(self.0.as_str(), |(head, _)| head)
    }

    /// Returns the primary part of the name, dropping any `" (<Sub>)"` suffix.
    #[must_use]
    pub fn primary_name(&self) -> &str {
        match self.0.split_once(" (") {
            Some((head, tail)) if tail.ends_with(')') => head,
            _ => self.0.as_str(),
        }
    }

    /// Returns true when the name follows the sub-role convention.
    #[must_use]
    pub fn is_sub_role(&self) -> bool {
        self.primary_name().len() != self.0.len()
    }
}

impl TryFrom<String> for RoleName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// A role is either a shared catalog definition or a single-owner fork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    /// Canonical definition shared by every user who holds it.
    Catalog {
        /// Role identifier.
        id: RoleId,
        /// Catalog name, possibly following the sub-role convention.
        name: RoleName,
        /// Granted permissions.
        permissions: PermissionSet,
    },
    /// Private copy owned by exactly one user.
    Fork {
        /// Role identifier.
        id: RoleId,
        /// Primary name inherited from the forked role.
        name: RoleName,
        /// Granted permissions.
        permissions: PermissionSet,
        /// The only user allowed to reference this role.
        owner: UserId,
    },
}

impl Role {
    /// Creates a new catalog role.
    #[must_use]
    pub fn catalog(name: RoleName, permissions: PermissionSet) -> Self {
        Self::Catalog {
            id: RoleId::new(),
            name,
            permissions,
        }
    }

    /// Creates a fork of `base` owned by `owner`.
    ///
    /// Forks keep the base role's primary name and drop sub-role qualifiers.
    #[must_use]
    pub fn fork_of(base: &Role, permissions: PermissionSet, owner: UserId) -> Self {
        let name = RoleName(base.name().primary_name().to_owned());
        Self::Fork {
            id: RoleId::new(),
            name,
            permissions,
            owner,
        }
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        match self {
            Self::Catalog { id, .. } | Self::Fork { id, .. } => *id,
        }
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &RoleName {
        match self {
            Self::Catalog { name, .. } | Self::Fork { name, .. } => name,
        }
    }

    /// Returns the granted permissions.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        match self {
            Self::Catalog { permissions, .. } | Self::Fork { permissions, .. } => permissions,
        }
    }

    /// Returns true for shared catalog definitions.
    #[must_use]
    pub fn is_catalog(&self) -> bool {
        matches!(self, Self::Catalog { .. })
    }

    /// Returns true for single-owner forks.
    #[must_use]
    pub fn is_fork(&self) -> bool {
        matches!(self, Self::Fork { .. })
    }

    /// Returns the owning user of a fork.
    #[must_use]
    pub fn owner(&self) -> Option<UserId> {
        match self {
            Self::Catalog { .. } => None,
            Self::Fork { owner, .. } => Some(*owner),
        }
    }

    /// Returns a copy of this fork with replaced permissions.
    ///
    /// Catalog roles are never mutated on behalf of a single user.
    pub fn with_permissions(&self, permissions: PermissionSet) -> AppResult<Self> {
        match self {
            Self::Catalog { name, .. } => Err(AppError::InvalidState(format!(
                "catalog role '{name}' cannot be mutated for a single user"
            ))),
            Self::Fork {
                id, name, owner, ..
            } => Ok(Self::Fork {
                id: *id,
                name: name.clone(),
                permissions,
                owner: *owner,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, RoleName};
    use crate::permission::PermissionSet;
    use crate::user::UserId;

    fn name(value: &str) -> RoleName {
        RoleName::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn permissions(values: &[&str]) -> PermissionSet {
        PermissionSet::parse(values.iter().copied()).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn sub_role_name_uses_parenthesised_format() {
        let sub = RoleName::sub_role(&name("Doctor"), " Lab Diagnostic ");
        assert!(sub.is_ok());
        assert_eq!(
            sub.unwrap_or_else(|_| unreachable!()).as_str(),
            "Doctor (Lab Diagnostic)"
        );
    }

    #[test]
    fn sub_role_of_sub_role_is_rejected() {
        let result = RoleName::sub_role(&name("Doctor (Pharmacy)"), "Night");
        assert!(result.is_err());
    }

    #[test]
    fn prefix_token_splits_on_first_space() {
        assert_eq!(name("Doctor (Appointment Scheduling)").prefix_token(), "Doctor");
        assert_eq!(name("AI Specialist").prefix_token(), "AI");
        assert_eq!(name("Patient").prefix_token(), "Patient");
    }

    #[test]
    fn primary_name_drops_sub_role_qualifier() {
        assert_eq!(name("Doctor (Lab Diagnostic)").primary_name(), "Doctor");
        assert_eq!(name("Nurse 2").primary_name(), "Nurse 2");
        assert!(name("Doctor (Lab Diagnostic)").is_sub_role());
        assert!(!name("Nurse 2").is_sub_role());
    }

    #[test]
    fn fork_keeps_primary_name_and_owner() {
        let owner = UserId::new();
        let base = Role::catalog(name("Doctor (Pharmacy)"), permissions(&["a"]));
        let fork = Role::fork_of(&base, permissions(&["a", "b"]), owner);

        assert!(fork.is_fork());
        assert!(!fork.is_catalog());
        assert_eq!(fork.name().as_str(), "Doctor");
        assert_eq!(fork.owner(), Some(owner));
        assert_ne!(fork.id(), base.id());
    }

    #[test]
    fn catalog_role_refuses_permission_mutation() {
        let catalog = Role::catalog(name("Patient"), permissions(&["p1"]));
        assert!(catalog.with_permissions(permissions(&["p2"])).is_err());
    }

    #[test]
    fn role_serializes_with_kind_tag() {
        let catalog = Role::catalog(name("Patient"), permissions(&["p1"]));
        let value = serde_json::to_value(&catalog).unwrap_or_default();
        assert_eq!(value["kind"], "catalog");
        assert_eq!(value["name"], "Patient");
    }
}
