//! Role/permission composition engine.
//!
//! Every operation here is pure: it reads a [`ResolvedRoleSet`] and returns a
//! [`RoleSetChange`] describing the fork inserts, fork updates, fork deletes
//! and the rewritten role list. Persisting the change is the caller's job and
//! must happen as one unit guarded by `expected_version`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rolegate_core::{AppError, AppResult};

use crate::permission::PermissionSet;
use crate::role::{Role, RoleId};
use crate::user::{RoleList, User, UserId};

/// A user together with its roles, in role-list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoleSet {
    user: User,
    roles: Vec<Role>,
}

impl ResolvedRoleSet {
    /// Aligns loaded roles with the user's role list.
    ///
    /// Fails when a referenced role is missing or when a fork belongs to a
    /// different user.
    pub fn new(user: User, loaded_roles: Vec<Role>) -> AppResult<Self> {
        let mut by_id: HashMap<RoleId, Role> = loaded_roles
            .into_iter()
            .map(|role| (role.id(), role))
            .collect();

        let mut roles = Vec::with_capacity(user.roles().len());
        for role_id in user.roles().as_slice() {
            let Some(role) = by_id.remove(role_id) else {
                return Err(AppError::Internal(format!(
                    "user '{}' references missing role '{role_id}'",
                    user.id()
                )));
            };

            if let Some(owner) = role.owner()
                && owner != user.id()
            {
                return Err(AppError::Internal(format!(
                    "fork '{role_id}' is owned by '{owner}' but referenced by '{}'",
                    user.id()
                )));
            }

            roles.push(role);
        }

        Ok(Self { user, roles })
    }

    /// Returns the user.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Consumes the set and returns the user.
    #[must_use]
    pub fn into_user(self) -> User {
        self.user
    }

    /// Returns the roles in role-list order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        self.roles.as_slice()
    }

    /// Returns the primary role.
    #[must_use]
    pub fn primary(&self) -> &Role {
        &self.roles[0]
    }

    /// Returns the union of permissions across every held role.
    #[must_use]
    pub fn effective_permissions(&self) -> PermissionSet {
        self.roles
            .iter()
            .fold(PermissionSet::new(), |acc, role| acc.union(role.permissions()))
    }
}

/// Persistable outcome of one composition operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSetChange {
    /// User whose role set changes.
    pub user_id: UserId,
    /// Version the change was computed against.
    pub expected_version: u64,
    /// Forks to insert.
    pub created_roles: Vec<Role>,
    /// Forks whose permissions are replaced in place.
    pub updated_roles: Vec<Role>,
    /// Forks to hard-delete.
    pub deleted_role_ids: Vec<RoleId>,
    /// The rewritten role list.
    pub roles: RoleList,
}

impl RoleSetChange {
    fn unchanged(set: &ResolvedRoleSet) -> Self {
        Self {
            user_id: set.user.id(),
            expected_version: set.user.version(),
            created_roles: Vec::new(),
            updated_roles: Vec::new(),
            deleted_role_ids: Vec::new(),
            roles: set.user.roles().clone(),
        }
    }

    /// Returns true when applying the change would not alter anything.
    #[must_use]
    pub fn is_noop(&self, current: &RoleList) -> bool {
        self.created_roles.is_empty()
            && self.updated_roles.is_empty()
            && self.deleted_role_ids.is_empty()
            && &self.roles == current
    }

    /// Returns the user after the change, with bumped version.
    #[must_use]
    pub fn apply_to(&self, user: &User, now: DateTime<Utc>) -> User {
        user.with_roles(self.roles.clone(), now)
    }
}

/// Adds permissions through the primary role.
///
/// A catalog primary is forked so the shared definition stays untouched; a
/// fork primary is updated in place.
pub fn grant_permissions(
    set: &ResolvedRoleSet,
    new_permissions: &PermissionSet,
) -> AppResult<RoleSetChange> {
    let mut change = RoleSetChange::unchanged(set);
    let primary = set.primary();

    if new_permissions.is_subset(primary.permissions()) {
        return Ok(change);
    }

    let merged = primary.permissions().union(new_permissions);
    if primary.is_catalog() {
        let fork = Role::fork_of(primary, merged, set.user.id());
        change.roles.replace_primary(fork.id());
        change.created_roles.push(fork);
    } else {
        change.updated_roles.push(primary.with_permissions(merged)?);
    }

    Ok(change)
}

/// Removes permissions across every held role.
///
/// The primary is only touched when it is a fork. Secondary roles left empty
/// are dropped (and deleted if they are forks); secondary catalog roles that
/// lose some permissions are replaced by a fork appended at the end.
pub fn revoke_permissions(
    set: &ResolvedRoleSet,
    remove: &PermissionSet,
) -> AppResult<RoleSetChange> {
    let mut change = RoleSetChange::unchanged(set);
    let mut kept = Vec::with_capacity(set.roles.len());
    let mut appended = Vec::new();

    for (index, role) in set.roles.iter().enumerate() {
        let remaining = role.permissions().difference(remove);
        let untouched = remaining.len() == role.permissions().len();

        if index == 0 {
            if role.is_fork() && !untouched {
                change.updated_roles.push(role.with_permissions(remaining)?);
            }
            kept.push(role.id());
            continue;
        }

        if untouched {
            kept.push(role.id());
        } else if remaining.is_empty() {
            if role.is_fork() {
                change.deleted_role_ids.push(role.id());
            }
        } else if role.is_catalog() {
            let fork = Role::fork_of(role, remaining, set.user.id());
            appended.push(fork.id());
            change.created_roles.push(fork);
        } else {
            change.updated_roles.push(role.with_permissions(remaining)?);
            kept.push(role.id());
        }
    }

    kept.extend(appended);
    change.roles = RoleList::from_ids(kept)?;
    Ok(change)
}

/// Appends a catalog role to the role list. Holding it already is a no-op.
pub fn append_role(set: &ResolvedRoleSet, role: &Role) -> AppResult<RoleSetChange> {
    if !role.is_catalog() {
        return Err(AppError::InvalidState(format!(
            "only catalog roles can be appended, '{}' is a fork",
            role.name()
        )));
    }

    let mut change = RoleSetChange::unchanged(set);
    change.roles.append(role.id());
    Ok(change)
}

/// Drops a held catalog role from the role list.
pub fn remove_role(set: &ResolvedRoleSet, role: &Role) -> AppResult<RoleSetChange> {
    let mut change = RoleSetChange::unchanged(set);
    change.roles.remove(role.id())?;
    Ok(change)
}

/// Catalog roles of the primary's family that the user does not hold yet.
///
/// `family` is every catalog role whose first name token equals the
/// primary's. The catalog ancestor of a forked primary is excluded too.
#[must_use]
pub fn available_roles(set: &ResolvedRoleSet, family: &[Role]) -> Vec<Role> {
    let primary = set.primary();
    let prefix = primary.name().prefix_token();

    family
        .iter()
        .filter(|role| role.is_catalog())
        .filter(|role| role.name().prefix_token() == prefix)
        .filter(|role| !set.user.roles().contains(role.id()))
        .filter(|role| !(primary.is_fork() && role.name() == primary.name()))
        .cloned()
        .collect()
}

/// Permissions offered by the primary's family that the user does not have.
#[must_use]
pub fn available_permissions(set: &ResolvedRoleSet, family: &[Role]) -> PermissionSet {
    let prefix = set.primary().name().prefix_token();
    let offered = family
        .iter()
        .filter(|role| role.is_catalog() && role.name().prefix_token() == prefix)
        .fold(PermissionSet::new(), |acc, role| acc.union(role.permissions()));

    offered.difference(&set.effective_permissions())
}

/// Permissions the user may give up without going below their floor.
///
/// The floor is the catalog primary's permission set, or for a forked
/// primary the set of its catalog ancestor (`ancestor`), or empty when the
/// ancestor no longer exists.
#[must_use]
pub fn removable_permissions(set: &ResolvedRoleSet, ancestor: Option<&Role>) -> PermissionSet {
    let primary = set.primary();
    let floor = if primary.is_catalog() {
        primary.permissions().clone()
    } else {
        ancestor
            .filter(|role| role.is_catalog())
            .map(|role| role.permissions().clone())
            .unwrap_or_default()
    };

    set.effective_permissions().difference(&floor)
}

#[cfg(test)]
mod tests;
