use std::collections::BTreeSet;

use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum accepted length of one permission name.
pub const PERMISSION_MAX_LENGTH: usize = 128;

/// Validated permission name such as `view_patient_information`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(String);

impl Permission {
    /// Creates a validated permission name.
    ///
    /// Surrounding whitespace is trimmed; embedded whitespace is rejected so
    /// that stored names stay single tokens.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "permission name must not be empty".to_owned(),
            ));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "permission name '{trimmed}' must not contain whitespace"
            )));
        }

        if trimmed.chars().count() > PERMISSION_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "permission name must not exceed {PERMISSION_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the stored permission name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Permission {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.0
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Ordered, duplicate-free set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parses transport values into a set, rejecting any malformed name.
    pub fn parse<I, S>(values: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values
            .into_iter()
            .map(Permission::new)
            .collect::<AppResult<BTreeSet<_>>>()
            .map(Self)
    }

    /// Returns `self ∪ other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    /// Returns `self − other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    /// Returns true when every permission of `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Returns true when the permission is present.
    #[must_use]
    pub fn contains(&self, permission: &Permission) -> bool {
        self.0.contains(permission)
    }

    /// Adds one permission.
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    /// Returns true when the set holds no permission.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates permissions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    /// Returns permission names in name order.
    #[must_use]
    pub fn to_names(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|permission| permission.as_str().to_owned())
            .collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Permission> for PermissionSet {
    fn extend<T: IntoIterator<Item = Permission>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::collections::btree_set::IntoIter<Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Permission, PermissionSet};

    fn set(values: &[&str]) -> PermissionSet {
        PermissionSet::parse(values.iter().copied()).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn permission_with_inner_whitespace_is_rejected() {
        assert!(Permission::new("view profile").is_err());
    }

    #[test]
    fn permission_is_trimmed() {
        let permission = Permission::new("  use_models ");
        assert!(permission.is_ok());
        assert_eq!(
            permission.unwrap_or_else(|_| unreachable!()).as_str(),
            "use_models"
        );
    }

    #[test]
    fn parse_collapses_duplicates() {
        assert_eq!(set(&["a", "b", "a"]).len(), 2);
    }

    #[test]
    fn parse_rejects_any_malformed_entry() {
        assert!(PermissionSet::parse(["ok", ""]).is_err());
    }

    #[test]
    fn union_and_difference_follow_set_semantics() {
        let left = set(&["a", "b"]);
        let right = set(&["b", "c"]);

        assert_eq!(left.union(&right), set(&["a", "b", "c"]));
        assert_eq!(left.difference(&right), set(&["a"]));
        assert!(set(&["b"]).is_subset(&left));
    }
}
