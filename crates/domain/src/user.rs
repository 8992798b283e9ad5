//! User domain types and the ordered role-set invariant.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rolegate_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::RoleId;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Credential payload handed over by the authentication layer.
///
/// The value is stored as-is and never interpreted here.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialMaterial(String);

impl CredentialMaterial {
    /// Wraps an opaque credential value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the opaque value.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for CredentialMaterial {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("CredentialMaterial(<redacted>)")
    }
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account may use its roles.
    Active,
    /// Account is dormant.
    Inactive,
    /// Account is blocked by an administrator.
    Suspended,
}

impl UserStatus {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl FromStr for UserStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            _ => Err(AppError::Validation(format!(
                "unknown user status '{value}'"
            ))),
        }
    }
}

/// Ordered, non-empty list of role references. Index 0 is the primary role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RoleId>", into = "Vec<RoleId>")]
pub struct RoleList(Vec<RoleId>);

impl RoleList {
    /// Creates a list holding only the primary role.
    #[must_use]
    pub fn new(primary: RoleId) -> Self {
        Self(vec![primary])
    }

    /// Restores a list from storage order.
    pub fn from_ids(role_ids: Vec<RoleId>) -> AppResult<Self> {
        if role_ids.is_empty() {
            return Err(AppError::Validation(
                "a user must hold at least one role".to_owned(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = role_ids.iter().find(|role_id| !seen.insert(**role_id)) {
            return Err(AppError::Validation(format!(
                "role '{duplicate}' appears more than once in the role list"
            )));
        }

        Ok(Self(role_ids))
    }

    /// Returns the primary role reference.
    #[must_use]
    pub fn primary(&self) -> RoleId {
        self.0[0]
    }

    /// Returns true when the role is referenced at any position.
    #[must_use]
    pub fn contains(&self, role_id: RoleId) -> bool {
        self.0.contains(&role_id)
    }

    /// Appends a role at the end. Returns false if it was already present.
    pub fn append(&mut self, role_id: RoleId) -> bool {
        if self.contains(role_id) {
            return false;
        }

        self.0.push(role_id);
        true
    }

    /// Overwrites the primary role reference.
    pub fn replace_primary(&mut self, role_id: RoleId) {
        if let Some(position) = self.0.iter().skip(1).position(|existing| *existing == role_id) {
            self.0.remove(position + 1);
        }
        self.0[0] = role_id;
    }

    /// Removes a role at any position. The last remaining role is protected.
    pub fn remove(&mut self, role_id: RoleId) -> AppResult<()> {
        let Some(position) = self.0.iter().position(|existing| *existing == role_id) else {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' is not held by this user"
            )));
        };

        if self.0.len() == 1 {
            return Err(AppError::InvalidState(
                "cannot remove the last role of a user".to_owned(),
            ));
        }

        self.0.remove(position);
        Ok(())
    }

    /// Returns the references in order.
    #[must_use]
    pub fn as_slice(&self) -> &[RoleId] {
        self.0.as_slice()
    }

    /// Returns the number of held roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<RoleId>> for RoleList {
    type Error = AppError;

    fn try_from(value: Vec<RoleId>) -> Result<Self, Self::Error> {
        Self::from_ids(value)
    }
}

impl From<RoleList> for Vec<RoleId> {
    fn from(value: RoleList) -> Self {
        value.0
    }
}

/// Registered user with an ordered role set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    name: NonEmptyString,
    status: UserStatus,
    roles: RoleList,
    credential: Option<CredentialMaterial>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Stored user fields used when rehydrating from persistence.
#[derive(Debug, Clone)]
pub struct UserSnapshot {
    /// User identifier.
    pub id: UserId,
    /// Canonical email.
    pub email: EmailAddress,
    /// Display name.
    pub name: NonEmptyString,
    /// Account status.
    pub status: UserStatus,
    /// Ordered role references.
    pub roles: RoleList,
    /// Opaque credential handed over at signup.
    pub credential: Option<CredentialMaterial>,
    /// Optimistic concurrency counter.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates an active user holding one primary role.
    #[must_use]
    pub fn register(
        email: EmailAddress,
        name: NonEmptyString,
        primary_role: RoleId,
        credential: Option<CredentialMaterial>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email,
            name,
            status: UserStatus::Active,
            roles: RoleList::new(primary_role),
            credential,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrates a stored user.
    #[must_use]
    pub fn restore(snapshot: UserSnapshot) -> Self {
        Self {
            id: snapshot.id,
            email: snapshot.email,
            name: snapshot.name,
            status: snapshot.status,
            roles: snapshot.roles,
            credential: snapshot.credential,
            version: snapshot.version,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the canonical email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the account status.
    #[must_use]
    pub fn status(&self) -> UserStatus {
        self.status
    }

    /// Returns the ordered role references.
    #[must_use]
    pub fn roles(&self) -> &RoleList {
        &self.roles
    }

    /// Returns the opaque credential, if one was provided at signup.
    #[must_use]
    pub fn credential(&self) -> Option<&CredentialMaterial> {
        self.credential.as_ref()
    }

    /// Returns the optimistic concurrency counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns a copy with a new role list, bumping version and timestamp.
    #[must_use]
    pub fn with_roles(&self, roles: RoleList, now: DateTime<Utc>) -> Self {
        Self {
            roles,
            version: self.version + 1,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Returns a copy with a new status, bumping version and timestamp.
    #[must_use]
    pub fn with_status(&self, status: UserStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            version: self.version + 1,
            updated_at: now,
            ..self.clone()
        }
    }
}
