//! Approval requests and their one-way state machine.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rolegate_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permission::PermissionSet;
use crate::role::RoleName;
use crate::user::{CredentialMaterial, EmailAddress};

/// Unique identifier for an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random request identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a request identifier from an existing UUID value.
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

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// New account holding one catalog role.
    Signup,
    /// Additional catalog role for an existing user.
    RoleChange,
    /// Additional permissions for an existing user.
    PermissionChange,
}

impl RequestKind {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::RoleChange => "role_change",
            Self::PermissionChange => "permission_change",
        }
    }
}

impl FromStr for RequestKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "signup" => Ok(Self::Signup),
            "role_change" => Ok(Self::RoleChange),
            "permission_change" => Ok(Self::PermissionChange),
            _ => Err(AppError::Validation(format!(
                "unknown request kind '{value}'"
            ))),
        }
    }
}

/// Request lifecycle status. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting a decision.
    Pending,
    /// Accepted and applied.
    Approved,
    /// Declined without mutation.
    Rejected,
}

impl RequestStatus {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true for statuses that admit no further transition.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "unknown request status '{value}'"
            ))),
        }
    }
}

/// Kind-specific request data captured at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestPayload {
    /// Account creation.
    Signup {
        /// Email of the future account.
        email: EmailAddress,
        /// Display name of the future account.
        name: NonEmptyString,
        /// Opaque credential forwarded to the created user.
        credential_material: CredentialMaterial,
        /// Catalog role that becomes the primary role.
        requested_role: RoleName,
    },
    /// Additional catalog role.
    RoleChange {
        /// Existing user.
        subject_email: EmailAddress,
        /// Role names held at submission time.
        current_role_names: Vec<String>,
        /// Catalog role to append.
        requested_role: RoleName,
    },
    /// Additional permissions.
    PermissionChange {
        /// Existing user.
        subject_email: EmailAddress,
        /// Effective permissions at submission time.
        current_permissions: PermissionSet,
        /// Permissions to grant.
        requested_permissions: PermissionSet,
    },
}

impl RequestPayload {
    /// Returns the request kind implied by the payload.
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Signup { .. } => RequestKind::Signup,
            Self::RoleChange { .. } => RequestKind::RoleChange,
            Self::PermissionChange { .. } => RequestKind::PermissionChange,
        }
    }

    /// Returns the email of the person the request is about.
    #[must_use]
    pub fn subject_email(&self) -> &EmailAddress {
        match self {
            Self::Signup { email, .. } => email,
            Self::RoleChange { subject_email, .. }
            | Self::PermissionChange { subject_email, .. } => subject_email,
        }
    }

    /// Returns the requested catalog role, for kinds that name one.
    #[must_use]
    pub fn requested_role(&self) -> Option<&RoleName> {
        match self {
            Self::Signup { requested_role, .. } | Self::RoleChange { requested_role, .. } => {
                Some(requested_role)
            }
            Self::PermissionChange { .. } => None,
        }
    }
}

/// A pending or decided change awaiting human approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    id: RequestId,
    payload: RequestPayload,
    status: RequestStatus,
    submitted_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
    decision_reason: Option<String>,
}

impl AccessRequest {
    /// Creates a pending request.
    #[must_use]
    pub fn submit(payload: RequestPayload, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: RequestId::new(),
            payload,
            status: RequestStatus::Pending,
            submitted_at,
            decided_at: None,
            decision_reason: None,
        }
    }

    /// Rehydrates a stored request.
    #[must_use]
    pub fn restore(
        id: RequestId,
        payload: RequestPayload,
        status: RequestStatus,
        submitted_at: DateTime<Utc>,
        decided_at: Option<DateTime<Utc>>,
        decision_reason: Option<String>,
    ) -> Self {
        Self {
            id,
            payload,
            status,
            submitted_at,
            decided_at,
            decision_reason,
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the request kind.
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        self.payload.kind()
    }

    /// Returns the kind-specific payload.
    #[must_use]
    pub fn payload(&self) -> &RequestPayload {
        &self.payload
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Returns the decision timestamp of terminal requests.
    #[must_use]
    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    /// Returns the reason recorded with a rejection.
    #[must_use]
    pub fn decision_reason(&self) -> Option<&str> {
        self.decision_reason.as_deref()
    }

    /// Fails unless the request is still pending.
    pub fn ensure_pending(&self) -> AppResult<()> {
        if self.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "request '{}' is already {}",
                self.id,
                self.status.as_str()
            )));
        }

        Ok(())
    }

    /// Transitions `Pending -> Approved`.
    pub fn approve(&mut self, decided_at: DateTime<Utc>) -> AppResult<()> {
        self.ensure_pending()?;
        self.status = RequestStatus::Approved;
        self.decided_at = Some(decided_at);
        Ok(())
    }

    /// Transitions `Pending -> Rejected`.
    pub fn reject(&mut self, decided_at: DateTime<Utc>, reason: Option<String>) -> AppResult<()> {
        self.ensure_pending()?;
        self.status = RequestStatus::Rejected;
        self.decided_at = Some(decided_at);
        self.decision_reason = reason.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });
        Ok(())
    }
}
