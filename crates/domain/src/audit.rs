use std::str::FromStr;

use rolegate_core::AppError;
use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a catalog role or sub-role is created.
    CatalogRoleCreated,
    /// Emitted when any approval request is submitted.
    RequestSubmitted,
    /// Emitted when a pending request is approved.
    RequestApproved,
    /// Emitted when a pending request is rejected.
    RequestRejected,
    /// Emitted when permissions are added to a user.
    UserPermissionsGranted,
    /// Emitted when permissions are removed from a user.
    UserPermissionsRevoked,
    /// Emitted when a catalog role is dropped from a user's role list.
    UserRoleRemoved,
    /// Emitted when a user's lifecycle status changes.
    UserStatusChanged,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CatalogRoleCreated => "catalog.role.created",
            Self::RequestSubmitted => "request.submitted",
            Self::RequestApproved => "request.approved",
            Self::RequestRejected => "request.rejected",
            Self::UserPermissionsGranted => "user.permissions.granted",
            Self::UserPermissionsRevoked => "user.permissions.revoked",
            Self::UserRoleRemoved => "user.role.removed",
            Self::UserStatusChanged => "user.status.changed",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AuditAction] = &[
            AuditAction::CatalogRoleCreated,
            AuditAction::RequestSubmitted,
            AuditAction::RequestApproved,
            AuditAction::RequestRejected,
            AuditAction::UserPermissionsGranted,
            AuditAction::UserPermissionsRevoked,
            AuditAction::UserRoleRemoved,
            AuditAction::UserStatusChanged,
        ];

        ALL
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown audit action '{value}'")))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::AuditAction;

    #[test]
    fn action_roundtrip_storage_value() {
        for action in AuditAction::all() {
            let restored = AuditAction::from_str(action.as_str());
            assert!(restored.is_ok());
            assert_eq!(restored.unwrap_or(AuditAction::RequestSubmitted), *action);
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(AuditAction::from_str("security.role.assigned").is_err());
    }
}
