//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod composition;
mod permission;
mod request;
mod role;
mod user;

pub use audit::AuditAction;
pub use composition::{
    ResolvedRoleSet, RoleSetChange, append_role, available_permissions, available_roles,
    grant_permissions, remove_role, removable_permissions, revoke_permissions,
};
pub use permission::{Permission, PermissionSet};
pub use request::{AccessRequest, RequestId, RequestKind, RequestPayload, RequestStatus};
pub use role::{Role, RoleId, RoleName};
pub use user::{
    CredentialMaterial, EmailAddress, RoleList, User, UserId, UserSnapshot, UserStatus,
};
