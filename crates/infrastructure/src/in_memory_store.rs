//! Process-local store implementing every persistence port.
//!
//! All state sits behind one `RwLock`, so a role-set commit is applied as a
//! single write section.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use rolegate_application::{
    AuditEvent, AuditLogEntry, AuditLogRepository, AuditRepository, PendingRequestQuery,
    RequestRepository, RoleCatalogRepository, UserRepository,
};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{
    AccessRequest, EmailAddress, RequestId, RequestKind, Role, RoleId, RoleName, RoleSetChange,
    User, UserId,
};

mod audit;
mod catalog;
mod requests;
mod users;

#[derive(Debug)]
struct StoredAuditEvent {
    id: Uuid,
    event: AuditEvent,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
    roles: HashMap<RoleId, Role>,
    users: HashMap<UserId, User>,
    requests: Vec<AccessRequest>,
    audit_events: Vec<StoredAuditEvent>,
}

/// In-memory implementation of the catalog, user, request and audit ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests;
