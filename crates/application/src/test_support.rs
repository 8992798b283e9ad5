use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use rolegate_core::{AppError, AppResult, NonEmptyString};
use rolegate_domain::{
    AccessRequest, EmailAddress, PermissionSet, RequestId, RequestKind, Role, RoleId, RoleList,
    RoleName, RoleSetChange, User, UserId, UserSnapshot, UserStatus,
};

use crate::{
    AuditEvent, AuditLogEntry, AuditLogRepository, AuditRepository, Notifier,
    PendingRequestQuery, RequestRepository, RoleCatalogRepository, UserRepository,
};

#[derive(Default)]
pub(crate) struct FakeStore {
    pub(crate) roles: Mutex<HashMap<RoleId, Role>>,
    pub(crate) users: Mutex<HashMap<UserId, User>>,
    pub(crate) requests: Mutex<Vec<AccessRequest>>,
    pub(crate) events: Mutex<Vec<AuditEvent>>,
    pub(crate) injected_conflicts: Mutex<usize>,
    pub(crate) failing_decisions: Mutex<usize>,
    pub(crate) audit_unavailable: Mutex<bool>,
}

impl FakeStore {
    pub(crate) async fn add_catalog_role(&self, name: &str, permissions: &[&str]) -> Role {
        let role = Role::catalog(
            RoleName::new(name).unwrap_or_else(|_| unreachable!()),
            permission_set(permissions),
        );
        self.roles.lock().await.insert(role.id(), role.clone());
        role
    }

    pub(crate) async fn add_fork(&self, owner: UserId, name: &str, permissions: &[&str]) -> Role {
        let role = Role::Fork {
            id: RoleId::new(),
            name: RoleName::new(name).unwrap_or_else(|_| unreachable!()),
            permissions: permission_set(permissions),
            owner,
        };
        self.roles.lock().await.insert(role.id(), role.clone());
        role
    }

    pub(crate) async fn add_user(&self, user_id: UserId, email: &str, roles: &[&Role]) -> User {
        let now = Utc::now();
        let user = User::restore(UserSnapshot {
            id: user_id,
            email: EmailAddress::new(email).unwrap_or_else(|_| unreachable!()),
            name: NonEmptyString::new("Test User").unwrap_or_else(|_| unreachable!()),
            status: UserStatus::Active,
            roles: RoleList::from_ids(roles.iter().map(|role| role.id()).collect())
                .unwrap_or_else(|_| unreachable!()),
            credential: None,
            version: 0,
            created_at: now,
            updated_at: now,
        });
        self.users.lock().await.insert(user.id(), user.clone());
        user
    }

    pub(crate) async fn role(&self, role_id: RoleId) -> Option<Role> {
        self.roles.lock().await.get(&role_id).cloned()
    }

    pub(crate) async fn user(&self, user_id: UserId) -> Option<User> {
        self.users.lock().await.get(&user_id).cloned()
    }

    pub(crate) async fn actions(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .await
            .iter()
            .map(|event| event.action.as_str())
            .collect()
    }
}

pub(crate) fn permission_set(values: &[&str]) -> PermissionSet {
    PermissionSet::parse(values.iter().copied()).unwrap_or_else(|_| unreachable!())
}

#[async_trait]
impl RoleCatalogRepository for FakeStore {
    async fn find_catalog_role(&self, name: &RoleName) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .values()
            .find(|role| role.is_catalog() && role.name() == name)
            .cloned())
    }

    async fn find_roles_by_prefix(&self, prefix_token: &str) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .values()
            .filter(|role| role.is_catalog() && role.name().prefix_token() == prefix_token)
            .cloned()
            .collect())
    }

    async fn list_catalog_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .values()
            .filter(|role| role.is_catalog())
            .cloned()
            .collect())
    }

    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let roles = self.roles.lock().await;
        Ok(role_ids
            .iter()
            .filter_map(|role_id| roles.get(role_id).cloned())
            .collect())
    }

    async fn create_catalog_role(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;
        if roles
            .values()
            .any(|existing| existing.is_catalog() && existing.name() == role.name())
        {
            return Err(AppError::Conflict(format!(
                "catalog role '{}' already exists",
                role.name()
            )));
        }
        roles.insert(role.id(), role.clone());
        Ok(role)
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn create_user(&self, user: User) -> AppResult<User> {
        let mut users = self.users.lock().await;
        if users.values().any(|existing| existing.email() == user.email()) {
            return Err(AppError::Conflict(format!(
                "user '{}' already exists",
                user.email()
            )));
        }
        users.insert(user.id(), user.clone());
        Ok(user)
    }

    async fn commit_role_set_change(&self, change: RoleSetChange, user: User) -> AppResult<User> {
        {
            let mut injected = self.injected_conflicts.lock().await;
            if *injected > 0 {
                *injected -= 1;
                return Err(AppError::Conflict("injected version conflict".to_owned()));
            }
        }

        let mut users = self.users.lock().await;
        let stored_version = users.get(&change.user_id).map(User::version);
        if stored_version != Some(change.expected_version) {
            return Err(AppError::Conflict(format!(
                "user '{}' was modified concurrently",
                change.user_id
            )));
        }

        let mut roles = self.roles.lock().await;
        for role in change.created_roles.into_iter().chain(change.updated_roles) {
            roles.insert(role.id(), role);
        }
        for role_id in &change.deleted_role_ids {
            roles.remove(role_id);
        }
        users.insert(user.id(), user.clone());
        Ok(user)
    }

    async fn save_user_status(&self, user: User, expected_version: u64) -> AppResult<User> {
        let mut users = self.users.lock().await;
        if users.get(&user.id()).map(User::version) != Some(expected_version) {
            return Err(AppError::Conflict(format!(
                "user '{}' was modified concurrently",
                user.id()
            )));
        }
        users.insert(user.id(), user.clone());
        Ok(user)
    }
}

#[async_trait]
impl RequestRepository for FakeStore {
    async fn create_request(&self, request: AccessRequest) -> AppResult<AccessRequest> {
        self.requests.lock().await.push(request.clone());
        Ok(request)
    }

    async fn find_request(&self, request_id: RequestId) -> AppResult<Option<AccessRequest>> {
        Ok(self
            .requests
            .lock()
            .await
            .iter()
            .find(|request| request.id() == request_id)
            .cloned())
    }

    async fn list_pending_requests(
        &self,
        query: &PendingRequestQuery,
    ) -> AppResult<Vec<AccessRequest>> {
        let mut pending: Vec<AccessRequest> = self
            .requests
            .lock()
            .await
            .iter()
            .filter(|request| query.matches(request))
            .cloned()
            .collect();
        pending.sort_by_key(AccessRequest::submitted_at);
        Ok(pending)
    }

    async fn has_pending_signup(&self, email: &EmailAddress) -> AppResult<bool> {
        Ok(self.requests.lock().await.iter().any(|request| {
            request.kind() == RequestKind::Signup
                && !request.status().is_terminal()
                && request.payload().subject_email() == email
        }))
    }

    async fn save_decision(&self, request: &AccessRequest) -> AppResult<()> {
        {
            let mut failing = self.failing_decisions.lock().await;
            if *failing > 0 {
                *failing -= 1;
                return Err(AppError::Internal("decision store unavailable".to_owned()));
            }
        }

        let mut requests = self.requests.lock().await;
        let Some(stored) = requests
            .iter_mut()
            .find(|stored| stored.id() == request.id())
        else {
            return Err(AppError::NotFound(format!(
                "request '{}' does not exist",
                request.id()
            )));
        };
        stored.ensure_pending()?;
        *stored = request.clone();
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for FakeStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        if *self.audit_unavailable.lock().await {
            return Err(AppError::Internal("audit store unavailable".to_owned()));
        }
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for FakeStore {
    async fn list_recent_entries(&self, limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .events
            .lock()
            .await
            .iter()
            .enumerate()
            .rev()
            .take(limit)
            .map(|(index, event)| AuditLogEntry {
                event_id: index.to_string(),
                subject: event.subject.clone(),
                action: event.action.as_str().to_owned(),
                resource_type: event.resource_type.clone(),
                resource_id: event.resource_id.clone(),
                detail: event.detail.clone(),
                created_at: Utc::now().to_rfc3339(),
            })
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    /// Yields until `count` messages were delivered or the budget runs out.
    pub(crate) async fn wait_for(&self, count: usize) -> Vec<(String, String, String)> {
        for _ in 0..100 {
            {
                let sent = self.sent.lock().await;
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            tokio::task::yield_now().await;
        }
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, to: &EmailAddress, subject: &str, body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .await
            .push((to.as_str().to_owned(), subject.to_owned(), body.to_owned()));
        Ok(())
    }
}

pub(crate) struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _to: &EmailAddress, _subject: &str, _body: &str) -> AppResult<()> {
        Err(AppError::Internal("smtp relay unavailable".to_owned()))
    }
}

pub(crate) fn shared_store() -> Arc<FakeStore> {
    Arc::new(FakeStore::default())
}
