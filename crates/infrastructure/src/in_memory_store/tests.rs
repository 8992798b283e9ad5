use chrono::Utc;
use rolegate_application::{
    AuditEvent, AuditLogRepository, AuditRepository, PendingRequestQuery, RequestRepository,
    RoleCatalogRepository, UserRepository,
};
use rolegate_core::{AppError, NonEmptyString};
use rolegate_domain::{
    AccessRequest, AuditAction, CredentialMaterial, EmailAddress, PermissionSet, RequestPayload,
    ResolvedRoleSet, Role, RoleName, RoleSetChange, User, UserId, grant_permissions,
};

use super::InMemoryStore;

fn role_name(value: &str) -> RoleName {
    RoleName::new(value).unwrap_or_else(|_| unreachable!())
}

fn permissions(values: &[&str]) -> PermissionSet {
    PermissionSet::parse(values.iter().copied()).unwrap_or_else(|_| unreachable!())
}

fn email(value: &str) -> EmailAddress {
    EmailAddress::new(value).unwrap_or_else(|_| unreachable!())
}

async fn store_with_user() -> (InMemoryStore, Role, User) {
    let store = InMemoryStore::new();
    let doctor = store
        .create_catalog_role(Role::catalog(role_name("Doctor"), permissions(&["a"])))
        .await
        .unwrap_or_else(|_| unreachable!());
    let user = store
        .create_user(User::register(
            email("doc@clinic.test"),
            NonEmptyString::new("Doc").unwrap_or_else(|_| unreachable!()),
            doctor.id(),
            None,
            Utc::now(),
        ))
        .await
        .unwrap_or_else(|_| unreachable!());
    (store, doctor, user)
}

async fn grant_change(store: &InMemoryStore, user: User, added: &[&str]) -> RoleSetChange {
    let roles = store
        .find_roles(user.roles().as_slice())
        .await
        .unwrap_or_default();
    let set = ResolvedRoleSet::new(user, roles).unwrap_or_else(|_| unreachable!());
    grant_permissions(&set, &permissions(added)).unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn catalog_lookups_ignore_forks() {
    let (store, doctor, user) = store_with_user().await;
    let change = grant_change(&store, user.clone(), &["b"]).await;
    let updated = change.apply_to(&user, Utc::now());
    assert!(store.commit_role_set_change(change, updated).await.is_ok());
    assert!(
        store
            .create_catalog_role(Role::catalog(role_name("Doctor (Pharmacy)"), permissions(&["p"])))
            .await
            .is_ok()
    );

    let found = store.find_catalog_role(&role_name("Doctor")).await;
    let family = store.find_roles_by_prefix("Doctor").await;

    assert!(matches!(found, Ok(Some(ref role)) if role.id() == doctor.id()));
    let family = family.unwrap_or_default();
    assert_eq!(family.len(), 2);
    assert!(family.iter().all(Role::is_catalog));
}

#[tokio::test]
async fn duplicate_catalog_name_is_conflict() {
    let (store, _, _) = store_with_user().await;

    let result = store
        .create_catalog_role(Role::catalog(role_name("Doctor"), permissions(&["z"])))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let (store, doctor, _) = store_with_user().await;

    let result = store
        .create_user(User::register(
            email("DOC@clinic.test"),
            NonEmptyString::new("Other").unwrap_or_else(|_| unreachable!()),
            doctor.id(),
            None,
            Utc::now(),
        ))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn commit_applies_fork_and_role_list_together() {
    let (store, doctor, user) = store_with_user().await;
    let change = grant_change(&store, user.clone(), &["b"]).await;
    let fork_id = change.created_roles[0].id();
    let updated = change.apply_to(&user, Utc::now());

    let committed = store.commit_role_set_change(change, updated).await;

    assert!(matches!(committed, Ok(ref user) if user.roles().primary() == fork_id));
    let roles = store.find_roles(&[fork_id, doctor.id()]).await.unwrap_or_default();
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[1].permissions(), &permissions(&["a"]));
}

#[tokio::test]
async fn stale_version_is_rejected_without_side_effects() {
    let (store, _, user) = store_with_user().await;
    let first = grant_change(&store, user.clone(), &["b"]).await;
    let stale = grant_change(&store, user.clone(), &["c"]).await;
    let stale_fork = stale.created_roles[0].id();

    let updated = first.apply_to(&user, Utc::now());
    assert!(store.commit_role_set_change(first, updated).await.is_ok());
    let updated = stale.apply_to(&user, Utc::now());
    let result = store.commit_role_set_change(stale, updated).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(store.find_roles(&[stale_fork]).await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn foreign_fork_updates_are_refused() {
    let (store, _, user) = store_with_user().await;
    let mut change = grant_change(&store, user.clone(), &["b"]).await;
    change.created_roles = vec![Role::Fork {
        id: change.created_roles[0].id(),
        name: role_name("Doctor"),
        permissions: permissions(&["a", "b"]),
        owner: UserId::new(),
    }];
    let updated = change.apply_to(&user, Utc::now());

    let result = store.commit_role_set_change(change, updated).await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn pending_signup_is_unique_per_email() {
    let store = InMemoryStore::new();
    let signup = |address: &str| {
        AccessRequest::submit(
            RequestPayload::Signup {
                email: email(address),
                name: NonEmptyString::new("Eve").unwrap_or_else(|_| unreachable!()),
                credential_material: CredentialMaterial::new("opaque"),
                requested_role: role_name("Patient"),
            },
            Utc::now(),
        )
    };

    let first = store.create_request(signup("e@clinic.test")).await;
    let second = store.create_request(signup("e@clinic.test")).await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert!(
        store
            .has_pending_signup(&email("e@clinic.test"))
            .await
            .unwrap_or_default()
    );
}

#[tokio::test]
async fn decisions_are_stored_once() {
    let store = InMemoryStore::new();
    let request = store
        .create_request(AccessRequest::submit(
            RequestPayload::RoleChange {
                subject_email: email("doc@clinic.test"),
                current_role_names: vec!["Doctor".to_owned()],
                requested_role: role_name("Doctor (Pharmacy)"),
            },
            Utc::now(),
        ))
        .await
        .unwrap_or_else(|_| unreachable!());

    let mut approved = request.clone();
    assert!(approved.approve(Utc::now()).is_ok());
    let mut rejected = request.clone();
    assert!(rejected.reject(Utc::now(), None).is_ok());

    assert!(store.save_decision(&approved).await.is_ok());
    assert!(matches!(
        store.save_decision(&rejected).await,
        Err(AppError::InvalidState(_))
    ));
    assert!(
        store
            .list_pending_requests(&PendingRequestQuery::default())
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

#[tokio::test]
async fn audit_entries_are_listed_newest_first() {
    let store = InMemoryStore::new();
    for resource_id in ["first", "second"] {
        assert!(
            store
                .append_event(AuditEvent {
                    subject: "catalog".to_owned(),
                    action: AuditAction::CatalogRoleCreated,
                    resource_type: "role".to_owned(),
                    resource_id: resource_id.to_owned(),
                    detail: None,
                })
                .await
                .is_ok()
        );
    }

    let entries = store.list_recent_entries(10).await.unwrap_or_default();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].resource_id, "second");
    assert_eq!(entries[0].action, "catalog.role.created");
}
