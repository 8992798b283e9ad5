use chrono::Utc;
use rolegate_core::NonEmptyString;

use super::*;
use crate::role::RoleName;
use crate::user::{EmailAddress, UserSnapshot, UserStatus};

fn permissions(values: &[&str]) -> PermissionSet {
    PermissionSet::parse(values.iter().copied()).unwrap_or_else(|_| unreachable!())
}

fn catalog(name: &str, values: &[&str]) -> Role {
    Role::catalog(
        RoleName::new(name).unwrap_or_else(|_| unreachable!()),
        permissions(values),
    )
}

fn fork(owner: UserId, name: &str, values: &[&str]) -> Role {
    Role::Fork {
        id: RoleId::new(),
        name: RoleName::new(name).unwrap_or_else(|_| unreachable!()),
        permissions: permissions(values),
        owner,
    }
}

fn user(user_id: UserId, roles: &[&Role]) -> User {
    let now = Utc::now();
    User::restore(UserSnapshot {
        id: user_id,
        email: EmailAddress::new("u@example.com").unwrap_or_else(|_| unreachable!()),
        name: NonEmptyString::new("U").unwrap_or_else(|_| unreachable!()),
        status: UserStatus::Active,
        roles: RoleList::from_ids(roles.iter().map(|role| role.id()).collect())
            .unwrap_or_else(|_| unreachable!()),
        credential: None,
        version: 3,
        created_at: now,
        updated_at: now,
    })
}

fn resolved(user_id: UserId, roles: &[&Role]) -> ResolvedRoleSet {
    ResolvedRoleSet::new(
        user(user_id, roles),
        roles.iter().map(|role| (*role).clone()).collect(),
    )
    .unwrap_or_else(|_| unreachable!())
}

#[test]
fn resolving_reorders_loaded_roles_to_list_order() {
    let user_id = UserId::new();
    let doctor = catalog("Doctor", &["a"]);
    let lab = catalog("Doctor (Lab Diagnostic)", &["x"]);

    let set = ResolvedRoleSet::new(
        user(user_id, &[&doctor, &lab]),
        vec![lab.clone(), doctor.clone()],
    );

    assert!(set.is_ok());
    let set = set.unwrap_or_else(|_| unreachable!());
    assert_eq!(set.primary().id(), doctor.id());
    assert_eq!(set.roles()[1].id(), lab.id());
}

#[test]
fn resolving_rejects_foreign_fork() {
    let user_id = UserId::new();
    let foreign = fork(UserId::new(), "Doctor", &["a"]);

    let result = ResolvedRoleSet::new(user(user_id, &[&foreign]), vec![foreign.clone()]);

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[test]
fn resolving_rejects_missing_role() {
    let user_id = UserId::new();
    let doctor = catalog("Doctor", &["a"]);

    let result = ResolvedRoleSet::new(user(user_id, &[&doctor]), Vec::new());

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[test]
fn grant_on_catalog_primary_forks_and_replaces_primary() {
    let user_id = UserId::new();
    let doctor = catalog("Doctor", &["a", "b"]);
    let set = resolved(user_id, &[&doctor]);

    let change = grant_permissions(&set, &permissions(&["c"])).unwrap_or_else(|_| unreachable!());

    assert_eq!(change.created_roles.len(), 1);
    let created = &change.created_roles[0];
    assert!(created.is_fork());
    assert_eq!(created.name().as_str(), "Doctor");
    assert_eq!(created.permissions(), &permissions(&["a", "b", "c"]));
    assert_eq!(created.owner(), Some(user_id));
    assert_eq!(change.roles.primary(), created.id());
    assert!(change.updated_roles.is_empty());
    assert_eq!(doctor.permissions(), &permissions(&["a", "b"]));
    assert_eq!(change.expected_version, 3);
}

#[test]
fn grant_on_fork_primary_updates_in_place() {
    let user_id = UserId::new();
    let primary = fork(user_id, "Doctor", &["a", "b", "c"]);
    let set = resolved(user_id, &[&primary]);

    let change = grant_permissions(&set, &permissions(&["d"])).unwrap_or_else(|_| unreachable!());

    assert!(change.created_roles.is_empty());
    assert_eq!(change.updated_roles.len(), 1);
    assert_eq!(change.updated_roles[0].id(), primary.id());
    assert_eq!(
        change.updated_roles[0].permissions(),
        &permissions(&["a", "b", "c", "d"])
    );
    assert_eq!(change.roles.as_slice(), &[primary.id()]);
}

#[test]
fn grant_of_already_held_primary_permissions_is_noop() {
    let user_id = UserId::new();
    let doctor = catalog("Doctor", &["a", "b"]);
    let set = resolved(user_id, &[&doctor]);

    let change = grant_permissions(&set, &permissions(&["a"])).unwrap_or_else(|_| unreachable!());

    assert!(change.is_noop(set.user().roles()));
}

#[test]
fn revoke_leaves_catalog_primary_untouched() {
    let user_id = UserId::new();
    let doctor = catalog("Doctor", &["a", "b"]);
    let set = resolved(user_id, &[&doctor]);

    let change = revoke_permissions(&set, &permissions(&["a"])).unwrap_or_else(|_| unreachable!());

    assert!(change.is_noop(set.user().roles()));
}

#[test]
fn revoke_on_fork_primary_mutates_in_place() {
    let user_id = UserId::new();
    let primary = fork(user_id, "Doctor", &["a", "b", "c"]);
    let set = resolved(user_id, &[&primary]);

    let change = revoke_permissions(&set, &permissions(&["c"])).unwrap_or_else(|_| unreachable!());

    assert_eq!(change.updated_roles.len(), 1);
    assert_eq!(change.updated_roles[0].permissions(), &permissions(&["a", "b"]));
    assert_eq!(change.roles.as_slice(), &[primary.id()]);
}

#[test]
fn revoke_emptying_a_secondary_fork_deletes_it() {
    let user_id = UserId::new();
    let primary = catalog("Doctor", &["a"]);
    let lab = fork(user_id, "Doctor (Lab)", &["x"]);
    let set = resolved(user_id, &[&primary, &lab]);

    let change = revoke_permissions(&set, &permissions(&["x"])).unwrap_or_else(|_| unreachable!());

    assert_eq!(change.deleted_role_ids, vec![lab.id()]);
    assert_eq!(change.roles.as_slice(), &[primary.id()]);
    assert_eq!(change.roles.len(), set.user().roles().len() - 1);
}

#[test]
fn revoke_emptying_a_secondary_catalog_role_only_drops_the_reference() {
    let user_id = UserId::new();
    let primary = catalog("Doctor", &["a"]);
    let lab = catalog("Doctor (Lab Diagnostic)", &["x"]);
    let set = resolved(user_id, &[&primary, &lab]);

    let change = revoke_permissions(&set, &permissions(&["x"])).unwrap_or_else(|_| unreachable!());

    assert!(change.deleted_role_ids.is_empty());
    assert_eq!(change.roles.as_slice(), &[primary.id()]);
}

#[test]
fn revoke_on_secondary_catalog_role_forks_and_appends() {
    let user_id = UserId::new();
    let primary = catalog("Doctor", &["a"]);
    let pharmacy = catalog("Doctor (Pharmacy)", &["p", "q"]);
    let lab = catalog("Doctor (Lab Diagnostic)", &["x"]);
    let set = resolved(user_id, &[&primary, &pharmacy, &lab]);

    let change = revoke_permissions(&set, &permissions(&["q"])).unwrap_or_else(|_| unreachable!());

    assert_eq!(change.created_roles.len(), 1);
    let created = &change.created_roles[0];
    assert_eq!(created.permissions(), &permissions(&["p"]));
    assert_eq!(created.name().as_str(), "Doctor");
    assert_eq!(
        change.roles.as_slice(),
        &[primary.id(), lab.id(), created.id()]
    );
}

#[test]
fn revoke_on_secondary_fork_updates_in_place() {
    let user_id = UserId::new();
    let primary = catalog("Doctor", &["a"]);
    let secondary = fork(user_id, "Doctor", &["p", "q"]);
    let set = resolved(user_id, &[&primary, &secondary]);

    let change = revoke_permissions(&set, &permissions(&["q"])).unwrap_or_else(|_| unreachable!());

    assert!(change.created_roles.is_empty());
    assert_eq!(change.updated_roles.len(), 1);
    assert_eq!(change.updated_roles[0].id(), secondary.id());
    assert_eq!(change.roles.as_slice(), &[primary.id(), secondary.id()]);
}

#[test]
fn append_role_twice_yields_the_same_list() {
    let user_id = UserId::new();
    let primary = catalog("Doctor", &["a"]);
    let lab = catalog("Doctor (Lab Diagnostic)", &["x"]);
    let set = resolved(user_id, &[&primary]);

    let once = append_role(&set, &lab).unwrap_or_else(|_| unreachable!());
    let after_once = resolved(user_id, &[&primary, &lab]);
    let twice = append_role(&after_once, &lab).unwrap_or_else(|_| unreachable!());

    assert_eq!(once.roles, twice.roles);
    assert!(twice.is_noop(after_once.user().roles()));
}

#[test]
fn append_role_rejects_forks() {
    let user_id = UserId::new();
    let primary = catalog("Doctor", &["a"]);
    let private = fork(user_id, "Doctor", &["b"]);
    let set = resolved(user_id, &[&primary]);

    assert!(matches!(
        append_role(&set, &private),
        Err(AppError::InvalidState(_))
    ));
}

#[test]
fn remove_last_role_is_invalid_state() {
    let user_id = UserId::new();
    let primary = catalog("Doctor", &["a"]);
    let set = resolved(user_id, &[&primary]);

    assert!(matches!(
        remove_role(&set, &primary),
        Err(AppError::InvalidState(_))
    ));
}

#[test]
fn available_roles_lists_unheld_family_members() {
    let user_id = UserId::new();
    let doctor = catalog("Doctor", &["a"]);
    let lab = catalog("Doctor (Lab Diagnostic)", &["x"]);
    let pharmacy = catalog("Doctor (Pharmacy)", &["p"]);
    let set = resolved(user_id, &[&doctor, &lab]);

    let available = available_roles(&set, &[doctor.clone(), lab.clone(), pharmacy.clone()]);

    assert_eq!(available, vec![pharmacy]);
}

#[test]
fn available_roles_hides_the_ancestor_of_a_forked_primary() {
    let user_id = UserId::new();
    let doctor = catalog("Doctor", &["a"]);
    let primary = fork(user_id, "Doctor", &["a", "z"]);
    let lab = catalog("Doctor (Lab Diagnostic)", &["x"]);
    let set = resolved(user_id, &[&primary]);

    let available = available_roles(&set, &[doctor, lab.clone()]);

    assert_eq!(available, vec![lab]);
}

#[test]
fn available_permissions_excludes_held_permissions() {
    let user_id = UserId::new();
    let doctor = catalog("Doctor", &["a", "b"]);
    let lab = catalog("Doctor (Lab Diagnostic)", &["b", "x"]);
    let set = resolved(user_id, &[&doctor]);

    let available = available_permissions(&set, &[doctor.clone(), lab]);

    assert_eq!(available, permissions(&["x"]));
}

#[test]
fn removable_permissions_protect_the_catalog_floor() {
    let user_id = UserId::new();
    let doctor = catalog("Doctor", &["a", "b"]);
    let primary = fork(user_id, "Doctor", &["a", "b", "c"]);
    let lab = catalog("Doctor (Lab Diagnostic)", &["x", "a"]);
    let set = resolved(user_id, &[&primary, &lab]);

    let removable = removable_permissions(&set, Some(&doctor));

    assert_eq!(removable, permissions(&["c", "x"]));
}

#[test]
fn removable_permissions_for_orphaned_fork_has_no_floor() {
    let user_id = UserId::new();
    let primary = fork(user_id, "Retired", &["a"]);
    let set = resolved(user_id, &[&primary]);

    assert_eq!(removable_permissions(&set, None), permissions(&["a"]));
}

mod properties {
    use proptest::prelude::*;

    use super::*;

    fn permission_set() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set(0usize..8, 0..5)
            .prop_map(|indices| indices.into_iter().map(|index| format!("p{index}")).collect())
    }

    fn role_shapes() -> impl Strategy<Value = Vec<(bool, Vec<String>)>> {
        prop::collection::vec((any::<bool>(), permission_set()), 1..5)
    }

    fn build(user_id: UserId, shapes: &[(bool, Vec<String>)]) -> (Vec<Role>, ResolvedRoleSet) {
        let roles: Vec<Role> = shapes
            .iter()
            .enumerate()
            .map(|(index, (is_fork, names))| {
                let name = if index == 0 {
                    "Doctor".to_owned()
                } else {
                    format!("Doctor (Sub {index})")
                };
                let values: Vec<&str> = names.iter().map(String::as_str).collect();
                if *is_fork {
                    fork(user_id, name.as_str(), &values)
                } else {
                    catalog(name.as_str(), &values)
                }
            })
            .collect();
        let references: Vec<&Role> = roles.iter().collect();
        let set = resolved(user_id, &references);
        (roles, set)
    }

    fn to_set(names: &[String]) -> PermissionSet {
        PermissionSet::parse(names.iter().cloned()).unwrap_or_default()
    }

    proptest! {
        #[test]
        fn revoke_keeps_primary_and_never_empties(shapes in role_shapes(), remove in permission_set()) {
            let user_id = UserId::new();
            let (roles, set) = build(user_id, &shapes);

            let change = revoke_permissions(&set, &to_set(&remove));
            prop_assert!(change.is_ok());
            let change = change.unwrap_or_else(|_| unreachable!());

            prop_assert!(!change.roles.is_empty());
            prop_assert_eq!(change.roles.primary(), roles[0].id());
            prop_assert!(change.updated_roles.iter().all(Role::is_fork));
            for deleted in &change.deleted_role_ids {
                prop_assert!(roles.iter().any(|role| role.id() == *deleted && role.is_fork()));
            }
        }

        #[test]
        fn grant_never_mutates_catalog_roles(shapes in role_shapes(), add in permission_set()) {
            let user_id = UserId::new();
            let (_, set) = build(user_id, &shapes);

            let change = grant_permissions(&set, &to_set(&add));
            prop_assert!(change.is_ok());
            let change = change.unwrap_or_else(|_| unreachable!());

            prop_assert!(change.updated_roles.iter().all(Role::is_fork));
            prop_assert!(change.created_roles.iter().all(|role| role.owner() == Some(user_id)));
            prop_assert!(change.deleted_role_ids.is_empty());
            let granted = change
                .created_roles
                .iter()
                .chain(change.updated_roles.iter())
                .fold(set.primary().permissions().clone(), |acc, role| {
                    acc.union(role.permissions())
                });
            prop_assert!(to_set(&add).is_subset(&granted));
        }

        #[test]
        fn removable_never_includes_the_floor(shapes in role_shapes(), floor in permission_set()) {
            let user_id = UserId::new();
            let (_, set) = build(user_id, &shapes);
            let ancestor = catalog("Doctor", &floor.iter().map(String::as_str).collect::<Vec<_>>());
            let expected_floor = if set.primary().is_catalog() {
                set.primary().permissions().clone()
            } else {
                ancestor.permissions().clone()
            };

            let removable = removable_permissions(&set, Some(&ancestor));

            prop_assert!(removable.iter().all(|permission| !expected_floor.contains(permission)));
        }
    }
}
