//! Row shapes and transactional helpers shared by the PostgreSQL repositories.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use rolegate_core::{AppError, AppResult, NonEmptyString};
use rolegate_domain::{
    CredentialMaterial, EmailAddress, PermissionSet, Role, RoleId, RoleList, RoleName, User,
    UserId, UserSnapshot,
};

pub(crate) const ROLE_COLUMNS: &str = r#"
    r.id,
    r.name,
    r.kind,
    r.owner_id,
    COALESCE(
        array_agg(p.permission ORDER BY p.permission) FILTER (WHERE p.permission IS NOT NULL),
        '{}'::TEXT[]
    ) AS permissions
"#;

pub(crate) const USER_COLUMNS: &str = r#"
    u.id,
    u.email,
    u.name,
    u.status,
    u.credential,
    u.version,
    u.created_at,
    u.updated_at,
    COALESCE(
        array_agg(ur.role_id ORDER BY ur.position) FILTER (WHERE ur.role_id IS NOT NULL),
        '{}'::UUID[]
    ) AS role_ids
"#;

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    id: Uuid,
    name: String,
    kind: String,
    owner_id: Option<Uuid>,
    permissions: Vec<String>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let id = RoleId::from_uuid(row.id);
        let name = RoleName::new(row.name)?;
        let permissions = PermissionSet::parse(row.permissions)?;

        match (row.kind.as_str(), row.owner_id) {
            ("catalog", None) => Ok(Self::Catalog {
                id,
                name,
                permissions,
            }),
            ("fork", Some(owner)) => Ok(Self::Fork {
                id,
                name,
                permissions,
                owner: UserId::from_uuid(owner),
            }),
            (kind, _) => Err(AppError::Internal(format!(
                "role '{id}' has inconsistent kind '{kind}'"
            ))),
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    status: String,
    credential: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    role_ids: Vec<Uuid>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let version = u64::try_from(row.version).map_err(|error| {
            AppError::Internal(format!("user '{}' has invalid version: {error}", row.id))
        })?;

        Ok(User::restore(UserSnapshot {
            id: UserId::from_uuid(row.id),
            email: EmailAddress::new(row.email)?,
            name: NonEmptyString::new(row.name)?,
            status: row.status.parse()?,
            roles: RoleList::from_ids(row.role_ids.into_iter().map(RoleId::from_uuid).collect())?,
            credential: row.credential.map(CredentialMaterial::new),
            version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

pub(crate) fn version_to_db(version: u64) -> AppResult<i64> {
    i64::try_from(version)
        .map_err(|error| AppError::Internal(format!("version {version} overflows: {error}")))
}

pub(crate) fn role_kind(role: &Role) -> &'static str {
    if role.is_catalog() { "catalog" } else { "fork" }
}

/// Inserts a role and its permissions.
pub(crate) async fn insert_role(connection: &mut PgConnection, role: &Role) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO roles (id, name, kind, owner_id)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(role.id().as_uuid())
    .bind(role.name().as_str())
    .bind(role_kind(role))
    .bind(role.owner().map(|owner| owner.as_uuid()))
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        if let sqlx::Error::Database(ref database_error) = error
            && database_error.code().as_deref() == Some("23505")
        {
            return AppError::Conflict(format!("catalog role '{}' already exists", role.name()));
        }

        AppError::Internal(format!("failed to insert role '{}': {error}", role.id()))
    })?;

    insert_permissions(connection, role).await
}

/// Replaces the stored permission rows of a role.
pub(crate) async fn replace_permissions(
    connection: &mut PgConnection,
    role: &Role,
) -> AppResult<()> {
    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(role.id().as_uuid())
        .execute(&mut *connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to clear permissions of role '{}': {error}",
                role.id()
            ))
        })?;

    insert_permissions(connection, role).await
}

async fn insert_permissions(connection: &mut PgConnection, role: &Role) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission)
        SELECT $1, permission FROM UNNEST($2::TEXT[]) AS permission
        "#,
    )
    .bind(role.id().as_uuid())
    .bind(role.permissions().to_names())
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to store permissions of role '{}': {error}",
            role.id()
        ))
    })?;

    Ok(())
}

/// Rewrites the ordered role references of a user.
pub(crate) async fn replace_user_roles(
    connection: &mut PgConnection,
    user_id: UserId,
    roles: &RoleList,
) -> AppResult<()> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id.as_uuid())
        .execute(&mut *connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to clear roles of user '{user_id}': {error}"))
        })?;

    let role_ids: Vec<Uuid> = roles
        .as_slice()
        .iter()
        .map(|role_id| role_id.as_uuid())
        .collect();

    sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role_id, position)
        SELECT $1, role_id, (ordinality - 1)::INTEGER
        FROM UNNEST($2::UUID[]) WITH ORDINALITY AS entries(role_id, ordinality)
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(role_ids)
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!("failed to store roles of user '{user_id}': {error}"))
    })?;

    Ok(())
}
