//! PostgreSQL-backed role catalog.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use rolegate_application::RoleCatalogRepository;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Role, RoleId, RoleName};

use crate::postgres_rows::{ROLE_COLUMNS, RoleRow, insert_role};

/// PostgreSQL implementation of the role catalog port.
#[derive(Clone)]
pub struct PostgresRoleCatalogRepository {
    pool: PgPool,
}

impl PostgresRoleCatalogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_roles(
        &self,
        filter: &str,
        bind: RoleFilter<'_>,
        operation: &str,
    ) -> AppResult<Vec<Role>> {
        let sql = format!(
            r#"
            SELECT {ROLE_COLUMNS}
            FROM roles r
            LEFT JOIN role_permissions p ON p.role_id = r.id
            WHERE {filter}
            GROUP BY r.id
            ORDER BY r.name
            "#
        );

        let query = sqlx::query_as::<_, RoleRow>(sql.as_str());
        let query = match bind {
            RoleFilter::None => query,
            RoleFilter::Text(value) => query.bind(value),
            RoleFilter::Ids(values) => query.bind(values),
        };

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to {operation}: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }
}

enum RoleFilter<'a> {
    None,
    Text(&'a str),
    Ids(Vec<Uuid>),
}

#[async_trait]
impl RoleCatalogRepository for PostgresRoleCatalogRepository {
    async fn find_catalog_role(&self, name: &RoleName) -> AppResult<Option<Role>> {
        let mut roles = self
            .fetch_roles(
                "r.kind = 'catalog' AND r.name = $1",
                RoleFilter::Text(name.as_str()),
                "find catalog role",
            )
            .await?;

        Ok(roles.pop())
    }

    async fn find_roles_by_prefix(&self, prefix_token: &str) -> AppResult<Vec<Role>> {
        self.fetch_roles(
            "r.kind = 'catalog' AND split_part(r.name, ' ', 1) = $1",
            RoleFilter::Text(prefix_token),
            "list role family",
        )
        .await
    }

    async fn list_catalog_roles(&self) -> AppResult<Vec<Role>> {
        self.fetch_roles("r.kind = 'catalog'", RoleFilter::None, "list catalog roles")
            .await
    }

    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        self.fetch_roles(
            "r.id = ANY($1)",
            RoleFilter::Ids(role_ids.iter().map(RoleId::as_uuid).collect()),
            "load roles",
        )
        .await
    }

    async fn create_catalog_role(&self, role: Role) -> AppResult<Role> {
        if !role.is_catalog() {
            return Err(AppError::Internal(format!(
                "fork '{}' cannot be stored as a catalog role",
                role.id()
            )));
        }

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start catalog transaction: {error}"))
        })?;

        insert_role(&mut transaction, &role).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit catalog role: {error}"))
        })?;

        Ok(role)
    }
}
