use super::*;

impl PostgresUserRepository {
    pub(super) async fn commit_role_set_change_impl(
        &self,
        change: RoleSetChange,
        user: User,
    ) -> AppResult<User> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start role set transaction: {error}"))
        })?;

        bump_version(
            &mut transaction,
            change.user_id,
            change.expected_version,
            &user,
        )
        .await?;

        for role in &change.created_roles {
            if role.owner() != Some(change.user_id) {
                return Err(AppError::Internal(format!(
                    "new role '{}' is not a fork of user '{}'",
                    role.id(),
                    change.user_id
                )));
            }
            insert_role(&mut transaction, role).await?;
        }

        for role in &change.updated_roles {
            update_owned_fork(&mut transaction, change.user_id, role).await?;
        }

        replace_user_roles(&mut transaction, change.user_id, user.roles()).await?;
        delete_owned_forks(&mut transaction, &change).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit role set of user '{}': {error}",
                change.user_id
            ))
        })?;

        Ok(user)
    }

    pub(super) async fn save_user_status_impl(
        &self,
        user: User,
        expected_version: u64,
    ) -> AppResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = $3, version = $4, updated_at = $5
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(version_to_db(expected_version)?)
        .bind(user.status().as_str())
        .bind(version_to_db(user.version())?)
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save status of user '{}': {error}",
                user.id()
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_conflict(user.id()).await);
        }

        Ok(user)
    }

    async fn missing_or_conflict(&self, user_id: UserId) -> AppError {
        match self.find_user_impl(user_id).await {
            Ok(Some(_)) => {
                AppError::Conflict(format!("user '{user_id}' was modified concurrently"))
            }
            Ok(None) => AppError::NotFound(format!("user '{user_id}' does not exist")),
            Err(error) => error,
        }
    }
}

async fn bump_version(
    connection: &mut PgConnection,
    user_id: UserId,
    expected_version: u64,
    user: &User,
) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET version = $3, updated_at = $4
        WHERE id = $1 AND version = $2
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(version_to_db(expected_version)?)
    .bind(version_to_db(user.version())?)
    .bind(user.updated_at())
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!("failed to bump version of user '{user_id}': {error}"))
    })?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *connection)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

    Err(match exists {
        Some(_) => AppError::Conflict(format!("user '{user_id}' was modified concurrently")),
        None => AppError::NotFound(format!("user '{user_id}' does not exist")),
    })
}

async fn update_owned_fork(
    connection: &mut PgConnection,
    user_id: UserId,
    role: &Role,
) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE roles
        SET name = $3
        WHERE id = $1 AND kind = 'fork' AND owner_id = $2
        "#,
    )
    .bind(role.id().as_uuid())
    .bind(user_id.as_uuid())
    .bind(role.name().as_str())
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!("failed to update fork '{}': {error}", role.id()))
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::Internal(format!(
            "fork '{}' is not owned by user '{user_id}'",
            role.id()
        )));
    }

    replace_permissions(connection, role).await
}

async fn delete_owned_forks(
    connection: &mut PgConnection,
    change: &RoleSetChange,
) -> AppResult<()> {
    if change.deleted_role_ids.is_empty() {
        return Ok(());
    }

    let role_ids: Vec<Uuid> = change
        .deleted_role_ids
        .iter()
        .map(|role_id| role_id.as_uuid())
        .collect();

    let result = sqlx::query(
        r#"
        DELETE FROM roles
        WHERE id = ANY($1) AND kind = 'fork' AND owner_id = $2
        "#,
    )
    .bind(&role_ids)
    .bind(change.user_id.as_uuid())
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to delete forks of user '{}': {error}",
            change.user_id
        ))
    })?;

    if result.rows_affected() != role_ids.len() as u64 {
        return Err(AppError::Internal(format!(
            "some deleted forks are not owned by user '{}'",
            change.user_id
        )));
    }

    Ok(())
}
