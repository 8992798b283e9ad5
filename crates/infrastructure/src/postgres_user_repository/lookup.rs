use super::*;

impl PostgresUserRepository {
    pub(super) async fn find_user_impl(&self, user_id: UserId) -> AppResult<Option<User>> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            WHERE u.id = $1
            GROUP BY u.id
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(sql.as_str())
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        row.map(User::try_from).transpose()
    }

    pub(super) async fn find_user_by_email_impl(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<User>> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            WHERE u.email = $1
            GROUP BY u.id
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(sql.as_str())
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to find user by email: {error}"))
            })?;

        row.map(User::try_from).transpose()
    }

    pub(super) async fn create_user_impl(&self, user: User) -> AppResult<User> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start user transaction: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, status, credential, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email().as_str())
        .bind(user.name().as_str())
        .bind(user.status().as_str())
        .bind(user.credential().map(|credential| credential.expose().to_owned()))
        .bind(version_to_db(user.version())?)
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "an account for '{}' already exists",
                    user.email()
                ));
            }

            AppError::Internal(format!("failed to insert user '{}': {error}", user.id()))
        })?;

        ensure_roles_exist(&mut transaction, &user).await?;
        replace_user_roles(&mut transaction, user.id(), user.roles()).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit user '{}': {error}", user.id()))
        })?;

        Ok(user)
    }
}

async fn ensure_roles_exist(connection: &mut PgConnection, user: &User) -> AppResult<()> {
    let role_ids: Vec<Uuid> = user
        .roles()
        .as_slice()
        .iter()
        .map(|role_id| role_id.as_uuid())
        .collect();

    let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM roles WHERE id = ANY($1)")
        .bind(&role_ids)
        .fetch_all(&mut *connection)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check user roles: {error}")))?;

    match role_ids.iter().find(|role_id| !found.contains(role_id)) {
        Some(missing) => Err(AppError::NotFound(format!("role '{missing}' does not exist"))),
        None => Ok(()),
    }
}
