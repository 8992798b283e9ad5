//! PostgreSQL-backed approval request repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use rolegate_application::{PendingRequestQuery, RequestRepository};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{AccessRequest, EmailAddress, RequestId, RequestPayload};

/// PostgreSQL implementation of the request repository port.
#[derive(Clone)]
pub struct PostgresRequestRepository {
    pool: PgPool,
}

impl PostgresRequestRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RequestRow {
    id: Uuid,
    status: String,
    payload: Json<RequestPayload>,
    submitted_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
    decision_reason: Option<String>,
}

impl TryFrom<RequestRow> for AccessRequest {
    type Error = AppError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(Self::restore(
            RequestId::from_uuid(row.id),
            row.payload.0,
            row.status.parse()?,
            row.submitted_at,
            row.decided_at,
            row.decision_reason,
        ))
    }
}

const REQUEST_COLUMNS: &str = "id, status, payload, submitted_at, decided_at, decision_reason";

/// Escapes `LIKE` wildcards so filters match literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl RequestRepository for PostgresRequestRepository {
    async fn create_request(&self, request: AccessRequest) -> AppResult<AccessRequest> {
        sqlx::query(
            r#"
            INSERT INTO access_requests (
                id,
                kind,
                status,
                subject_email,
                requested_role,
                payload,
                submitted_at,
                decided_at,
                decision_reason
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(request.kind().as_str())
        .bind(request.status().as_str())
        .bind(request.payload().subject_email().as_str())
        .bind(request.payload().requested_role().map(|role| role.as_str()))
        .bind(Json(request.payload()))
        .bind(request.submitted_at())
        .bind(request.decided_at())
        .bind(request.decision_reason())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "a signup request for '{}' is already pending",
                    request.payload().subject_email()
                ));
            }

            AppError::Internal(format!("failed to insert request '{}': {error}", request.id()))
        })?;

        Ok(request)
    }

    async fn find_request(&self, request_id: RequestId) -> AppResult<Option<AccessRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM access_requests WHERE id = $1");
        let row = sqlx::query_as::<_, RequestRow>(sql.as_str())
            .bind(request_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to find request '{request_id}': {error}"))
            })?;

        row.map(AccessRequest::try_from).transpose()
    }

    async fn list_pending_requests(
        &self,
        query: &PendingRequestQuery,
    ) -> AppResult<Vec<AccessRequest>> {
        let sql = format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM access_requests
            WHERE status = 'pending'
                AND ($1::TEXT IS NULL OR kind = $1)
                AND ($2::TEXT IS NULL OR subject_email ILIKE $2)
                AND ($3::TEXT IS NULL OR requested_role ILIKE $3)
            ORDER BY submitted_at ASC, id
            "#
        );

        let rows = sqlx::query_as::<_, RequestRow>(sql.as_str())
            .bind(query.kind.map(|kind| kind.as_str()))
            .bind(query.email_contains.as_deref().map(like_pattern))
            .bind(query.requested_role_contains.as_deref().map(like_pattern))
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list pending requests: {error}"))
            })?;

        rows.into_iter().map(AccessRequest::try_from).collect()
    }

    async fn has_pending_signup(&self, email: &EmailAddress) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM access_requests
                WHERE kind = 'signup' AND status = 'pending' AND subject_email = $1
            )
            "#,
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check pending signup: {error}")))
    }

    async fn save_decision(&self, request: &AccessRequest) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE access_requests
            SET status = $2, decided_at = $3, decision_reason = $4
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(request.status().as_str())
        .bind(request.decided_at())
        .bind(request.decision_reason())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to store decision for request '{}': {error}",
                request.id()
            ))
        })?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        match self.find_request(request.id()).await? {
            Some(stored) => stored.ensure_pending(),
            None => Err(AppError::NotFound(format!(
                "request '{}' does not exist",
                request.id()
            ))),
        }
    }
}
