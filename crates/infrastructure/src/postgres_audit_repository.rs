use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use rolegate_application::{AuditEvent, AuditRepository};
use rolegate_core::{AppError, AppResult};

/// Resource kinds that audit events may point at.
const AUDITED_RESOURCES: [&str; 3] = ["role", "user", "access_request"];

/// Appends rolegate audit events to `audit_events`.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Drops blank details so listings show `null` instead of an empty string.
fn stored_detail(detail: Option<String>) -> Option<String> {
    detail.filter(|detail| !detail.trim().is_empty())
}

fn ensure_audited_resource(event: &AuditEvent) -> AppResult<()> {
    if AUDITED_RESOURCES.contains(&event.resource_type.as_str()) {
        return Ok(());
    }

    Err(AppError::Internal(format!(
        "audit event '{}' targets unknown resource type '{}'",
        event.action.as_str(),
        event.resource_type
    )))
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        ensure_audited_resource(&event)?;

        let event_id = Uuid::new_v4();
        let action = event.action.as_str();
        sqlx::query(
            r#"
            INSERT INTO audit_events (id, subject, action, resource_type, resource_id, detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event_id)
        .bind(event.subject.as_str())
        .bind(action)
        .bind(event.resource_type.as_str())
        .bind(event.resource_id.as_str())
        .bind(stored_detail(event.detail))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to record '{action}' for {} '{}': {error}",
                event.resource_type, event.resource_id
            ))
        })?;

        debug!(
            %event_id,
            action,
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            "audit event recorded"
        );
        Ok(())
    }
}
