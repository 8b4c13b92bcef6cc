//! Sync audit log (append-only)

use shared::models::{SyncEntity, SyncLog, SyncLogStatus};
use sqlx::PgPool;

use super::{BoxError, parse_enum};

#[derive(Debug, sqlx::FromRow)]
struct SyncLogRow {
    id: i64,
    entity: String,
    action: String,
    status: String,
    error_message: Option<String>,
    record_count: i64,
    created_at: i64,
}

impl TryFrom<SyncLogRow> for SyncLog {
    type Error = BoxError;

    fn try_from(row: SyncLogRow) -> Result<Self, Self::Error> {
        Ok(SyncLog {
            id: row.id,
            entity: parse_enum(&row.entity, SyncEntity::parse, "entity")?,
            action: row.action,
            status: parse_enum(&row.status, SyncLogStatus::parse, "status")?,
            error_message: row.error_message,
            record_count: row.record_count,
            created_at: row.created_at,
        })
    }
}

pub async fn insert(
    pool: &PgPool,
    entity: SyncEntity,
    action: &str,
    status: SyncLogStatus,
    error_message: Option<&str>,
    record_count: i64,
) -> Result<(), BoxError> {
    sqlx::query(
        r#"
        INSERT INTO sync_logs (id, entity, action, status, error_message, record_count, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(super::snowflake_id())
    .bind(entity.as_str())
    .bind(action)
    .bind(status.as_str())
    .bind(error_message)
    .bind(record_count)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list(pool: &PgPool, limit: i64) -> Result<Vec<SyncLog>, BoxError> {
    let rows: Vec<SyncLogRow> = sqlx::query_as(
        r#"
        SELECT id, entity, action, status, error_message, record_count, created_at
        FROM sync_logs
        ORDER BY created_at DESC, id DESC
        LIMIT $1
        "#,
    )
    .bind(limit.clamp(1, 500))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(SyncLog::try_from).collect()
}

/// Time of the last batch that did not fail
pub async fn last_sync_at(pool: &PgPool) -> Result<Option<i64>, BoxError> {
    let (at,): (Option<i64>,) =
        sqlx::query_as("SELECT MAX(created_at) FROM sync_logs WHERE status <> 'FAILED'")
            .fetch_one(pool)
            .await?;
    Ok(at)
}
