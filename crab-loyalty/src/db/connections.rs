//! QuickBooks connection (OAuth token) storage
//!
//! At most one row is active; reconnecting the same realm updates its row.

use sqlx::PgPool;

use super::BoxError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuickBooksConnection {
    pub id: i64,
    pub realm_id: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix millis
    pub token_expires_at: i64,
    pub refresh_token_expires_at: Option<i64>,
    pub company_name: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Token pair as persisted
#[derive(Debug, Clone)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_expires_at: i64,
    pub refresh_token_expires_at: Option<i64>,
}

const COLUMNS: &str = "id, realm_id, access_token, refresh_token, token_expires_at, \
    refresh_token_expires_at, company_name, is_active, created_at, updated_at";

pub async fn find_active(pool: &PgPool) -> Result<Option<QuickBooksConnection>, BoxError> {
    let row = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM quickbooks_connections WHERE is_active = TRUE \
         ORDER BY updated_at DESC LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Upsert by realm as the active connection and deactivate every other row
pub async fn upsert_active(
    pool: &PgPool,
    realm_id: &str,
    tokens: &StoredTokens,
    company_name: Option<&str>,
    now: i64,
) -> Result<QuickBooksConnection, BoxError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE quickbooks_connections SET is_active = FALSE, updated_at = $1 \
         WHERE realm_id <> $2 AND is_active = TRUE",
    )
    .bind(now)
    .bind(realm_id)
    .execute(&mut *tx)
    .await?;

    let conn: QuickBooksConnection = sqlx::query_as(&format!(
        r#"
        INSERT INTO quickbooks_connections (
            id, realm_id, access_token, refresh_token, token_expires_at,
            refresh_token_expires_at, company_name, is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $8)
        ON CONFLICT (realm_id)
        DO UPDATE SET access_token = EXCLUDED.access_token,
                      refresh_token = EXCLUDED.refresh_token,
                      token_expires_at = EXCLUDED.token_expires_at,
                      refresh_token_expires_at = EXCLUDED.refresh_token_expires_at,
                      company_name = COALESCE(EXCLUDED.company_name, quickbooks_connections.company_name),
                      is_active = TRUE,
                      updated_at = EXCLUDED.updated_at
        RETURNING {COLUMNS}
        "#
    ))
    .bind(super::snowflake_id())
    .bind(realm_id)
    .bind(&tokens.access_token)
    .bind(&tokens.refresh_token)
    .bind(tokens.token_expires_at)
    .bind(tokens.refresh_token_expires_at)
    .bind(company_name)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(conn)
}

/// Persist a refreshed token pair
pub async fn update_tokens(
    pool: &PgPool,
    id: i64,
    tokens: &StoredTokens,
    now: i64,
) -> Result<QuickBooksConnection, BoxError> {
    let conn = sqlx::query_as(&format!(
        r#"
        UPDATE quickbooks_connections
        SET access_token = $1, refresh_token = $2, token_expires_at = $3,
            refresh_token_expires_at = COALESCE($4, refresh_token_expires_at),
            updated_at = $5
        WHERE id = $6
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&tokens.access_token)
    .bind(&tokens.refresh_token)
    .bind(tokens.token_expires_at)
    .bind(tokens.refresh_token_expires_at)
    .bind(now)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(conn)
}

/// Soft-disable; connection rows are never deleted
pub async fn deactivate(pool: &PgPool, id: i64, now: i64) -> Result<(), BoxError> {
    sqlx::query("UPDATE quickbooks_connections SET is_active = FALSE, updated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
