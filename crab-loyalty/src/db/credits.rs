//! Customer credit (voucher) operations

use shared::models::{
    CreditBatch, CreditSource, CreditStats, CreditUsage, CreditWithCustomer, CustomerCredit,
    CustomerType,
};
use sqlx::PgPool;

use super::{BoxError, parse_enum};
use crate::marketing::eligibility::credit_status;

const COLUMNS: &str = "cc.id, cc.customer_id, cc.amount, cc.min_order_amount, cc.source, \
    cc.batch_id, cc.description, cc.is_active, cc.is_used, cc.used_at, cc.expires_at, cc.created_at";

#[derive(Debug, sqlx::FromRow)]
struct CreditRow {
    id: i64,
    customer_id: i64,
    amount: f64,
    min_order_amount: f64,
    source: String,
    batch_id: String,
    description: Option<String>,
    is_active: bool,
    is_used: bool,
    used_at: Option<i64>,
    expires_at: Option<i64>,
    created_at: i64,
}

impl TryFrom<CreditRow> for CustomerCredit {
    type Error = BoxError;

    fn try_from(row: CreditRow) -> Result<Self, Self::Error> {
        Ok(CustomerCredit {
            id: row.id,
            customer_id: row.customer_id,
            amount: row.amount,
            min_order_amount: row.min_order_amount,
            source: parse_enum(&row.source, CreditSource::parse, "source")?,
            batch_id: row.batch_id,
            description: row.description,
            is_active: row.is_active,
            is_used: row.is_used,
            used_at: row.used_at,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CreditWithCustomerRow {
    #[sqlx(flatten)]
    credit: CreditRow,
    customer_name: String,
    customer_type: String,
}

impl CreditWithCustomerRow {
    fn into_model(self, now: i64) -> Result<CreditWithCustomer, BoxError> {
        let credit = CustomerCredit::try_from(self.credit)?;
        Ok(CreditWithCustomer {
            status: credit_status(&credit, now),
            customer_name: self.customer_name,
            customer_type: parse_enum(&self.customer_type, CustomerType::parse, "customer_type")?,
            credit,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CreditUsageRow {
    id: i64,
    credit_id: i64,
    customer_id: i64,
    order_id: Option<i64>,
    order_total: f64,
    amount_applied: f64,
    used_at: i64,
}

impl From<CreditUsageRow> for CreditUsage {
    fn from(row: CreditUsageRow) -> Self {
        CreditUsage {
            id: row.id,
            credit_id: row.credit_id,
            customer_id: row.customer_id,
            order_id: row.order_id,
            order_total: row.order_total,
            amount_applied: row.amount_applied,
            used_at: row.used_at,
        }
    }
}

/// List filter
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditQuery {
    pub customer_id: Option<i64>,
    pub batch_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list(pool: &PgPool, query: &CreditQuery) -> Result<Vec<CreditWithCustomer>, BoxError> {
    let now = shared::util::now_millis();
    let rows: Vec<CreditWithCustomerRow> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS}, c.name AS customer_name, c.customer_type
        FROM customer_credits cc
        JOIN customers c ON c.id = cc.customer_id
        WHERE ($1::BIGINT IS NULL OR cc.customer_id = $1)
          AND ($2::TEXT IS NULL OR cc.batch_id = $2)
        ORDER BY cc.created_at DESC, cc.id DESC
        LIMIT $3 OFFSET $4
        "#
    ))
    .bind(query.customer_id)
    .bind(&query.batch_id)
    .bind(query.limit.unwrap_or(200).clamp(1, 1000))
    .bind(query.offset.unwrap_or(0).max(0))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(|r| r.into_model(now)).collect()
}

pub async fn list_for_customer(
    pool: &PgPool,
    customer_id: i64,
) -> Result<Vec<CreditWithCustomer>, BoxError> {
    list(
        pool,
        &CreditQuery {
            customer_id: Some(customer_id),
            limit: Some(1000),
            ..Default::default()
        },
    )
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<CustomerCredit>, BoxError> {
    let row: Option<CreditRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM customer_credits cc WHERE cc.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    row.map(CustomerCredit::try_from).transpose()
}

/// Shared fields of one issuance
#[derive(Debug, Clone)]
pub struct NewCreditBatch<'a> {
    pub batch_id: &'a str,
    pub amount: f64,
    pub min_order_amount: f64,
    pub source: CreditSource,
    pub description: Option<&'a str>,
    pub expires_at: Option<i64>,
}

/// One credit per customer in a single statement. Returns the inserted count.
pub async fn insert_batch(
    pool: &PgPool,
    batch: &NewCreditBatch<'_>,
    customer_ids: &[i64],
) -> Result<u64, BoxError> {
    if customer_ids.is_empty() {
        return Ok(0);
    }
    let ids: Vec<i64> = customer_ids.iter().map(|_| super::snowflake_id()).collect();
    let result = sqlx::query(
        r#"
        INSERT INTO customer_credits (id, customer_id, amount, min_order_amount, source, batch_id,
                                      description, is_active, is_used, expires_at, created_at)
        SELECT u.id, u.customer_id, $3, $4, $5, $6, $7, TRUE, FALSE, $8, $9
        FROM UNNEST($1::BIGINT[], $2::BIGINT[]) AS u(id, customer_id)
        "#,
    )
    .bind(&ids)
    .bind(customer_ids)
    .bind(batch.amount)
    .bind(batch.min_order_amount)
    .bind(batch.source.as_str())
    .bind(batch.batch_id)
    .bind(batch.description)
    .bind(batch.expires_at)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Mark a credit used and record the usage, atomically.
///
/// The update only matches an unused, active, unexpired credit whose minimum
/// is met, so of two concurrent calls at most one gets a row back. `None`
/// means the credit was not eligible at the time of the update.
pub async fn use_credit(
    pool: &PgPool,
    id: i64,
    order_total: f64,
    amount_applied: f64,
    order_id: Option<i64>,
    now: i64,
) -> Result<Option<(CustomerCredit, CreditUsage)>, BoxError> {
    let mut tx = pool.begin().await?;

    let row: Option<CreditRow> = sqlx::query_as(&format!(
        r#"
        UPDATE customer_credits cc SET is_used = TRUE, used_at = $2
        WHERE cc.id = $1
          AND cc.is_used = FALSE
          AND cc.is_active = TRUE
          AND (cc.expires_at IS NULL OR cc.expires_at > $2)
          AND cc.min_order_amount <= $3
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(now)
    .bind(order_total)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let credit = CustomerCredit::try_from(row)?;

    let usage: CreditUsageRow = sqlx::query_as(
        r#"
        INSERT INTO credit_usages (id, credit_id, customer_id, order_id, order_total,
                                   amount_applied, used_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, credit_id, customer_id, order_id, order_total, amount_applied, used_at
        "#,
    )
    .bind(super::snowflake_id())
    .bind(credit.id)
    .bind(credit.customer_id)
    .bind(order_id)
    .bind(order_total)
    .bind(amount_applied)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some((credit, usage.into())))
}

/// Deactivate an unused credit. `None` when the id is missing or the credit is used.
pub async fn revoke(pool: &PgPool, id: i64) -> Result<Option<CustomerCredit>, BoxError> {
    let row: Option<CreditRow> = sqlx::query_as(&format!(
        r#"
        UPDATE customer_credits cc SET is_active = FALSE
        WHERE cc.id = $1 AND cc.is_used = FALSE
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(CustomerCredit::try_from).transpose()
}

/// Deactivate every unused, active credit of a batch. Returns the revoked count.
pub async fn revoke_batch(pool: &PgPool, batch_id: &str) -> Result<u64, BoxError> {
    let result = sqlx::query(
        "UPDATE customer_credits SET is_active = FALSE \
         WHERE batch_id = $1 AND is_used = FALSE AND is_active = TRUE",
    )
    .bind(batch_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn stats(pool: &PgPool, now: i64) -> Result<CreditStats, BoxError> {
    let row: (i64, f64, i64, f64, i64, f64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(amount), 0)::DOUBLE PRECISION,
            COUNT(*) FILTER (WHERE NOT is_used AND is_active
                             AND (expires_at IS NULL OR expires_at > $1)),
            COALESCE(SUM(amount) FILTER (WHERE NOT is_used AND is_active
                             AND (expires_at IS NULL OR expires_at > $1)), 0)::DOUBLE PRECISION,
            COUNT(*) FILTER (WHERE is_used),
            COALESCE(SUM(amount) FILTER (WHERE is_used), 0)::DOUBLE PRECISION,
            COUNT(*) FILTER (WHERE NOT is_used AND is_active AND expires_at <= $1),
            COUNT(*) FILTER (WHERE NOT is_used AND NOT is_active)
        FROM customer_credits
        "#,
    )
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(CreditStats {
        total_count: row.0,
        total_amount: row.1,
        available_count: row.2,
        available_amount: row.3,
        used_count: row.4,
        used_amount: row.5,
        expired_count: row.6,
        revoked_count: row.7,
    })
}

#[derive(Debug, sqlx::FromRow)]
struct CreditBatchRow {
    batch_id: String,
    source: String,
    description: Option<String>,
    amount: f64,
    min_order_amount: f64,
    credit_count: i64,
    used_count: i64,
    revoked_count: i64,
    expires_at: Option<i64>,
    created_at: i64,
}

pub async fn batches(pool: &PgPool) -> Result<Vec<CreditBatch>, BoxError> {
    let rows: Vec<CreditBatchRow> = sqlx::query_as(
        r#"
        SELECT batch_id,
               MIN(source) AS source,
               MIN(description) AS description,
               MIN(amount) AS amount,
               MIN(min_order_amount) AS min_order_amount,
               COUNT(*) AS credit_count,
               COUNT(*) FILTER (WHERE is_used) AS used_count,
               COUNT(*) FILTER (WHERE NOT is_used AND NOT is_active) AS revoked_count,
               MIN(expires_at) AS expires_at,
               MIN(created_at) AS created_at
        FROM customer_credits
        GROUP BY batch_id
        ORDER BY MIN(created_at) DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    rows.into_iter()
        .map(|row| {
            Ok(CreditBatch {
                source: parse_enum(&row.source, CreditSource::parse, "source")?,
                batch_id: row.batch_id,
                description: row.description,
                amount: row.amount,
                min_order_amount: row.min_order_amount,
                credit_count: row.credit_count,
                used_count: row.used_count,
                revoked_count: row.revoked_count,
                expires_at: row.expires_at,
                created_at: row.created_at,
            })
        })
        .collect()
}
