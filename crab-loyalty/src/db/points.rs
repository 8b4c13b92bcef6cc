//! Points rules and the points ledger

use shared::models::{
    PointsRule, PointsRuleCreate, PointsRuleUpdate, PointsTransaction, PointsTransactionType,
};
use sqlx::PgPool;

use super::{BoxError, customer_types_to_db, parse_customer_types, parse_enum};

const RULE_COLUMNS: &str = "id, name, customer_types, earn_rate, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct PointsRuleRow {
    id: i64,
    name: String,
    customer_types: Vec<String>,
    earn_rate: f64,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PointsRuleRow> for PointsRule {
    type Error = BoxError;

    fn try_from(row: PointsRuleRow) -> Result<Self, Self::Error> {
        Ok(PointsRule {
            id: row.id,
            name: row.name,
            customer_types: parse_customer_types(&row.customer_types)?,
            earn_rate: row.earn_rate,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PointsTransactionRow {
    id: i64,
    customer_id: i64,
    amount: i64,
    transaction_type: String,
    description: Option<String>,
    order_id: Option<i64>,
    created_at: i64,
}

impl TryFrom<PointsTransactionRow> for PointsTransaction {
    type Error = BoxError;

    fn try_from(row: PointsTransactionRow) -> Result<Self, Self::Error> {
        Ok(PointsTransaction {
            id: row.id,
            customer_id: row.customer_id,
            amount: row.amount,
            transaction_type: parse_enum(
                &row.transaction_type,
                PointsTransactionType::parse,
                "transaction_type",
            )?,
            description: row.description,
            order_id: row.order_id,
            created_at: row.created_at,
        })
    }
}

// ── Rules ──

pub async fn list_rules(pool: &PgPool) -> Result<Vec<PointsRule>, BoxError> {
    let rows: Vec<PointsRuleRow> = sqlx::query_as(&format!(
        "SELECT {RULE_COLUMNS} FROM points_rules ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(PointsRule::try_from).collect()
}

pub async fn list_active_rules(pool: &PgPool) -> Result<Vec<PointsRule>, BoxError> {
    let rows: Vec<PointsRuleRow> = sqlx::query_as(&format!(
        "SELECT {RULE_COLUMNS} FROM points_rules WHERE is_active = TRUE ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(PointsRule::try_from).collect()
}

pub async fn create_rule(pool: &PgPool, data: &PointsRuleCreate) -> Result<PointsRule, BoxError> {
    let now = shared::util::now_millis();
    let row: PointsRuleRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO points_rules (id, name, customer_types, earn_rate, is_active,
                                  created_at, updated_at)
        VALUES ($1, $2, $3, $4, TRUE, $5, $5)
        RETURNING {RULE_COLUMNS}
        "#
    ))
    .bind(super::snowflake_id())
    .bind(data.name.trim())
    .bind(customer_types_to_db(&data.customer_types))
    .bind(data.earn_rate)
    .bind(now)
    .fetch_one(pool)
    .await?;
    row.try_into()
}

pub async fn update_rule(
    pool: &PgPool,
    id: i64,
    data: &PointsRuleUpdate,
) -> Result<Option<PointsRule>, BoxError> {
    let row: Option<PointsRuleRow> = sqlx::query_as(&format!(
        r#"
        UPDATE points_rules SET
            name = COALESCE($1, name),
            customer_types = COALESCE($2, customer_types),
            earn_rate = COALESCE($3, earn_rate),
            is_active = COALESCE($4, is_active),
            updated_at = $5
        WHERE id = $6
        RETURNING {RULE_COLUMNS}
        "#
    ))
    .bind(&data.name)
    .bind(data.customer_types.as_deref().map(customer_types_to_db))
    .bind(data.earn_rate)
    .bind(data.is_active)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(PointsRule::try_from).transpose()
}

pub async fn delete_rule(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM points_rules WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Ledger ──

/// Append a ledger row and move the customer's balance by the same amount.
///
/// `amount` is signed. A REDEEM that would drop the balance below zero
/// affects no customer row and returns `None`.
pub async fn apply_transaction(
    pool: &PgPool,
    customer_id: i64,
    amount: i64,
    transaction_type: PointsTransactionType,
    description: Option<&str>,
    order_id: Option<i64>,
) -> Result<Option<PointsTransaction>, BoxError> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE customers SET points = points + $1, updated_at = $2 \
         WHERE id = $3 AND points + $1 >= 0",
    )
    .bind(amount)
    .bind(now)
    .bind(customer_id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Ok(None);
    }

    let row: PointsTransactionRow = sqlx::query_as(
        r#"
        INSERT INTO points_transactions (id, customer_id, amount, transaction_type,
                                         description, order_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, customer_id, amount, transaction_type, description, order_id, created_at
        "#,
    )
    .bind(super::snowflake_id())
    .bind(customer_id)
    .bind(amount)
    .bind(transaction_type.as_str())
    .bind(description)
    .bind(order_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    row.try_into().map(Some)
}

pub async fn ledger(pool: &PgPool, customer_id: i64) -> Result<Vec<PointsTransaction>, BoxError> {
    let rows: Vec<PointsTransactionRow> = sqlx::query_as(
        r#"
        SELECT id, customer_id, amount, transaction_type, description, order_id, created_at
        FROM points_transactions
        WHERE customer_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(PointsTransaction::try_from).collect()
}
