//! Member discount rule operations

use shared::models::{DiscountRule, DiscountRuleCreate, DiscountRuleUpdate};
use sqlx::PgPool;

use super::{BoxError, customer_types_to_db, parse_customer_types};

const COLUMNS: &str = "id, name, customer_types, discount_percent, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct DiscountRuleRow {
    id: i64,
    name: String,
    customer_types: Vec<String>,
    discount_percent: f64,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<DiscountRuleRow> for DiscountRule {
    type Error = BoxError;

    fn try_from(row: DiscountRuleRow) -> Result<Self, Self::Error> {
        Ok(DiscountRule {
            id: row.id,
            name: row.name,
            customer_types: parse_customer_types(&row.customer_types)?,
            discount_percent: row.discount_percent,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all(rows: Vec<DiscountRuleRow>) -> Result<Vec<DiscountRule>, BoxError> {
    rows.into_iter().map(DiscountRule::try_from).collect()
}

/// All rules, oldest first (rule precedence order)
pub async fn list(pool: &PgPool) -> Result<Vec<DiscountRule>, BoxError> {
    let rows: Vec<DiscountRuleRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM discount_rules ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;
    convert_all(rows)
}

pub async fn list_active(pool: &PgPool) -> Result<Vec<DiscountRule>, BoxError> {
    let rows: Vec<DiscountRuleRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM discount_rules WHERE is_active = TRUE ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;
    convert_all(rows)
}

pub async fn create(pool: &PgPool, data: &DiscountRuleCreate) -> Result<DiscountRule, BoxError> {
    let now = shared::util::now_millis();
    let row: DiscountRuleRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO discount_rules (id, name, customer_types, discount_percent, is_active,
                                    created_at, updated_at)
        VALUES ($1, $2, $3, $4, TRUE, $5, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(super::snowflake_id())
    .bind(data.name.trim())
    .bind(customer_types_to_db(&data.customer_types))
    .bind(data.discount_percent)
    .bind(now)
    .fetch_one(pool)
    .await?;
    row.try_into()
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &DiscountRuleUpdate,
) -> Result<Option<DiscountRule>, BoxError> {
    let row: Option<DiscountRuleRow> = sqlx::query_as(&format!(
        r#"
        UPDATE discount_rules SET
            name = COALESCE($1, name),
            customer_types = COALESCE($2, customer_types),
            discount_percent = COALESCE($3, discount_percent),
            is_active = COALESCE($4, is_active),
            updated_at = $5
        WHERE id = $6
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&data.name)
    .bind(data.customer_types.as_deref().map(customer_types_to_db))
    .bind(data.discount_percent)
    .bind(data.is_active)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(DiscountRule::try_from).transpose()
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM discount_rules WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
