//! Discount code, assignment and usage operations

use shared::models::{
    CustomerType, DiscountCode, DiscountCodeAssignment, DiscountCodeCreate, DiscountCodeType,
    DiscountCodeUpdate,
};
use sqlx::PgPool;

use super::{BoxError, parse_enum};

const COLUMNS: &str = "id, code, code_type, discount_percent, description, owner_customer_id, \
    is_active, usage_count, unique_users, max_uses, expires_at, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct DiscountCodeRow {
    id: i64,
    code: String,
    code_type: String,
    discount_percent: f64,
    description: Option<String>,
    owner_customer_id: Option<i64>,
    is_active: bool,
    usage_count: i64,
    unique_users: i64,
    max_uses: Option<i64>,
    expires_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<DiscountCodeRow> for DiscountCode {
    type Error = BoxError;

    fn try_from(row: DiscountCodeRow) -> Result<Self, Self::Error> {
        Ok(DiscountCode {
            id: row.id,
            code: row.code,
            code_type: parse_enum(&row.code_type, DiscountCodeType::parse, "code_type")?,
            discount_percent: row.discount_percent,
            description: row.description,
            owner_customer_id: row.owner_customer_id,
            is_active: row.is_active,
            usage_count: row.usage_count,
            unique_users: row.unique_users,
            max_uses: row.max_uses,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all(rows: Vec<DiscountCodeRow>) -> Result<Vec<DiscountCode>, BoxError> {
    rows.into_iter().map(DiscountCode::try_from).collect()
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    discount_code_id: i64,
    customer_id: i64,
    customer_name: String,
    customer_type: String,
    assigned_at: i64,
}

impl TryFrom<AssignmentRow> for DiscountCodeAssignment {
    type Error = BoxError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(DiscountCodeAssignment {
            discount_code_id: row.discount_code_id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            customer_type: parse_enum(&row.customer_type, CustomerType::parse, "customer_type")?,
            assigned_at: row.assigned_at,
        })
    }
}

pub async fn list(pool: &PgPool) -> Result<Vec<DiscountCode>, BoxError> {
    let rows: Vec<DiscountCodeRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM discount_codes ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    convert_all(rows)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<DiscountCode>, BoxError> {
    let row: Option<DiscountCodeRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM discount_codes WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    row.map(DiscountCode::try_from).transpose()
}

/// Case-insensitive lookup
pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<DiscountCode>, BoxError> {
    let row: Option<DiscountCodeRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM discount_codes WHERE code = UPPER($1)"
    ))
    .bind(code.trim())
    .fetch_optional(pool)
    .await?;
    row.map(DiscountCode::try_from).transpose()
}

/// Insert a code (stored upper-case). A duplicate surfaces as a unique violation.
pub async fn create(pool: &PgPool, data: &DiscountCodeCreate) -> Result<DiscountCode, BoxError> {
    let now = shared::util::now_millis();
    let row: DiscountCodeRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO discount_codes (id, code, code_type, discount_percent, description,
                                    owner_customer_id, is_active, usage_count, unique_users,
                                    max_uses, expires_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE, 0, 0, $7, $8, $9, $9)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(super::snowflake_id())
    .bind(data.code.trim().to_uppercase())
    .bind(data.code_type.as_str())
    .bind(data.discount_percent)
    .bind(&data.description)
    .bind(data.owner_customer_id)
    .bind(data.max_uses)
    .bind(data.expires_at)
    .bind(now)
    .fetch_one(pool)
    .await?;
    row.try_into()
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &DiscountCodeUpdate,
) -> Result<Option<DiscountCode>, BoxError> {
    let row: Option<DiscountCodeRow> = sqlx::query_as(&format!(
        r#"
        UPDATE discount_codes SET
            discount_percent = COALESCE($1, discount_percent),
            description = COALESCE($2, description),
            owner_customer_id = COALESCE($3, owner_customer_id),
            is_active = COALESCE($4, is_active),
            max_uses = COALESCE($5, max_uses),
            expires_at = COALESCE($6, expires_at),
            updated_at = $7
        WHERE id = $8
        RETURNING {COLUMNS}
        "#
    ))
    .bind(data.discount_percent)
    .bind(&data.description)
    .bind(data.owner_customer_id)
    .bind(data.is_active)
    .bind(data.max_uses)
    .bind(data.expires_at)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(DiscountCode::try_from).transpose()
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM discount_codes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Assignments ──

pub async fn is_assigned(pool: &PgPool, code_id: i64, customer_id: i64) -> Result<bool, BoxError> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM discount_code_assignments \
         WHERE discount_code_id = $1 AND customer_id = $2)",
    )
    .bind(code_id)
    .bind(customer_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Idempotent: returns false when the pair already existed
pub async fn assign(pool: &PgPool, code_id: i64, customer_id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query(
        r#"
        INSERT INTO discount_code_assignments (discount_code_id, customer_id, assigned_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (discount_code_id, customer_id) DO NOTHING
        "#,
    )
    .bind(code_id)
    .bind(customer_id)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_assignments(
    pool: &PgPool,
    code_id: i64,
) -> Result<Vec<DiscountCodeAssignment>, BoxError> {
    let rows: Vec<AssignmentRow> = sqlx::query_as(
        r#"
        SELECT a.discount_code_id, a.customer_id, c.name AS customer_name,
               c.customer_type, a.assigned_at
        FROM discount_code_assignments a
        JOIN customers c ON c.id = a.customer_id
        WHERE a.discount_code_id = $1
        ORDER BY a.assigned_at DESC, c.name
        "#,
    )
    .bind(code_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(DiscountCodeAssignment::try_from).collect()
}

pub async fn remove_assignment(
    pool: &PgPool,
    code_id: i64,
    customer_id: i64,
) -> Result<bool, BoxError> {
    let result = sqlx::query(
        "DELETE FROM discount_code_assignments WHERE discount_code_id = $1 AND customer_id = $2",
    )
    .bind(code_id)
    .bind(customer_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns the number of removed assignments
pub async fn clear_assignments(pool: &PgPool, code_id: i64) -> Result<u64, BoxError> {
    let result = sqlx::query("DELETE FROM discount_code_assignments WHERE discount_code_id = $1")
        .bind(code_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Active codes a customer may use: generic, owned or assigned
pub async fn codes_for_customer(
    pool: &PgPool,
    customer_id: i64,
    now: i64,
) -> Result<Vec<DiscountCode>, BoxError> {
    let rows: Vec<DiscountCodeRow> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS} FROM discount_codes d
        WHERE d.is_active = TRUE
          AND (d.expires_at IS NULL OR d.expires_at > $2)
          AND (d.max_uses IS NULL OR d.usage_count < d.max_uses)
          AND (d.code_type = 'GENERIC'
               OR d.owner_customer_id = $1
               OR EXISTS (SELECT 1 FROM discount_code_assignments a
                          WHERE a.discount_code_id = d.id AND a.customer_id = $1))
        ORDER BY d.discount_percent DESC, d.code
        "#
    ))
    .bind(customer_id)
    .bind(now)
    .fetch_all(pool)
    .await?;
    convert_all(rows)
}

// ── Usage ──

/// Append a usage row and bump `usage_count`; `unique_users` only grows on a
/// customer's first use of the code.
pub async fn record_usage(
    pool: &PgPool,
    code_id: i64,
    customer_id: i64,
    order_id: Option<i64>,
) -> Result<(), BoxError> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    // Row lock on the code serializes concurrent first uses
    sqlx::query("SELECT id FROM discount_codes WHERE id = $1 FOR UPDATE")
        .bind(code_id)
        .execute(&mut *tx)
        .await?;

    let (used_before,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM discount_code_usages \
         WHERE discount_code_id = $1 AND customer_id = $2)",
    )
    .bind(code_id)
    .bind(customer_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO discount_code_usages (id, discount_code_id, customer_id, order_id, used_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(super::snowflake_id())
    .bind(code_id)
    .bind(customer_id)
    .bind(order_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE discount_codes SET
            usage_count = usage_count + 1,
            unique_users = unique_users + CASE WHEN $1 THEN 0 ELSE 1 END,
            updated_at = $2
        WHERE id = $3
        "#,
    )
    .bind(used_before)
    .bind(now)
    .bind(code_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
