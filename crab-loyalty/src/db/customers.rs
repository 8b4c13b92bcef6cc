//! Customer database operations

use shared::models::{Customer, CustomerCreate, CustomerType, CustomerUpdate};
use sqlx::PgPool;

use super::{BoxError, parse_enum};

const COLUMNS: &str = "id, name, phone, email, company, customer_type, points, \
    custom_discount_code, custom_discount_rate, quickbooks_id, notes, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    company: Option<String>,
    customer_type: String,
    points: i64,
    custom_discount_code: Option<String>,
    custom_discount_rate: Option<f64>,
    quickbooks_id: Option<String>,
    notes: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = BoxError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        Ok(Customer {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            company: row.company,
            customer_type: parse_enum(&row.customer_type, CustomerType::parse, "customer_type")?,
            points: row.points,
            custom_discount_code: row.custom_discount_code,
            custom_discount_rate: row.custom_discount_rate,
            quickbooks_id: row.quickbooks_id,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all(rows: Vec<CustomerRow>) -> Result<Vec<Customer>, BoxError> {
    rows.into_iter().map(Customer::try_from).collect()
}

async fn find_one(pool: &PgPool, filter: &str, value: &str) -> Result<Option<Customer>, BoxError> {
    let row: Option<CustomerRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM customers WHERE {filter} LIMIT 1"))
            .bind(value)
            .fetch_optional(pool)
            .await?;
    row.map(Customer::try_from).transpose()
}

/// List filter
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerQuery {
    pub search: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list(pool: &PgPool, query: &CustomerQuery) -> Result<Vec<Customer>, BoxError> {
    let pattern = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));
    let rows: Vec<CustomerRow> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS} FROM customers
        WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR phone ILIKE $1 OR email ILIKE $1)
          AND ($2::TEXT IS NULL OR customer_type = $2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3 OFFSET $4
        "#
    ))
    .bind(pattern)
    .bind(query.customer_type.map(|t| t.as_str()))
    .bind(query.limit.unwrap_or(100).clamp(1, 1000))
    .bind(query.offset.unwrap_or(0).max(0))
    .fetch_all(pool)
    .await?;
    convert_all(rows)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Customer>, BoxError> {
    let row: Option<CustomerRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM customers WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    row.map(Customer::try_from).transpose()
}

pub async fn find_by_quickbooks_id(
    pool: &PgPool,
    quickbooks_id: &str,
) -> Result<Option<Customer>, BoxError> {
    find_one(pool, "quickbooks_id = $1", quickbooks_id).await
}

pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Customer>, BoxError> {
    find_one(pool, "phone = $1", phone).await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Customer>, BoxError> {
    find_one(pool, "LOWER(email) = LOWER($1)", email).await
}

/// Discount-helper lookup: exact phone/email/custom code first, then name prefix
pub async fn lookup(pool: &PgPool, q: &str) -> Result<Option<Customer>, BoxError> {
    let row: Option<CustomerRow> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS} FROM customers
        WHERE phone = $1
           OR LOWER(email) = LOWER($1)
           OR UPPER(custom_discount_code) = UPPER($1)
           OR name ILIKE $2 ESCAPE '\'
        ORDER BY COALESCE(phone = $1 OR LOWER(email) = LOWER($1)
                          OR UPPER(custom_discount_code) = UPPER($1), FALSE) DESC,
                 name
        LIMIT 1
        "#
    ))
    .bind(q)
    .bind(super::like_prefix(q))
    .fetch_optional(pool)
    .await?;
    row.map(Customer::try_from).transpose()
}

pub async fn create(
    pool: &PgPool,
    data: &CustomerCreate,
    quickbooks_id: Option<&str>,
) -> Result<Customer, BoxError> {
    let now = shared::util::now_millis();
    let id = super::snowflake_id();
    let customer_type = data.customer_type.unwrap_or(CustomerType::Regular);
    let row: CustomerRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO customers (id, name, phone, email, company, customer_type, points,
                               custom_discount_code, custom_discount_rate, quickbooks_id, notes,
                               created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8, $9, $10, $11, $11)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.company)
    .bind(customer_type.as_str())
    .bind(&data.custom_discount_code)
    .bind(data.custom_discount_rate)
    .bind(quickbooks_id)
    .bind(&data.notes)
    .bind(now)
    .fetch_one(pool)
    .await?;
    row.try_into()
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &CustomerUpdate,
) -> Result<Option<Customer>, BoxError> {
    let now = shared::util::now_millis();
    let row: Option<CustomerRow> = sqlx::query_as(&format!(
        r#"
        UPDATE customers SET
            name = COALESCE($1, name),
            phone = COALESCE($2, phone),
            email = COALESCE($3, email),
            company = COALESCE($4, company),
            customer_type = COALESCE($5, customer_type),
            custom_discount_code = COALESCE($6, custom_discount_code),
            custom_discount_rate = COALESCE($7, custom_discount_rate),
            notes = COALESCE($8, notes),
            updated_at = $9
        WHERE id = $10
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&data.name)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.company)
    .bind(data.customer_type.map(|t| t.as_str()))
    .bind(&data.custom_discount_code)
    .bind(data.custom_discount_rate)
    .bind(&data.notes)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(Customer::try_from).transpose()
}

/// Backfill the QuickBooks id on a matched customer (never overwrites)
/// Backfill the QuickBooks id of an unlinked customer; `None` when the
/// row was already linked
pub async fn link_quickbooks_id(
    pool: &PgPool,
    id: i64,
    quickbooks_id: &str,
) -> Result<Option<Customer>, BoxError> {
    let row: Option<CustomerRow> = sqlx::query_as(&format!(
        r#"
        UPDATE customers SET quickbooks_id = $1, updated_at = $2
        WHERE id = $3 AND quickbooks_id IS NULL
        RETURNING {COLUMNS}
        "#
    ))
    .bind(quickbooks_id)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(Customer::try_from).transpose()
}

/// Ids of all customers whose type is in the set
pub async fn ids_by_types(pool: &PgPool, types: &[CustomerType]) -> Result<Vec<i64>, BoxError> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT id FROM customers WHERE customer_type = ANY($1) ORDER BY id",
    )
    .bind(super::customer_types_to_db(types))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// The subset of `ids` that exist
pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, BoxError> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT id FROM customers WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn count_linked(pool: &PgPool) -> Result<i64, BoxError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM customers WHERE quickbooks_id IS NOT NULL")
            .fetch_one(pool)
            .await?;
    Ok(count)
}
