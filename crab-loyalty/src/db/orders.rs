//! Order database operations
//!
//! Orders are keyed by `quickbooks_invoice_id`; re-syncing an invoice
//! updates the existing row instead of inserting a second one.

use shared::models::{Order, OrderItem, OrderStatus, OrderSyncStatus};
use sqlx::PgPool;

use super::{BoxError, parse_enum};
use crate::quickbooks::invoice::{ParsedInvoice, ParsedLineItem};

const COLUMNS: &str = "id, customer_id, quickbooks_invoice_id, order_number, total_amount, \
    final_amount, discount_percent, discount_code, status, sync_status, last_synced_at, \
    created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_id: i64,
    quickbooks_invoice_id: Option<String>,
    order_number: Option<String>,
    total_amount: f64,
    final_amount: f64,
    discount_percent: Option<f64>,
    discount_code: Option<String>,
    status: String,
    sync_status: String,
    last_synced_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = BoxError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            customer_id: row.customer_id,
            quickbooks_invoice_id: row.quickbooks_invoice_id,
            order_number: row.order_number,
            total_amount: row.total_amount,
            final_amount: row.final_amount,
            discount_percent: row.discount_percent,
            discount_code: row.discount_code,
            status: parse_enum(&row.status, OrderStatus::parse, "status")?,
            sync_status: parse_enum(&row.sync_status, OrderSyncStatus::parse, "sync_status")?,
            last_synced_at: row.last_synced_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    description: String,
    quantity: f64,
    unit_price: f64,
    amount: f64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price,
            amount: row.amount,
        }
    }
}

/// What an invoice upsert did
#[derive(Debug)]
pub enum InvoiceUpsert {
    Created(Order),
    Updated(Order),
}

impl InvoiceUpsert {
    pub fn order(&self) -> &Order {
        match self {
            Self::Created(order) | Self::Updated(order) => order,
        }
    }
}

pub async fn find_by_invoice_id(
    pool: &PgPool,
    invoice_id: &str,
) -> Result<Option<Order>, BoxError> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM orders WHERE quickbooks_invoice_id = $1"
    ))
    .bind(invoice_id)
    .fetch_optional(pool)
    .await?;
    row.map(Order::try_from).transpose()
}

pub async fn list_for_customer(pool: &PgPool, customer_id: i64) -> Result<Vec<Order>, BoxError> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Order::try_from).collect()
}

/// Insert the order with its line items, or update the existing row.
///
/// The update path touches status, amounts and sync markers only. Discount
/// fields and line items keep what the first import wrote.
pub async fn upsert_from_invoice(
    pool: &PgPool,
    customer_id: i64,
    invoice: &ParsedInvoice,
) -> Result<InvoiceUpsert, BoxError> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let inserted: Option<OrderRow> = sqlx::query_as(&format!(
        r#"
        INSERT INTO orders (id, customer_id, quickbooks_invoice_id, order_number, total_amount,
                            final_amount, discount_percent, discount_code, status, sync_status,
                            last_synced_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'SYNCED', $10, $10, $10)
        ON CONFLICT (quickbooks_invoice_id) DO NOTHING
        RETURNING {COLUMNS}
        "#
    ))
    .bind(super::snowflake_id())
    .bind(customer_id)
    .bind(&invoice.invoice_id)
    .bind(&invoice.doc_number)
    .bind(invoice.total_amount)
    .bind(invoice.final_amount)
    .bind(invoice.discount_percent)
    .bind(&invoice.discount_code)
    .bind(invoice.status.as_str())
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;

    let outcome = match inserted {
        Some(row) => {
            insert_items(&mut tx, row.id, &invoice.items).await?;
            InvoiceUpsert::Created(row.try_into()?)
        }
        None => {
            let row: OrderRow = sqlx::query_as(&format!(
                r#"
                UPDATE orders SET
                    total_amount = $1,
                    final_amount = $2,
                    status = $3,
                    sync_status = 'SYNCED',
                    last_synced_at = $4,
                    updated_at = $4
                WHERE quickbooks_invoice_id = $5
                RETURNING {COLUMNS}
                "#
            ))
            .bind(invoice.total_amount)
            .bind(invoice.final_amount)
            .bind(invoice.status.as_str())
            .bind(now)
            .bind(&invoice.invoice_id)
            .fetch_one(&mut *tx)
            .await?;
            InvoiceUpsert::Updated(row.try_into()?)
        }
    };

    tx.commit().await?;
    Ok(outcome)
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: i64,
    items: &[ParsedLineItem],
) -> Result<(), BoxError> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, description, quantity, unit_price, amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(super::snowflake_id())
        .bind(order_id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.amount)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Most recent PENDING order of a customer
pub async fn find_latest_pending(
    pool: &PgPool,
    customer_id: i64,
) -> Result<Option<Order>, BoxError> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS} FROM orders
        WHERE customer_id = $1 AND status = 'PENDING'
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#
    ))
    .bind(customer_id)
    .fetch_optional(pool)
    .await?;
    row.map(Order::try_from).transpose()
}

/// PENDING → COMPLETED. Returns the order only if this call made the transition.
pub async fn mark_completed(pool: &PgPool, id: i64) -> Result<Option<Order>, BoxError> {
    let now = shared::util::now_millis();
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        r#"
        UPDATE orders SET status = 'COMPLETED', updated_at = $1
        WHERE id = $2 AND status = 'PENDING'
        RETURNING {COLUMNS}
        "#
    ))
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(Order::try_from).transpose()
}

pub async fn list_items(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItem>, BoxError> {
    let rows: Vec<OrderItemRow> = sqlx::query_as(
        "SELECT id, order_id, description, quantity, unit_price, amount \
         FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(OrderItem::from).collect())
}

pub async fn count_synced(pool: &PgPool) -> Result<i64, BoxError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE quickbooks_invoice_id IS NOT NULL")
            .fetch_one(pool)
            .await?;
    Ok(count)
}
