//! Contact list operations

use shared::models::{
    Contact, ContactInput, ContactList, ContactListCreate, ContactListKind, CustomerType,
};
use sqlx::PgPool;

use super::{BoxError, customer_types_to_db, parse_customer_types, parse_enum};

const COLUMNS: &str = "l.id, l.name, l.description, l.kind, l.filter_customer_types, \
    (SELECT COUNT(*) FROM contacts c WHERE c.list_id = l.id) AS contact_count, \
    l.last_synced_at, l.created_at, l.updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ContactListRow {
    id: i64,
    name: String,
    description: Option<String>,
    kind: String,
    filter_customer_types: Vec<String>,
    contact_count: i64,
    last_synced_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ContactListRow> for ContactList {
    type Error = BoxError;

    fn try_from(row: ContactListRow) -> Result<Self, Self::Error> {
        Ok(ContactList {
            id: row.id,
            name: row.name,
            description: row.description,
            kind: parse_enum(&row.kind, ContactListKind::parse, "kind")?,
            filter_customer_types: parse_customer_types(&row.filter_customer_types)?,
            contact_count: row.contact_count,
            last_synced_at: row.last_synced_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: i64,
    list_id: i64,
    customer_id: Option<i64>,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    created_at: i64,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            list_id: row.list_id,
            customer_id: row.customer_id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

pub async fn list(pool: &PgPool) -> Result<Vec<ContactList>, BoxError> {
    let rows: Vec<ContactListRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM contact_lists l ORDER BY l.created_at DESC, l.id DESC"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(ContactList::try_from).collect()
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<ContactList>, BoxError> {
    let row: Option<ContactListRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM contact_lists l WHERE l.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    row.map(ContactList::try_from).transpose()
}

/// Create a list with its initial contacts
pub async fn create(pool: &PgPool, data: &ContactListCreate) -> Result<i64, BoxError> {
    let now = shared::util::now_millis();
    let id = super::snowflake_id();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO contact_lists (id, name, description, kind, filter_customer_types,
                                   created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        "#,
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.kind.as_str())
    .bind(customer_types_to_db(&data.filter_customer_types))
    .bind(now)
    .execute(&mut *tx)
    .await?;

    insert_contacts(&mut tx, id, &data.contacts, now).await?;

    tx.commit().await?;
    Ok(id)
}

async fn insert_contacts(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    list_id: i64,
    contacts: &[ContactInput],
    now: i64,
) -> Result<(), BoxError> {
    for contact in contacts {
        sqlx::query(
            r#"
            INSERT INTO contacts (id, list_id, customer_id, name, phone, email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(super::snowflake_id())
        .bind(list_id)
        .bind(contact.customer_id)
        .bind(contact.name.trim())
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM contact_lists WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn contacts(pool: &PgPool, list_id: i64) -> Result<Vec<Contact>, BoxError> {
    let rows: Vec<ContactRow> = sqlx::query_as(
        r#"
        SELECT id, list_id, customer_id, name, phone, email, created_at
        FROM contacts WHERE list_id = $1
        ORDER BY name, id
        "#,
    )
    .bind(list_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Contact::from).collect())
}

/// Replace a list's contacts with the customers matching `types`.
/// Returns the new contact count.
pub async fn sync_from_customers(
    pool: &PgPool,
    list_id: i64,
    types: &[CustomerType],
) -> Result<u64, BoxError> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM contacts WHERE list_id = $1")
        .bind(list_id)
        .execute(&mut *tx)
        .await?;

    let customers: Vec<(i64, String, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT id, name, phone, email FROM customers WHERE customer_type = ANY($1) ORDER BY id",
    )
    .bind(customer_types_to_db(types))
    .fetch_all(&mut *tx)
    .await?;

    let inputs: Vec<ContactInput> = customers
        .into_iter()
        .map(|(id, name, phone, email)| ContactInput {
            name,
            phone,
            email,
            customer_id: Some(id),
        })
        .collect();
    insert_contacts(&mut tx, list_id, &inputs, now).await?;

    sqlx::query("UPDATE contact_lists SET last_synced_at = $1, updated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(list_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(inputs.len() as u64)
}

/// Distinct linked customer ids across the given lists
pub async fn customer_ids_for_lists(pool: &PgPool, list_ids: &[i64]) -> Result<Vec<i64>, BoxError> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT customer_id FROM contacts
        WHERE list_id = ANY($1) AND customer_id IS NOT NULL
        ORDER BY customer_id
        "#,
    )
    .bind(list_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
