//! QuickBooks → local reconciliation
//!
//! Batch imports (customers, invoices, payments) and the webhook dispatcher.
//! Item failures are collected and never abort the rest of a batch; only a
//! failed page fetch aborts one. Every batch leaves a sync log row.

use std::future::Future;

use chrono::{DateTime, NaiveDate, SecondsFormat};
use shared::error::AppError;
use shared::models::{
    Customer, CustomerCreate, Order, OrderStatus, SyncEntity, SyncLogStatus, SyncResult,
};
use sqlx::PgPool;

use super::{connection, rewards};
use crate::db::{self, orders::InvoiceUpsert};
use crate::error::{ServiceError, ServiceResult};
use crate::quickbooks::invoice::{ParsedInvoice, parse_invoice};
use crate::quickbooks::types::{QbCustomer, QbInvoice, QbPayment};
use crate::quickbooks::webhook::{ChangedEntity, WebhookPayload};
use crate::quickbooks::{QuickBooksError, RealmAuth};
use crate::state::AppState;

/// Page size for batch imports
pub const PAGE_SIZE: u32 = 100;

const ACTION_IMPORT: &str = "IMPORT";
const ACTION_WEBHOOK: &str = "WEBHOOK";

/// Normalize a `modifiedAfter` filter (RFC 3339 instant or plain date)
pub fn normalize_modified_after(value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.to_rfc3339_opts(SecondsFormat::Secs, false));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(format!("{date}T00:00:00+00:00"));
    }
    Err(
        AppError::validation("modifiedAfter must be an RFC 3339 timestamp or YYYY-MM-DD")
            .with_detail("field", "modifiedAfter"),
    )
}

/// Running tally of one batch
#[derive(Debug, Default)]
pub struct BatchTally {
    pub synced: usize,
    pub errors: Vec<String>,
}

impl BatchTally {
    pub fn record<T>(&mut self, label: &str, result: Result<T, ServiceError>) {
        match result {
            Ok(_) => self.synced += 1,
            Err(e) => {
                tracing::warn!(item = label, error = %e, "Sync item failed");
                self.errors.push(format!("{label}: {e}"));
            }
        }
    }

    pub fn status(&self) -> SyncLogStatus {
        SyncLogStatus::from_counts(self.synced, self.errors.len())
    }
}

async fn write_log(
    pool: &PgPool,
    entity: SyncEntity,
    action: &str,
    status: SyncLogStatus,
    error_message: Option<&str>,
    record_count: usize,
) {
    if let Err(e) = db::sync_logs::insert(
        pool,
        entity,
        action,
        status,
        error_message,
        record_count as i64,
    )
    .await
    {
        tracing::error!(entity = entity.as_str(), error = %e, "Failed to write sync log");
    }
}

async fn finish_batch(
    pool: &PgPool,
    entity: SyncEntity,
    action: &str,
    label: &str,
    tally: BatchTally,
) -> SyncResult {
    let status = tally.status();
    let error_message = (!tally.errors.is_empty()).then(|| tally.errors.join("; "));
    write_log(pool, entity, action, status, error_message.as_deref(), tally.synced).await;
    tracing::info!(
        entity = entity.as_str(),
        synced = tally.synced,
        failed = tally.errors.len(),
        "Sync batch finished"
    );
    SyncResult::from_batch(label, tally.synced, tally.errors)
}

async fn abort_batch(
    pool: &PgPool,
    entity: SyncEntity,
    action: &str,
    tally: &BatchTally,
    error: &ServiceError,
) {
    tracing::error!(entity = entity.as_str(), error = %error, "Sync batch aborted");
    let message = error.to_string();
    write_log(pool, entity, action, SyncLogStatus::Failed, Some(&message), tally.synced).await;
}

/// Fetch pages until one comes back short
async fn fetch_all<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, QuickBooksError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, QuickBooksError>>,
{
    let mut all = Vec::new();
    let mut start = 1;
    loop {
        let page = fetch_page(start).await?;
        let len = page.len() as u32;
        all.extend(page);
        if len < PAGE_SIZE {
            return Ok(all);
        }
        start += PAGE_SIZE;
    }
}

/// Credentials plus every page of an entity, logging a FAILED batch on error
async fn load_batch<T, F, Fut>(
    state: &AppState,
    entity: SyncEntity,
    fetch_page: F,
) -> ServiceResult<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, QuickBooksError>>,
{
    match fetch_all(fetch_page).await {
        Ok(items) => Ok(items),
        Err(e) => {
            let error = ServiceError::from(e);
            abort_batch(&state.pool, entity, ACTION_IMPORT, &BatchTally::default(), &error).await;
            Err(error)
        }
    }
}

async fn credentials(state: &AppState, entity: SyncEntity) -> ServiceResult<RealmAuth> {
    match connection::refresh_token_if_needed(state).await {
        Ok(auth) => Ok(auth),
        Err(e) => {
            abort_batch(&state.pool, entity, ACTION_IMPORT, &BatchTally::default(), &e).await;
            Err(e)
        }
    }
}

// ── Customers ──

/// How a QuickBooks customer landed locally
#[derive(Debug)]
pub enum CustomerSync {
    /// Already linked by QuickBooks id
    Existing(Customer),
    /// Matched by phone or email; QuickBooks id backfilled
    Linked(Customer),
    Created(Customer),
}

impl CustomerSync {
    pub fn into_customer(self) -> Customer {
        match self {
            Self::Existing(c) | Self::Linked(c) | Self::Created(c) => c,
        }
    }
}

/// Match by QuickBooks id, then phone, then email; otherwise create a
/// REGULAR customer. Local fields are never overwritten.
pub async fn upsert_customer(pool: &PgPool, qb: &QbCustomer) -> ServiceResult<CustomerSync> {
    if let Some(customer) = db::customers::find_by_quickbooks_id(pool, &qb.id).await? {
        return Ok(CustomerSync::Existing(customer));
    }

    let phone = qb.phone();
    let email = qb.email();
    let mut matched = None;
    if let Some(phone) = phone.as_deref() {
        matched = db::customers::find_by_phone(pool, phone).await?;
    }
    if matched.is_none()
        && let Some(email) = email.as_deref()
    {
        matched = db::customers::find_by_email(pool, email).await?;
    }

    if let Some(customer) = matched {
        if customer.quickbooks_id.is_none()
            && let Some(linked) = db::customers::link_quickbooks_id(pool, customer.id, &qb.id).await?
        {
            tracing::info!(customer_id = linked.id, quickbooks_id = %qb.id, "Linked existing customer");
            return Ok(CustomerSync::Linked(linked));
        }
        return Ok(CustomerSync::Linked(customer));
    }

    let data = CustomerCreate {
        name: qb.name(),
        phone,
        email,
        company: qb.company_name.clone(),
        ..Default::default()
    };
    let customer = db::customers::create(pool, &data, Some(&qb.id)).await?;
    tracing::info!(customer_id = customer.id, quickbooks_id = %qb.id, "Imported customer");
    Ok(CustomerSync::Created(customer))
}

pub async fn sync_customers(state: &AppState) -> ServiceResult<SyncResult> {
    let auth = credentials(state, SyncEntity::Customer).await?;
    let client = &state.quickbooks;
    let customers = load_batch(state, SyncEntity::Customer, |start| {
        client.query_customers(&auth, start, PAGE_SIZE)
    })
    .await?;

    let mut tally = BatchTally::default();
    for qb in &customers {
        let result = upsert_customer(&state.pool, qb).await;
        tally.record(&format!("Customer {}", qb.id), result);
    }
    Ok(finish_batch(&state.pool, SyncEntity::Customer, ACTION_IMPORT, "customers", tally).await)
}

// ── Invoices ──

/// Local customer for an invoice, created on first sight
async fn invoice_customer(pool: &PgPool, invoice: &ParsedInvoice) -> ServiceResult<Customer> {
    if let Some(customer) = db::customers::find_by_quickbooks_id(pool, &invoice.customer_ref).await? {
        return Ok(customer);
    }
    let name = invoice
        .customer_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("QuickBooks customer {}", invoice.customer_ref));
    let data = CustomerCreate {
        name,
        ..Default::default()
    };
    let customer = db::customers::create(pool, &data, Some(&invoice.customer_ref)).await?;
    tracing::info!(customer_id = customer.id, quickbooks_id = %invoice.customer_ref, "Created customer from invoice");
    Ok(customer)
}

/// Upsert one invoice as an order.
///
/// Only a newly created COMPLETED order records its discount code and earns
/// points; an existing order moving to COMPLETED here does not.
pub async fn apply_invoice(pool: &PgPool, qb: &QbInvoice) -> ServiceResult<InvoiceUpsert> {
    let invoice = parse_invoice(qb);
    let customer = invoice_customer(pool, &invoice).await?;
    let outcome = db::orders::upsert_from_invoice(pool, customer.id, &invoice).await?;

    if let InvoiceUpsert::Created(order) = &outcome
        && order.status == OrderStatus::Completed
    {
        if let Some(code) = order.discount_code.as_deref() {
            rewards::record_discount_usage(pool, code, customer.id, Some(order.id)).await?;
        }
        rewards::award_points_for_order(pool, &customer, order).await?;
    }
    Ok(outcome)
}

pub async fn sync_orders(
    state: &AppState,
    modified_after: Option<&str>,
) -> ServiceResult<SyncResult> {
    let modified_after = modified_after.map(normalize_modified_after).transpose()?;
    let auth = credentials(state, SyncEntity::Invoice).await?;
    let client = &state.quickbooks;
    let filter = modified_after.as_deref();
    let invoices = load_batch(state, SyncEntity::Invoice, |start| {
        client.query_invoices(&auth, start, PAGE_SIZE, filter)
    })
    .await?;

    let mut tally = BatchTally::default();
    for qb in &invoices {
        let result = apply_invoice(&state.pool, qb).await;
        tally.record(&format!("Invoice {}", qb.id), result);
    }
    Ok(finish_batch(&state.pool, SyncEntity::Invoice, ACTION_IMPORT, "orders", tally).await)
}

// ── Payments ──

async fn complete_and_award(pool: &PgPool, customer: &Customer, order: &Order) -> ServiceResult<bool> {
    let Some(completed) = db::orders::mark_completed(pool, order.id).await? else {
        return Ok(false);
    };
    rewards::award_points_for_order(pool, customer, &completed).await?;
    tracing::info!(order_id = completed.id, customer_id = customer.id, "Order completed by payment");
    Ok(true)
}

/// Webhook payment: complete the customer's most recent PENDING order.
/// Returns the completed order id, if any.
pub async fn apply_payment(pool: &PgPool, payment: &QbPayment) -> ServiceResult<Option<i64>> {
    let customer_ref = &payment.customer_ref.value;
    let Some(customer) = db::customers::find_by_quickbooks_id(pool, customer_ref).await? else {
        tracing::warn!(payment_id = %payment.id, customer_ref = %customer_ref, "Payment for unknown customer");
        return Ok(None);
    };
    let Some(order) = db::orders::find_latest_pending(pool, customer.id).await? else {
        tracing::info!(payment_id = %payment.id, customer_id = customer.id, "No pending order for payment");
        return Ok(None);
    };
    tracing::debug!(
        payment_id = %payment.id,
        linked_invoices = ?payment.linked_invoice_ids(),
        matched_invoice = ?order.quickbooks_invoice_id,
        "Matching payment to most recent pending order"
    );
    let completed = complete_and_award(pool, &customer, &order).await?;
    Ok(completed.then_some(order.id))
}

/// Batch payment: complete the PENDING orders of the invoices the payment
/// is linked to. Re-running is a no-op for orders already completed.
pub async fn apply_payment_links(pool: &PgPool, payment: &QbPayment) -> ServiceResult<usize> {
    let mut completed = 0;
    for invoice_id in payment.linked_invoice_ids() {
        let Some(order) = db::orders::find_by_invoice_id(pool, invoice_id).await? else {
            continue;
        };
        if order.status != OrderStatus::Pending {
            continue;
        }
        let Some(customer) = db::customers::find_by_id(pool, order.customer_id).await? else {
            continue;
        };
        if complete_and_award(pool, &customer, &order).await? {
            completed += 1;
        }
    }
    Ok(completed)
}

pub async fn sync_payments(
    state: &AppState,
    modified_after: Option<&str>,
) -> ServiceResult<SyncResult> {
    let modified_after = modified_after.map(normalize_modified_after).transpose()?;
    let auth = credentials(state, SyncEntity::Payment).await?;
    let client = &state.quickbooks;
    let filter = modified_after.as_deref();
    let payments = load_batch(state, SyncEntity::Payment, |start| {
        client.query_payments(&auth, start, PAGE_SIZE, filter)
    })
    .await?;

    let mut tally = BatchTally::default();
    for payment in &payments {
        let result = apply_payment_links(&state.pool, payment).await;
        tally.record(&format!("Payment {}", payment.id), result);
    }
    Ok(finish_batch(&state.pool, SyncEntity::Payment, ACTION_IMPORT, "payments", tally).await)
}

// ── Webhook ──

async fn dispatch_entity(
    state: &AppState,
    auth: &RealmAuth,
    name: &str,
    id: &str,
    operation: &str,
) -> ServiceResult<bool> {
    let client = &state.quickbooks;
    match name {
        "Customer" => {
            let qb = client.get_customer(auth, id).await?;
            upsert_customer(&state.pool, &qb).await?;
        }
        "Invoice" if operation == "Delete" => {
            tracing::info!(invoice_id = id, "Invoice deleted in QuickBooks, local order kept");
            return Ok(false);
        }
        "Invoice" => {
            let qb = client.get_invoice(auth, id).await?;
            apply_invoice(&state.pool, &qb).await?;
        }
        "Payment" if operation == "Delete" => {
            tracing::info!(payment_id = id, "Payment deleted in QuickBooks, ignored");
            return Ok(false);
        }
        "Payment" => {
            let payment = client.get_payment(auth, id).await?;
            apply_payment(&state.pool, &payment).await?;
        }
        other => {
            tracing::debug!(entity = other, id, "Ignoring webhook entity");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Dispatch every entity of the connected realm and tally the outcomes.
/// `Ok(false)` from the dispatcher means skipped; an error is recorded and
/// the loop moves on.
async fn dispatch_all<'a, F, Fut>(
    payload: &'a WebhookPayload,
    connected_realm: &str,
    mut dispatch: F,
) -> BatchTally
where
    F: FnMut(&'a ChangedEntity) -> Fut,
    Fut: Future<Output = ServiceResult<bool>>,
{
    let mut tally = BatchTally::default();
    for (realm_id, entity) in payload.entities() {
        if realm_id.is_some_and(|r| r != connected_realm) {
            tracing::warn!(realm_id = ?realm_id, "Webhook entity for a realm that is not connected");
            continue;
        }
        let label = format!("{} {}", entity.name, entity.id);
        match dispatch(entity).await {
            Ok(true) => tally.record(&label, Ok::<_, ServiceError>(())),
            Ok(false) => {}
            Err(e) => tally.record::<()>(&label, Err(e)),
        }
    }
    tally
}

/// Process a verified webhook payload. Entity failures are logged and
/// do not stop the remaining entities.
pub async fn handle_webhook(state: &AppState, payload: &WebhookPayload) -> BatchTally {
    let auth = match connection::refresh_token_if_needed(state).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(error = %e, "Webhook received without a usable QuickBooks connection");
            return BatchTally::default();
        }
    };

    let tally = dispatch_all(payload, &auth.realm_id, |entity| {
        dispatch_entity(state, &auth, &entity.name, &entity.id, &entity.operation)
    })
    .await;

    if tally.synced > 0 || !tally.errors.is_empty() {
        let status = tally.status();
        let error_message = (!tally.errors.is_empty()).then(|| tally.errors.join("; "));
        write_log(
            &state.pool,
            SyncEntity::Webhook,
            ACTION_WEBHOOK,
            status,
            error_message.as_deref(),
            tally.synced,
        )
        .await;
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn modified_after_accepts_instants_and_dates() {
        assert_eq!(
            normalize_modified_after("2024-05-01T10:30:00Z").unwrap(),
            "2024-05-01T10:30:00+00:00"
        );
        assert_eq!(
            normalize_modified_after("2024-05-01T10:30:00.250-07:00").unwrap(),
            "2024-05-01T10:30:00-07:00"
        );
        assert_eq!(
            normalize_modified_after(" 2024-05-01 ").unwrap(),
            "2024-05-01T00:00:00+00:00"
        );
    }

    #[test]
    fn modified_after_rejects_garbage() {
        let err = normalize_modified_after("yesterday").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let err = normalize_modified_after("2024-05-01' OR 1=1 --").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn tally_counts_and_status() {
        let mut tally = BatchTally::default();
        tally.record("Invoice 1", Ok::<_, ServiceError>(()));
        tally.record("Invoice 2", Ok::<_, ServiceError>(()));
        assert_eq!(tally.status(), SyncLogStatus::Success);

        tally.record::<()>(
            "Invoice 3",
            Err(AppError::new(ErrorCode::CustomerNotFound).into()),
        );
        assert_eq!(tally.synced, 2);
        assert_eq!(tally.errors, vec!["Invoice 3: Customer not found"]);
        assert_eq!(tally.status(), SyncLogStatus::Partial);
    }

    #[tokio::test]
    async fn fetch_all_stops_on_short_page() {
        let mut calls = Vec::new();
        let items = fetch_all(|start| {
            calls.push(start);
            let len = if start < 201 { PAGE_SIZE as usize } else { 7 };
            async move { Ok::<_, QuickBooksError>(vec![start; len]) }
        })
        .await
        .unwrap();
        assert_eq!(calls, vec![1, 101, 201]);
        assert_eq!(items.len(), 207);
    }

    #[tokio::test]
    async fn fetch_all_propagates_page_errors() {
        let result: Result<Vec<u32>, _> = fetch_all(|_| async {
            Err(QuickBooksError::Decode("bad page".into()))
        })
        .await;
        assert!(matches!(result, Err(QuickBooksError::Decode(_))));
    }

    #[tokio::test]
    async fn webhook_dispatch_continues_past_failures() {
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "eventNotifications": [
                {
                    "realmId": "9130",
                    "dataChangeEvent": {
                        "entities": [
                            { "name": "Invoice", "id": "1", "operation": "Create" },
                            { "name": "Payment", "id": "2", "operation": "Create" },
                            { "name": "Invoice", "id": "3", "operation": "Delete" },
                            { "name": "Customer", "id": "4", "operation": "Update" }
                        ]
                    }
                },
                {
                    "realmId": "4620",
                    "dataChangeEvent": {
                        "entities": [{ "name": "Invoice", "id": "5", "operation": "Create" }]
                    }
                }
            ]
        }))
        .unwrap();

        let mut seen = Vec::new();
        let tally = dispatch_all(&payload, "9130", |entity| {
            seen.push(entity.id.clone());
            let outcome: ServiceResult<bool> = match entity.id.as_str() {
                "2" => Err(AppError::new(ErrorCode::OrderNotFound).into()),
                "3" => Ok(false),
                _ => Ok(true),
            };
            async move { outcome }
        })
        .await;

        assert_eq!(seen, vec!["1", "2", "3", "4"]);
        assert_eq!(tally.synced, 2);
        assert_eq!(tally.errors.len(), 1);
        assert!(tally.errors[0].starts_with("Payment 2: "));
        assert_eq!(tally.status(), SyncLogStatus::Partial);
    }
}
