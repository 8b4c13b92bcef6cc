//! QuickBooks API: connection, sync triggers, webhook and discount helper

mod discount_helper;
mod handler;
mod webhook;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/quickbooks", routes())
}

fn routes() -> Router<AppState> {
    let connection = Router::new()
        .route("/auth-url", get(handler::auth_url))
        .route("/callback", get(handler::callback))
        .route("/status", get(handler::status))
        .route("/disconnect", post(handler::disconnect))
        .route("/refresh-token", post(handler::refresh_token));

    let sync = Router::new()
        .route("/sync/customers", post(handler::sync_customers))
        .route("/sync/orders", post(handler::sync_orders))
        .route("/sync/payments", post(handler::sync_payments))
        .route("/sync-logs", get(handler::sync_logs));

    // Signature-verified, raw body
    let webhook = Router::new().route("/webhook", post(webhook::handle_webhook));

    let discount_helper = Router::new()
        .route("/discount-helper/lookup", get(discount_helper::lookup))
        .route("/discount-helper/calculate", post(discount_helper::calculate));

    connection.merge(sync).merge(webhook).merge(discount_helper)
}
