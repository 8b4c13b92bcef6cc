//! Customer credit API module

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/credits", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/stats", get(handler::stats))
        .route("/batches", get(handler::batches))
        .route("/customer/{id}", get(handler::list_for_customer))
        .route("/issue/by-type", post(handler::issue_by_type))
        .route("/issue/by-lists", post(handler::issue_by_lists))
        .route("/issue/by-customers", post(handler::issue_by_customers))
        .route("/batch/{batch_id}", delete(handler::revoke_batch))
        .route("/{id}", delete(handler::revoke))
        .route("/{id}/use", post(handler::use_credit))
        .route("/{id}/validate", get(handler::validate))
}
