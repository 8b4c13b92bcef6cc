//! Customer API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/customers", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/points", get(handler::points_ledger))
        .route("/{id}/points/redeem", post(handler::redeem_points))
        .route("/{id}/orders", get(handler::orders))
}
