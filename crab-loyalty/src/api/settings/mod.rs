//! Loyalty settings API module

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/settings/loyalty",
        get(handler::get_loyalty).put(handler::update_loyalty),
    )
}
