//! HTTP API for crab-loyalty

pub mod benefits;
pub mod contact_lists;
pub mod credits;
pub mod customers;
pub mod health;
pub mod quickbooks;
pub mod settings;

use axum::{Json, Router};
use http::{HeaderName, HeaderValue};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, ServiceError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// UUID v4 request ids
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Routes only, no middleware
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(quickbooks::router())
        .merge(customers::router())
        .merge(benefits::router())
        .merge(credits::router())
        .merge(contact_lists::router())
        .merge(settings::router())
}

/// Full application: routes, middleware and state
pub fn create_router(state: AppState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        // Set must wrap propagate: the id is assigned before the inner layers run
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}

/// Trimmed, non-empty text field
pub(crate) fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")).with_detail("field", field));
    }
    Ok(trimmed)
}

/// `{ "message": ... }` body
#[derive(Debug, serde::Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}
