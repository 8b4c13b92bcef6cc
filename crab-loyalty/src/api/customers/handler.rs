//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Customer, CustomerCreate, CustomerUpdate, Order, OrderItem, PointsTransaction,
    PointsTransactionType,
};

use super::super::{ApiResult, require_text};
use crate::BoxError;
use crate::db::{self, customers::CustomerQuery};
use crate::error::ServiceError;
use crate::money::validate_percent;
use crate::state::AppState;

/// Map phone/email unique violations to their business codes
fn conflict_error(err: BoxError) -> ServiceError {
    match db::unique_violation(&err).as_deref() {
        Some("customers_phone_key") => AppError::new(ErrorCode::CustomerPhoneExists).into(),
        Some("customers_email_key") => AppError::new(ErrorCode::CustomerEmailExists).into(),
        Some(_) => AppError::already_exists("Customer").into(),
        None => err.into(),
    }
}

async fn require_customer(state: &AppState, id: i64) -> Result<Customer, ServiceError> {
    db::customers::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound).into())
}

fn validate_rate(rate: Option<f64>) -> Result<(), AppError> {
    match rate {
        Some(rate) => validate_percent(rate, "customDiscountRate"),
        None => Ok(()),
    }
}

/// GET /customers
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Vec<Customer>> {
    let customers = db::customers::list(&state.pool, &query).await?;
    Ok(Json(customers))
}

/// GET /customers/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Customer> {
    Ok(Json(require_customer(&state, id).await?))
}

/// POST /customers
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CustomerCreate>,
) -> ApiResult<Customer> {
    require_text(&payload.name, "name")?;
    validate_rate(payload.custom_discount_rate)?;

    let customer = db::customers::create(&state.pool, &payload, None)
        .await
        .map_err(conflict_error)?;
    tracing::info!(customer_id = customer.id, "Customer created");
    Ok(Json(customer))
}

/// PUT /customers/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> ApiResult<Customer> {
    if let Some(name) = &payload.name {
        require_text(name, "name")?;
    }
    validate_rate(payload.custom_discount_rate)?;

    let customer = db::customers::update(&state.pool, id, &payload)
        .await
        .map_err(conflict_error)?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
    Ok(Json(customer))
}

/// GET /customers/{id}/points
pub async fn points_ledger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<PointsTransaction>> {
    require_customer(&state, id).await?;
    Ok(Json(db::points::ledger(&state.pool, id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub points: i64,
    pub description: Option<String>,
    pub order_id: Option<i64>,
}

/// POST /customers/{id}/points/redeem
pub async fn redeem_points(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RedeemRequest>,
) -> ApiResult<PointsTransaction> {
    if payload.points <= 0 {
        return Err(AppError::validation("points must be positive")
            .with_detail("field", "points")
            .into());
    }
    require_customer(&state, id).await?;

    let entry = db::points::apply_transaction(
        &state.pool,
        id,
        -payload.points,
        PointsTransactionType::Redeem,
        payload.description.as_deref(),
        payload.order_id,
    )
    .await?
    .ok_or_else(|| AppError::business_rule("Insufficient points"))?;
    tracing::info!(customer_id = id, points = payload.points, "Points redeemed");
    Ok(Json(entry))
}

/// Order with its line items
#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// GET /customers/{id}/orders
pub async fn orders(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<OrderWithItems>> {
    require_customer(&state, id).await?;
    let orders = db::orders::list_for_customer(&state.pool, id).await?;
    let mut result = Vec::with_capacity(orders.len());
    for order in orders {
        let items = db::orders::list_items(&state.pool, order.id).await?;
        result.push(OrderWithItems { order, items });
    }
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_constraint_errors_stay_internal() {
        let err = conflict_error("pool timed out".into());
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InternalError);
    }

    #[test]
    fn custom_rate_must_be_a_percent() {
        assert!(validate_rate(None).is_ok());
        assert!(validate_rate(Some(12.5)).is_ok());
        assert!(validate_rate(Some(120.0)).is_err());
    }
}
