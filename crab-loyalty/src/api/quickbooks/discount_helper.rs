//! Discount helper handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use super::super::ApiResult;
use crate::marketing::calculator::{DiscountBreakdown, DiscountInput, calculate as run_calculator};
use crate::services::discount_helper::{self, CustomerBenefits};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /quickbooks/discount-helper/lookup?q=
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<CustomerBenefits> {
    Ok(Json(discount_helper::lookup(&state.pool, &query.q).await?))
}

/// POST /quickbooks/discount-helper/calculate
pub async fn calculate(Json(input): Json<DiscountInput>) -> ApiResult<DiscountBreakdown> {
    input.validate()?;
    Ok(Json(run_calculator(&input)))
}
