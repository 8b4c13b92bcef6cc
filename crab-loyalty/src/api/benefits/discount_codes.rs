//! Discount code handlers: CRUD, validation and cohort assignment

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{DiscountCode, DiscountCodeAssignment, DiscountCodeCreate, DiscountCodeUpdate};

use super::super::{ApiResult, MessageResponse, require_text};
use crate::db;
use crate::money::validate_percent;
use crate::services::discount_helper::{self, CodeValidation, ValidateCodeRequest};
use crate::services::issuance::{self, AssignmentResult, ByCustomers, ByLists, ByTypes, IssueTarget};
use crate::state::AppState;

fn code_not_found() -> AppError {
    AppError::new(ErrorCode::DiscountCodeNotFound)
}

fn validate_limits(max_uses: Option<i64>) -> Result<(), AppError> {
    match max_uses {
        Some(n) if n < 1 => Err(AppError::validation("maxUses must be at least 1")
            .with_detail("field", "maxUses")),
        _ => Ok(()),
    }
}

/// GET /benefits/discount-codes
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<DiscountCode>> {
    Ok(Json(db::discount_codes::list(&state.pool).await?))
}

/// GET /benefits/discount-codes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<DiscountCode> {
    let code = db::discount_codes::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(code_not_found)?;
    Ok(Json(code))
}

/// POST /benefits/discount-codes
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<DiscountCodeCreate>,
) -> ApiResult<DiscountCode> {
    require_text(&payload.code, "code")?;
    validate_percent(payload.discount_percent, "discountPercent")?;
    validate_limits(payload.max_uses)?;

    let code = match db::discount_codes::create(&state.pool, &payload).await {
        Ok(code) => code,
        Err(e) if db::unique_violation(&e).is_some() => {
            return Err(AppError::new(ErrorCode::DiscountCodeExists)
                .with_detail("code", payload.code.trim().to_uppercase())
                .into());
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(code_id = code.id, code = %code.code, "Discount code created");
    Ok(Json(code))
}

/// PUT /benefits/discount-codes/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DiscountCodeUpdate>,
) -> ApiResult<DiscountCode> {
    if let Some(percent) = payload.discount_percent {
        validate_percent(percent, "discountPercent")?;
    }
    validate_limits(payload.max_uses)?;

    let code = db::discount_codes::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(code_not_found)?;
    Ok(Json(code))
}

/// DELETE /benefits/discount-codes/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<MessageResponse> {
    if !db::discount_codes::delete(&state.pool, id).await? {
        return Err(code_not_found().into());
    }
    Ok(MessageResponse::new("Discount code deleted"))
}

/// POST /benefits/discount-codes/validate
pub async fn validate(
    State(state): State<AppState>,
    Json(payload): Json<ValidateCodeRequest>,
) -> ApiResult<CodeValidation> {
    require_text(&payload.code, "code")?;
    Ok(Json(discount_helper::validate_code(&state.pool, &payload).await?))
}

async fn assign(state: &AppState, id: i64, target: IssueTarget) -> ApiResult<AssignmentResult> {
    Ok(Json(issuance::assign_code(&state.pool, id, &target).await?))
}

/// POST /benefits/discount-codes/{id}/assign/by-type
pub async fn assign_by_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ByTypes>,
) -> ApiResult<AssignmentResult> {
    assign(&state, id, payload.into()).await
}

/// POST /benefits/discount-codes/{id}/assign/by-lists
pub async fn assign_by_lists(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ByLists>,
) -> ApiResult<AssignmentResult> {
    assign(&state, id, payload.into()).await
}

/// POST /benefits/discount-codes/{id}/assign/by-customers
pub async fn assign_by_customers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ByCustomers>,
) -> ApiResult<AssignmentResult> {
    assign(&state, id, payload.into()).await
}

/// GET /benefits/discount-codes/{id}/assignments
pub async fn assignments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<DiscountCodeAssignment>> {
    db::discount_codes::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(code_not_found)?;
    Ok(Json(db::discount_codes::list_assignments(&state.pool, id).await?))
}

/// DELETE /benefits/discount-codes/{id}/assignments/{customer_id}
pub async fn remove_assignment(
    State(state): State<AppState>,
    Path((id, customer_id)): Path<(i64, i64)>,
) -> ApiResult<MessageResponse> {
    if !db::discount_codes::remove_assignment(&state.pool, id, customer_id).await? {
        return Err(AppError::new(ErrorCode::DiscountCodeNotAssigned).into());
    }
    Ok(MessageResponse::new("Assignment removed"))
}

#[derive(Debug, Serialize)]
pub struct ClearResult {
    pub removed: u64,
}

/// DELETE /benefits/discount-codes/{id}/assignments
pub async fn clear_assignments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ClearResult> {
    db::discount_codes::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(code_not_found)?;
    let removed = db::discount_codes::clear_assignments(&state.pool, id).await?;
    tracing::info!(code_id = id, removed, "Discount code assignments cleared");
    Ok(Json(ClearResult { removed }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_uses_must_be_positive() {
        assert!(validate_limits(None).is_ok());
        assert!(validate_limits(Some(1)).is_ok());
        assert_eq!(
            validate_limits(Some(0)).unwrap_err().details.unwrap()["field"],
            "maxUses"
        );
    }
}
