//! Discount rule and points rule handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CustomerType, DiscountRule, DiscountRuleCreate, DiscountRuleUpdate, PointsRule,
    PointsRuleCreate, PointsRuleUpdate,
};

use super::super::{ApiResult, MessageResponse, require_text};
use crate::db;
use crate::money::{validate_amount, validate_percent};
use crate::state::AppState;

fn validate_types(types: &[CustomerType]) -> Result<(), AppError> {
    if types.is_empty() {
        return Err(AppError::validation("customerTypes must not be empty")
            .with_detail("field", "customerTypes"));
    }
    Ok(())
}

// ── Discount rules ──

/// GET /benefits/discount-rules
pub async fn list_discount_rules(State(state): State<AppState>) -> ApiResult<Vec<DiscountRule>> {
    Ok(Json(db::discount_rules::list(&state.pool).await?))
}

/// POST /benefits/discount-rules
pub async fn create_discount_rule(
    State(state): State<AppState>,
    Json(payload): Json<DiscountRuleCreate>,
) -> ApiResult<DiscountRule> {
    require_text(&payload.name, "name")?;
    validate_types(&payload.customer_types)?;
    validate_percent(payload.discount_percent, "discountPercent")?;

    let rule = db::discount_rules::create(&state.pool, &payload).await?;
    tracing::info!(rule_id = rule.id, name = %rule.name, "Discount rule created");
    Ok(Json(rule))
}

/// PUT /benefits/discount-rules/{id}
pub async fn update_discount_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DiscountRuleUpdate>,
) -> ApiResult<DiscountRule> {
    if let Some(name) = &payload.name {
        require_text(name, "name")?;
    }
    if let Some(types) = &payload.customer_types {
        validate_types(types)?;
    }
    if let Some(percent) = payload.discount_percent {
        validate_percent(percent, "discountPercent")?;
    }

    let rule = db::discount_rules::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DiscountRuleNotFound))?;
    Ok(Json(rule))
}

/// DELETE /benefits/discount-rules/{id}
pub async fn delete_discount_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<MessageResponse> {
    if !db::discount_rules::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::DiscountRuleNotFound).into());
    }
    Ok(MessageResponse::new("Discount rule deleted"))
}

// ── Points rules ──

/// GET /benefits/points-rules
pub async fn list_points_rules(State(state): State<AppState>) -> ApiResult<Vec<PointsRule>> {
    Ok(Json(db::points::list_rules(&state.pool).await?))
}

/// POST /benefits/points-rules
pub async fn create_points_rule(
    State(state): State<AppState>,
    Json(payload): Json<PointsRuleCreate>,
) -> ApiResult<PointsRule> {
    require_text(&payload.name, "name")?;
    validate_types(&payload.customer_types)?;
    validate_amount(payload.earn_rate, "earnRate")?;

    let rule = db::points::create_rule(&state.pool, &payload).await?;
    tracing::info!(rule_id = rule.id, name = %rule.name, "Points rule created");
    Ok(Json(rule))
}

/// PUT /benefits/points-rules/{id}
pub async fn update_points_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PointsRuleUpdate>,
) -> ApiResult<PointsRule> {
    if let Some(name) = &payload.name {
        require_text(name, "name")?;
    }
    if let Some(types) = &payload.customer_types {
        validate_types(types)?;
    }
    if let Some(rate) = payload.earn_rate {
        validate_amount(rate, "earnRate")?;
    }

    let rule = db::points::update_rule(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PointsRuleNotFound))?;
    Ok(Json(rule))
}

/// DELETE /benefits/points-rules/{id}
pub async fn delete_points_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<MessageResponse> {
    if !db::points::delete_rule(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::PointsRuleNotFound).into());
    }
    Ok(MessageResponse::new("Points rule deleted"))
}
