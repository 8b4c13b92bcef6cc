//! Loyalty settings handlers

use axum::{Json, extract::State};
use shared::error::AppError;
use shared::models::{LoyaltySettings, LoyaltySettingsUpdate};

use super::super::ApiResult;
use crate::db;
use crate::money::{validate_amount, validate_percent};
use crate::state::AppState;

fn validate_update(update: &LoyaltySettingsUpdate) -> Result<(), AppError> {
    let percents = [
        (update.gc_discount_percent, "gcDiscountPercent"),
        (update.designer_discount_percent, "designerDiscountPercent"),
        (update.wholesale_discount_percent, "wholesaleDiscountPercent"),
        (update.other_discount_percent, "otherDiscountPercent"),
    ];
    for (value, field) in percents {
        if let Some(value) = value {
            validate_percent(value, field)?;
        }
    }
    if let Some(rate) = update.points_redemption_rate {
        validate_amount(rate, "pointsRedemptionRate")?;
    }
    Ok(())
}

/// GET /settings/loyalty
pub async fn get_loyalty(State(state): State<AppState>) -> ApiResult<LoyaltySettings> {
    Ok(Json(db::settings::get(&state.pool).await?))
}

/// PUT /settings/loyalty
pub async fn update_loyalty(
    State(state): State<AppState>,
    Json(payload): Json<LoyaltySettingsUpdate>,
) -> ApiResult<LoyaltySettings> {
    validate_update(&payload)?;
    let current = db::settings::get(&state.pool).await?;
    let saved = db::settings::save(&state.pool, &payload.apply_to(&current)).await?;
    tracing::info!("Loyalty settings updated");
    Ok(Json(saved))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_values() {
        let update = LoyaltySettingsUpdate {
            wholesale_discount_percent: Some(150.0),
            ..Default::default()
        };
        let err = validate_update(&update).unwrap_err();
        assert_eq!(err.details.unwrap()["field"], "wholesaleDiscountPercent");

        let update = LoyaltySettingsUpdate {
            points_redemption_rate: Some(-0.5),
            ..Default::default()
        };
        assert!(validate_update(&update).is_err());

        assert!(validate_update(&LoyaltySettingsUpdate::default()).is_ok());
    }
}
