//! Discount Calculator
//!
//! Applies member discount, then promo-code discount, then points redemption.
//! Each deduction is taken from what remains after the previous one, and
//! every output figure is rounded from unrounded intermediates.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::money::{to_decimal, to_f64, validate_amount, validate_percent};

fn default_true() -> bool {
    true
}

/// Calculator input
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountInput {
    pub order_amount: f64,
    #[serde(default = "default_true")]
    pub apply_member_discount: bool,
    #[serde(default)]
    pub member_discount_percent: f64,
    #[serde(default = "default_true")]
    pub apply_promo_discount: bool,
    #[serde(default)]
    pub promo_discount_percent: f64,
    /// Points the customer wants to redeem
    #[serde(default)]
    pub redeem_points: i64,
    /// Currency value of one point
    #[serde(default)]
    pub points_redemption_rate: f64,
}

/// Calculator output (all amounts rounded to 2 dp)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountBreakdown {
    pub original_amount: f64,
    pub member_discount: f64,
    pub promo_discount: f64,
    pub points_discount: f64,
    /// Points actually consumed (fewer than requested when capped)
    pub points_used: i64,
    pub total_discount: f64,
    pub final_amount: f64,
}

impl DiscountInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_amount(self.order_amount, "orderAmount")?;
        validate_percent(self.member_discount_percent, "memberDiscountPercent")?;
        validate_percent(self.promo_discount_percent, "promoDiscountPercent")?;
        if self.redeem_points < 0 {
            return Err(AppError::validation("redeemPoints must be non-negative")
                .with_detail("field", "redeemPoints"));
        }
        validate_amount(self.points_redemption_rate, "pointsRedemptionRate")?;
        Ok(())
    }
}

/// Calculate the discount breakdown for an order amount
pub fn calculate(input: &DiscountInput) -> DiscountBreakdown {
    let hundred = Decimal::ONE_HUNDRED;
    let original = to_decimal(input.order_amount).max(Decimal::ZERO);

    let member = if input.apply_member_discount {
        original * to_decimal(input.member_discount_percent) / hundred
    } else {
        Decimal::ZERO
    };
    let after_member = original - member;

    let promo = if input.apply_promo_discount {
        after_member * to_decimal(input.promo_discount_percent) / hundred
    } else {
        Decimal::ZERO
    };
    let after_promo = after_member - promo;

    let rate = to_decimal(input.points_redemption_rate);
    let requested_points = Decimal::from(input.redeem_points.max(0));
    let points_value = requested_points * rate;
    let points = points_value.min(after_promo).max(Decimal::ZERO);
    let points_used = if rate.is_zero() || points == points_value {
        if points.is_zero() { 0 } else { input.redeem_points }
    } else {
        (points / rate).ceil().to_i64().unwrap_or(0)
    };

    let final_amount = after_promo - points;
    let total = member + promo + points;

    DiscountBreakdown {
        original_amount: to_f64(original),
        member_discount: to_f64(member),
        promo_discount: to_f64(promo),
        points_discount: to_f64(points),
        points_used,
        total_discount: to_f64(total),
        final_amount: to_f64(final_amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: f64, member: f64, promo: f64, points: i64, rate: f64) -> DiscountInput {
        DiscountInput {
            order_amount: amount,
            apply_member_discount: true,
            member_discount_percent: member,
            apply_promo_discount: true,
            promo_discount_percent: promo,
            redeem_points: points,
            points_redemption_rate: rate,
        }
    }

    #[test]
    fn stacks_member_then_promo_then_points() {
        let out = calculate(&input(200.0, 25.0, 10.0, 500, 0.01));
        assert_eq!(out.original_amount, 200.0);
        assert_eq!(out.member_discount, 50.0);
        assert_eq!(out.promo_discount, 15.0);
        assert_eq!(out.points_discount, 5.0);
        assert_eq!(out.points_used, 500);
        assert_eq!(out.final_amount, 130.0);
        assert_eq!(out.total_discount, 70.0);
    }

    #[test]
    fn points_capped_at_remaining_amount() {
        let out = calculate(&input(10.0, 0.0, 50.0, 10_000, 0.01));
        assert_eq!(out.promo_discount, 5.0);
        assert_eq!(out.points_discount, 5.0);
        assert_eq!(out.points_used, 500);
        assert_eq!(out.final_amount, 0.0);
        assert_eq!(out.total_discount, 10.0);
    }

    #[test]
    fn disabled_discounts_are_skipped() {
        let mut i = input(100.0, 20.0, 10.0, 0, 0.01);
        i.apply_member_discount = false;
        let out = calculate(&i);
        assert_eq!(out.member_discount, 0.0);
        assert_eq!(out.promo_discount, 10.0);
        assert_eq!(out.points_used, 0);
        assert_eq!(out.final_amount, 90.0);

        i.apply_promo_discount = false;
        let out = calculate(&i);
        assert_eq!(out.total_discount, 0.0);
        assert_eq!(out.final_amount, 100.0);
    }

    #[test]
    fn outputs_rounded_independently() {
        // 33.33% of 10.01 = 3.336333 -> 3.34; remaining 6.673667
        // 15% of remaining = 1.001050 -> 1.00; total 4.337383 -> 4.34
        let out = calculate(&input(10.01, 33.33, 15.0, 0, 0.01));
        assert_eq!(out.member_discount, 3.34);
        assert_eq!(out.promo_discount, 1.0);
        assert_eq!(out.total_discount, 4.34);
        assert_eq!(out.final_amount, 5.67);
    }

    #[test]
    fn zero_rate_redeems_nothing() {
        let out = calculate(&input(50.0, 0.0, 0.0, 1_000, 0.0));
        assert_eq!(out.points_discount, 0.0);
        assert_eq!(out.points_used, 0);
        assert_eq!(out.final_amount, 50.0);
    }

    #[test]
    fn validation_rejects_out_of_range() {
        assert!(input(100.0, 10.0, 10.0, 0, 0.01).validate().is_ok());
        assert!(input(-1.0, 10.0, 10.0, 0, 0.01).validate().is_err());
        assert!(input(100.0, 120.0, 10.0, 0, 0.01).validate().is_err());
        assert!(input(100.0, 10.0, 10.0, -5, 0.01).validate().is_err());
        assert!(input(100.0, 10.0, 10.0, 5, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn input_defaults_apply_flags() {
        let i: DiscountInput =
            serde_json::from_str(r#"{"orderAmount": 80, "memberDiscountPercent": 10}"#).unwrap();
        assert!(i.apply_member_discount);
        assert!(i.apply_promo_discount);
        assert_eq!(calculate(&i).final_amount, 72.0);
    }
}
