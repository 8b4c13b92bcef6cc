//! Member discount rate resolution

use shared::models::{CustomerType, DiscountRule, LoyaltySettings};

/// Rate for a customer type: REGULAR gets nothing, then the first active
/// rule covering the type (rules in creation order), then settings.
pub fn discount_rate_for_type(
    customer_type: CustomerType,
    rules: &[DiscountRule],
    settings: &LoyaltySettings,
) -> f64 {
    if customer_type == CustomerType::Regular {
        return 0.0;
    }
    rules
        .iter()
        .find(|r| r.is_active && r.customer_types.contains(&customer_type))
        .map(|r| r.discount_percent)
        .unwrap_or_else(|| settings.discount_percent_for(customer_type))
}

/// Effective member rate: a customer's custom rate wins for any type
pub fn member_discount_rate(
    customer_type: CustomerType,
    custom_discount_rate: Option<f64>,
    rules: &[DiscountRule],
    settings: &LoyaltySettings,
) -> f64 {
    custom_discount_rate
        .unwrap_or_else(|| discount_rate_for_type(customer_type, rules, settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: i64, types: &[CustomerType], percent: f64, active: bool) -> DiscountRule {
        DiscountRule {
            id,
            name: format!("rule_{id}"),
            customer_types: types.to_vec(),
            discount_percent: percent,
            is_active: active,
            created_at: id,
            updated_at: id,
        }
    }

    fn generous_settings() -> LoyaltySettings {
        LoyaltySettings {
            gc_discount_percent: 20.0,
            designer_discount_percent: 15.0,
            wholesale_discount_percent: 30.0,
            other_discount_percent: 5.0,
            ..Default::default()
        }
    }

    #[test]
    fn regular_is_always_zero() {
        let rules = vec![rule(1, &[CustomerType::Regular], 50.0, true)];
        assert_eq!(
            discount_rate_for_type(CustomerType::Regular, &rules, &generous_settings()),
            0.0
        );
        assert_eq!(
            member_discount_rate(CustomerType::Regular, None, &rules, &generous_settings()),
            0.0
        );
    }

    #[test]
    fn first_active_rule_wins_over_settings() {
        let rules = vec![
            rule(1, &[CustomerType::Gc], 12.0, false),
            rule(2, &[CustomerType::Designer, CustomerType::Gc], 18.0, true),
            rule(3, &[CustomerType::Gc], 25.0, true),
        ];
        let settings = generous_settings();
        assert_eq!(
            discount_rate_for_type(CustomerType::Gc, &rules, &settings),
            18.0
        );
        assert_eq!(
            discount_rate_for_type(CustomerType::Wholesale, &rules, &settings),
            30.0
        );
    }

    #[test]
    fn custom_rate_overrides_everything() {
        let settings = generous_settings();
        assert_eq!(
            member_discount_rate(CustomerType::Gc, Some(7.5), &[], &settings),
            7.5
        );
        assert_eq!(
            member_discount_rate(CustomerType::Regular, Some(3.0), &[], &settings),
            3.0
        );
        assert_eq!(
            member_discount_rate(CustomerType::Other, None, &[], &settings),
            5.0
        );
    }
}
