//! Points earning

use rust_decimal::prelude::*;
use shared::models::{CustomerType, PointsRule};

use crate::money::to_decimal;

/// First active rule covering the type (rules in creation order)
pub fn find_points_rule(rules: &[PointsRule], customer_type: CustomerType) -> Option<&PointsRule> {
    rules
        .iter()
        .find(|r| r.is_active && r.customer_types.contains(&customer_type))
}

/// `floor(amount × earnRate / 100)`, never negative
pub fn points_for_amount(amount: f64, earn_rate: f64) -> i64 {
    let points = (to_decimal(amount) * to_decimal(earn_rate) / Decimal::ONE_HUNDRED).floor();
    points.to_i64().unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: i64, types: &[CustomerType], earn_rate: f64, active: bool) -> PointsRule {
        PointsRule {
            id,
            name: format!("points_{id}"),
            customer_types: types.to_vec(),
            earn_rate,
            is_active: active,
            created_at: id,
            updated_at: id,
        }
    }

    #[test]
    fn floors_points() {
        assert_eq!(points_for_amount(130.0, 10.0), 13);
        assert_eq!(points_for_amount(99.99, 1.0), 0);
        assert_eq!(points_for_amount(250.5, 2.0), 5);
        assert_eq!(points_for_amount(0.0, 10.0), 0);
        assert_eq!(points_for_amount(-50.0, 10.0), 0);
    }

    #[test]
    fn picks_first_active_matching_rule() {
        let rules = vec![
            rule(1, &[CustomerType::Gc], 5.0, false),
            rule(2, &[CustomerType::Wholesale], 1.0, true),
            rule(3, &[CustomerType::Gc, CustomerType::Designer], 3.0, true),
            rule(4, &[CustomerType::Gc], 9.0, true),
        ];
        assert_eq!(find_points_rule(&rules, CustomerType::Gc).map(|r| r.id), Some(3));
        assert_eq!(
            find_points_rule(&rules, CustomerType::Designer).map(|r| r.id),
            Some(3)
        );
        assert!(find_points_rule(&rules, CustomerType::Regular).is_none());
    }
}
