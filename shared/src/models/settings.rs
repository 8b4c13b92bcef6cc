//! Loyalty Settings Model (single row)

use serde::{Deserialize, Serialize};

use super::customer::CustomerType;

/// Typed loyalty configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltySettings {
    /// Member discount percents per customer type (0-100)
    pub gc_discount_percent: f64,
    pub designer_discount_percent: f64,
    pub wholesale_discount_percent: f64,
    pub other_discount_percent: f64,
    /// Currency value of one point
    pub points_redemption_rate: f64,
    pub updated_at: i64,
}

impl Default for LoyaltySettings {
    fn default() -> Self {
        Self {
            gc_discount_percent: 0.0,
            designer_discount_percent: 0.0,
            wholesale_discount_percent: 0.0,
            other_discount_percent: 0.0,
            points_redemption_rate: 0.01,
            updated_at: 0,
        }
    }
}

impl LoyaltySettings {
    /// Configured member percent for a type. REGULAR has no member discount.
    pub fn discount_percent_for(&self, customer_type: CustomerType) -> f64 {
        match customer_type {
            CustomerType::Regular => 0.0,
            CustomerType::Gc => self.gc_discount_percent,
            CustomerType::Designer => self.designer_discount_percent,
            CustomerType::Wholesale => self.wholesale_discount_percent,
            CustomerType::Other => self.other_discount_percent,
        }
    }
}

/// Update loyalty settings payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltySettingsUpdate {
    pub gc_discount_percent: Option<f64>,
    pub designer_discount_percent: Option<f64>,
    pub wholesale_discount_percent: Option<f64>,
    pub other_discount_percent: Option<f64>,
    pub points_redemption_rate: Option<f64>,
}

impl LoyaltySettingsUpdate {
    /// Merge onto current settings
    pub fn apply_to(&self, current: &LoyaltySettings) -> LoyaltySettings {
        LoyaltySettings {
            gc_discount_percent: self
                .gc_discount_percent
                .unwrap_or(current.gc_discount_percent),
            designer_discount_percent: self
                .designer_discount_percent
                .unwrap_or(current.designer_discount_percent),
            wholesale_discount_percent: self
                .wholesale_discount_percent
                .unwrap_or(current.wholesale_discount_percent),
            other_discount_percent: self
                .other_discount_percent
                .unwrap_or(current.other_discount_percent),
            points_redemption_rate: self
                .points_redemption_rate
                .unwrap_or(current.points_redemption_rate),
            updated_at: current.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_never_gets_member_percent() {
        let settings = LoyaltySettings {
            gc_discount_percent: 25.0,
            other_discount_percent: 5.0,
            ..Default::default()
        };
        assert_eq!(settings.discount_percent_for(CustomerType::Regular), 0.0);
        assert_eq!(settings.discount_percent_for(CustomerType::Gc), 25.0);
        assert_eq!(settings.discount_percent_for(CustomerType::Other), 5.0);
    }

    #[test]
    fn update_merges_only_given_fields() {
        let current = LoyaltySettings {
            designer_discount_percent: 15.0,
            ..Default::default()
        };
        let update = LoyaltySettingsUpdate {
            gc_discount_percent: Some(20.0),
            ..Default::default()
        };
        let merged = update.apply_to(&current);
        assert_eq!(merged.gc_discount_percent, 20.0);
        assert_eq!(merged.designer_discount_percent, 15.0);
        assert_eq!(merged.points_redemption_rate, 0.01);
    }
}
