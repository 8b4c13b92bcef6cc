//! Discount Code & Discount Rule Models

use serde::{Deserialize, Serialize};

use super::customer::CustomerType;

/// Discount code type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountCodeType {
    /// Usable by any customer
    Generic,
    /// Usable only by the owner or assigned customers
    Exclusive,
}

impl DiscountCodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "GENERIC",
            Self::Exclusive => "EXCLUSIVE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GENERIC" => Some(Self::Generic),
            "EXCLUSIVE" => Some(Self::Exclusive),
            _ => None,
        }
    }
}

/// Discount code entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCode {
    pub id: i64,
    /// Unique, stored upper-case
    pub code: String,
    pub code_type: DiscountCodeType,
    pub discount_percent: f64,
    pub description: Option<String>,
    pub owner_customer_id: Option<i64>,
    pub is_active: bool,
    pub usage_count: i64,
    pub unique_users: i64,
    /// Total redemption cap (None = unlimited)
    pub max_uses: Option<i64>,
    pub expires_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create discount code payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCodeCreate {
    pub code: String,
    pub code_type: DiscountCodeType,
    pub discount_percent: f64,
    pub description: Option<String>,
    pub owner_customer_id: Option<i64>,
    pub max_uses: Option<i64>,
    pub expires_at: Option<i64>,
}

/// Update discount code payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCodeUpdate {
    pub discount_percent: Option<f64>,
    pub description: Option<String>,
    pub owner_customer_id: Option<i64>,
    pub is_active: Option<bool>,
    pub max_uses: Option<i64>,
    pub expires_at: Option<i64>,
}

/// Discount code assignment (code ↔ customer), with customer info for list views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCodeAssignment {
    pub discount_code_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_type: CustomerType,
    pub assigned_at: i64,
}

/// Discount code usage row (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCodeUsage {
    pub id: i64,
    pub discount_code_id: i64,
    pub customer_id: i64,
    pub order_id: Option<i64>,
    pub used_at: i64,
}

/// Member discount rule: a percent for a set of customer types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRule {
    pub id: i64,
    pub name: String,
    pub customer_types: Vec<CustomerType>,
    pub discount_percent: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create discount rule payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRuleCreate {
    pub name: String,
    pub customer_types: Vec<CustomerType>,
    pub discount_percent: f64,
}

/// Update discount rule payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRuleUpdate {
    pub name: Option<String>,
    pub customer_types: Option<Vec<CustomerType>>,
    pub discount_percent: Option<f64>,
    pub is_active: Option<bool>,
}
