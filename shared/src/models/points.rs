//! Points Rule & Points Ledger Models

use serde::{Deserialize, Serialize};

use super::customer::CustomerType;

/// Points earning rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsRule {
    pub id: i64,
    pub name: String,
    pub customer_types: Vec<CustomerType>,
    /// Points per 100 currency units spent
    pub earn_rate: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create points rule payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsRuleCreate {
    pub name: String,
    pub customer_types: Vec<CustomerType>,
    pub earn_rate: f64,
}

/// Update points rule payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsRuleUpdate {
    pub name: Option<String>,
    pub customer_types: Option<Vec<CustomerType>>,
    pub earn_rate: Option<f64>,
    pub is_active: Option<bool>,
}

/// Ledger entry type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointsTransactionType {
    Earn,
    Redeem,
}

impl PointsTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earn => "EARN",
            Self::Redeem => "REDEEM",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EARN" => Some(Self::Earn),
            "REDEEM" => Some(Self::Redeem),
            _ => None,
        }
    }
}

/// Points ledger row (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsTransaction {
    pub id: i64,
    pub customer_id: i64,
    /// Signed: positive for EARN, negative for REDEEM
    pub amount: i64,
    pub transaction_type: PointsTransactionType,
    pub description: Option<String>,
    pub order_id: Option<i64>,
    pub created_at: i64,
}
