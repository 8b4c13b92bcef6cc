//! Customer Credit (voucher) Models

use serde::{Deserialize, Serialize};

use super::customer::CustomerType;

/// Where a credit came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditSource {
    Promotion,
    Compensation,
    Referral,
    Manual,
}

impl CreditSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Promotion => "PROMOTION",
            Self::Compensation => "COMPENSATION",
            Self::Referral => "REFERRAL",
            Self::Manual => "MANUAL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PROMOTION" => Some(Self::Promotion),
            "COMPENSATION" => Some(Self::Compensation),
            "REFERRAL" => Some(Self::Referral),
            "MANUAL" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// Display status derived from the credit flags
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    Available,
    Used,
    Revoked,
    Expired,
}

/// Customer credit entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCredit {
    pub id: i64,
    pub customer_id: i64,
    pub amount: f64,
    pub min_order_amount: f64,
    pub source: CreditSource,
    /// Groups the credits of one issuance
    pub batch_id: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_used: bool,
    pub used_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub created_at: i64,
}

/// Credit with customer info and display status (list views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditWithCustomer {
    #[serde(flatten)]
    pub credit: CustomerCredit,
    pub customer_name: String,
    pub customer_type: CustomerType,
    pub status: CreditStatus,
}

/// Credit usage row (one per used credit)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditUsage {
    pub id: i64,
    pub credit_id: i64,
    pub customer_id: i64,
    pub order_id: Option<i64>,
    pub order_total: f64,
    pub amount_applied: f64,
    pub used_at: i64,
}

/// Aggregate credit figures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditStats {
    pub total_count: i64,
    pub total_amount: f64,
    pub available_count: i64,
    pub available_amount: f64,
    pub used_count: i64,
    pub used_amount: f64,
    pub expired_count: i64,
    pub revoked_count: i64,
}

/// One issuance batch summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBatch {
    pub batch_id: String,
    pub source: CreditSource,
    pub description: Option<String>,
    pub amount: f64,
    pub min_order_amount: f64,
    pub credit_count: i64,
    pub used_count: i64,
    pub revoked_count: i64,
    pub expires_at: Option<i64>,
    pub created_at: i64,
}
