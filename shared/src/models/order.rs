//! Order Model (mirrors QuickBooks invoices)

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Sync state of an order against QuickBooks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSyncStatus {
    /// Created locally, never pushed or pulled
    Local,
    Synced,
    Error,
}

impl OrderSyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::Synced => "SYNCED",
            Self::Error => "ERROR",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LOCAL" => Some(Self::Local),
            "SYNCED" => Some(Self::Synced),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    /// QuickBooks Invoice.Id, the re-sync idempotency key
    pub quickbooks_invoice_id: Option<String>,
    /// Invoice DocNumber
    pub order_number: Option<String>,
    /// Total before discount
    pub total_amount: f64,
    /// Amount after discount
    pub final_amount: f64,
    pub discount_percent: Option<f64>,
    pub discount_code: Option<String>,
    pub status: OrderStatus,
    pub sync_status: OrderSyncStatus,
    pub last_synced_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
}
