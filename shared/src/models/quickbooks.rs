//! QuickBooks integration models (sync audit and API payloads)

use serde::{Deserialize, Serialize};

/// Entity a sync batch worked on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncEntity {
    Customer,
    Invoice,
    Payment,
    Webhook,
}

impl SyncEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Invoice => "INVOICE",
            Self::Payment => "PAYMENT",
            Self::Webhook => "WEBHOOK",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CUSTOMER" => Some(Self::Customer),
            "INVOICE" => Some(Self::Invoice),
            "PAYMENT" => Some(Self::Payment),
            "WEBHOOK" => Some(Self::Webhook),
            _ => None,
        }
    }
}

/// Outcome of a sync batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncLogStatus {
    Success,
    /// Some items failed
    Partial,
    /// Batch aborted
    Failed,
}

impl SyncLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Partial => "PARTIAL",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SUCCESS" => Some(Self::Success),
            "PARTIAL" => Some(Self::Partial),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Status for a batch that ran to completion
    pub fn from_counts(synced: usize, failed: usize) -> Self {
        match (synced, failed) {
            (_, 0) => Self::Success,
            (0, _) => Self::Failed,
            _ => Self::Partial,
        }
    }
}

/// Sync audit row (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLog {
    pub id: i64,
    pub entity: SyncEntity,
    /// IMPORT (manual trigger) or WEBHOOK
    pub action: String,
    pub status: SyncLogStatus,
    pub error_message: Option<String>,
    pub record_count: i64,
    pub created_at: i64,
}

/// Local counters shown next to the connection status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub linked_customers: i64,
    pub synced_orders: i64,
    pub last_sync_at: Option<i64>,
}

/// `GET /quickbooks/status`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SyncStats>,
}

impl ConnectionStatus {
    pub fn disconnected() -> Self {
        Self::default()
    }
}

/// Result of a sync trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    pub message: String,
    pub synced_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl SyncResult {
    /// Build a result from a finished batch; `errors` is omitted when empty
    pub fn from_batch(entity: &str, synced_count: usize, errors: Vec<String>) -> Self {
        let message = if errors.is_empty() {
            format!("Synced {synced_count} {entity}")
        } else {
            format!(
                "Synced {synced_count} {entity} with {} error(s)",
                errors.len()
            )
        };
        Self {
            success: true,
            message,
            synced_count,
            errors: (!errors.is_empty()).then_some(errors),
        }
    }
}
