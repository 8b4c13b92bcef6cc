//! Contact List Models

use serde::{Deserialize, Serialize};

use super::customer::CustomerType;

/// Contact list kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactListKind {
    /// Contacts imported by hand
    Manual,
    /// Rebuilt from customers matching a type filter
    Sync,
}

impl ContactListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::Sync => "SYNC",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MANUAL" => Some(Self::Manual),
            "SYNC" => Some(Self::Sync),
            _ => None,
        }
    }
}

/// Contact list entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactList {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub kind: ContactListKind,
    /// Filter for SYNC lists
    pub filter_customer_types: Vec<CustomerType>,
    pub contact_count: i64,
    pub last_synced_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Contact entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub list_id: i64,
    /// Linked customer (always set for SYNC lists)
    pub customer_id: Option<i64>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: i64,
}

/// Contact input for manual lists
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub customer_id: Option<i64>,
}

/// Create contact list payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactListCreate {
    pub name: String,
    pub description: Option<String>,
    pub kind: ContactListKind,
    #[serde(default)]
    pub filter_customer_types: Vec<CustomerType>,
    #[serde(default)]
    pub contacts: Vec<ContactInput>,
}
