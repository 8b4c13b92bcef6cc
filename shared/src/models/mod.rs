//! Data models
//!
//! Shared between the back-office service and its API clients.
//! All IDs are `i64` snowflakes, all timestamps Unix millis.
//! JSON field names are camelCase to match the dashboard.

pub mod contact_list;
pub mod credit;
pub mod customer;
pub mod discount;
pub mod order;
pub mod points;
pub mod quickbooks;
pub mod settings;

// Re-exports
pub use contact_list::*;
pub use credit::*;
pub use customer::*;
pub use discount::*;
pub use order::*;
pub use points::*;
pub use quickbooks::*;
pub use settings::*;
