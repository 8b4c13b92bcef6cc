//! Business services
//!
//! Multi-step operations over the db layer and the QuickBooks client.
//! Handlers stay thin and call into these.

pub mod connection;
pub mod credits;
pub mod discount_helper;
pub mod issuance;
pub mod rewards;
pub mod sync;
