//! crab-loyalty : loyalty back office
//!
//! Customers, member discounts, discount codes, points, store credits and
//! contact lists, kept in step with QuickBooks Online through OAuth,
//! on-demand imports and webhooks.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod marketing;
pub mod money;
pub mod quickbooks;
pub mod services;
pub mod state;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
