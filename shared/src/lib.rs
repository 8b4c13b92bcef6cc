//! Shared types for the Crab loyalty back office
//!
//! Error codes, response structures, domain models and small utilities
//! used by the service and by API clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
