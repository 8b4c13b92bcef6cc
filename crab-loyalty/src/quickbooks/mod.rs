//! QuickBooks Online integration: REST client, wire types, invoice parsing,
//! webhook verification and the OAuth state store.

pub mod client;
pub mod invoice;
pub mod oauth_state;
pub mod types;
pub mod webhook;

pub use client::{QuickBooksClient, RealmAuth};
pub use oauth_state::{OAuthStateStore, StateRejection};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuickBooksError {
    #[error("QuickBooks request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("QuickBooks API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("QuickBooks token refresh failed: {0}")]
    TokenRefresh(String),
    #[error("Unexpected QuickBooks response: {0}")]
    Decode(String),
}
