//! Application state for crab-loyalty

use sqlx::PgPool;

use crate::BoxError;
use crate::config::Config;
use crate::quickbooks::{OAuthStateStore, QuickBooksClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Stateless QuickBooks REST client (credentials only)
    pub quickbooks: QuickBooksClient,
    /// Pending OAuth `state` values
    pub oauth_states: OAuthStateStore,
    /// HMAC key for webhook signatures
    pub webhook_verifier_token: String,
    /// Dashboard base URL, no trailing slash
    pub frontend_url: String,
}

impl AppState {
    /// Connect, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::with_pool(pool, config))
    }

    /// Build the state around an existing pool
    pub fn with_pool(pool: PgPool, config: &Config) -> Self {
        let quickbooks = QuickBooksClient::from_config(config);
        if !quickbooks.is_configured() {
            tracing::warn!("QuickBooks credentials incomplete, connect flow is disabled");
        }
        Self {
            pool,
            quickbooks,
            oauth_states: OAuthStateStore::new(),
            webhook_verifier_token: config.quickbooks_webhook_verifier_token.clone(),
            frontend_url: config.frontend_url.clone(),
        }
    }
}
