//! crab-loyalty : loyalty back office server
//!
//! Long-running service that:
//! - Serves the dashboard API (customers, benefits, credits, contact lists)
//! - Connects to QuickBooks Online via OAuth and imports customers/invoices
//! - Receives QuickBooks webhooks for incremental sync

use crab_loyalty::config::Config;
use crab_loyalty::state::AppState;
use crab_loyalty::{BoxError, api, logging};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    logging::init(!config.is_development());

    tracing::info!(
        environment = %config.environment,
        quickbooks = ?config.quickbooks_environment,
        "Starting crab-loyalty"
    );

    let state = AppState::new(&config).await?;

    // Expired OAuth states are dropped lazily on lookup; sweep the rest (every 5 minutes)
    let oauth_states = state.oauth_states.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            let removed = oauth_states.sweep().await;
            if removed > 0 {
                let pending = oauth_states.len().await;
                tracing::debug!(removed, pending, "Swept expired OAuth states");
            }
        }
    });

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("crab-loyalty HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
