//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "crab_loyalty=info,tower_http=info";

/// Human-readable output in development, JSON lines elsewhere.
/// `RUST_LOG` overrides the default filter.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().with_current_span(false).init();
    } else {
        builder.init();
    }
}
