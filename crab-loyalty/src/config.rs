//! Back-office server configuration

use crate::BoxError;

/// QuickBooks API environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickBooksEnvironment {
    Sandbox,
    Production,
}

impl QuickBooksEnvironment {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Sandbox
        }
    }

    /// Accounting API base URL
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox-quickbooks.api.intuit.com",
            Self::Production => "https://quickbooks.api.intuit.com",
        }
    }
}

/// Back-office server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Dashboard base URL (OAuth callback redirects land here)
    pub frontend_url: String,
    /// QuickBooks OAuth client id
    pub quickbooks_client_id: String,
    /// QuickBooks OAuth client secret
    pub quickbooks_client_secret: String,
    /// OAuth redirect URI registered with Intuit
    pub quickbooks_redirect_uri: String,
    pub quickbooks_environment: QuickBooksEnvironment,
    /// Webhook verifier token (HMAC key for `intuit-signature`)
    pub quickbooks_webhook_verifier_token: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                String::new()
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: environment.clone(),
            frontend_url: std::env::var("FRONTEND_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            quickbooks_client_id: std::env::var("QUICKBOOKS_CLIENT_ID").unwrap_or_default(),
            quickbooks_client_secret: Self::require_secret(
                "QUICKBOOKS_CLIENT_SECRET",
                &environment,
            )?,
            quickbooks_redirect_uri: std::env::var("QUICKBOOKS_REDIRECT_URI").unwrap_or_default(),
            quickbooks_environment: QuickBooksEnvironment::parse(
                &std::env::var("QUICKBOOKS_ENVIRONMENT").unwrap_or_else(|_| "sandbox".into()),
            ),
            quickbooks_webhook_verifier_token: Self::require_secret(
                "QUICKBOOKS_WEBHOOK_VERIFIER_TOKEN",
                &environment,
            )?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_defaults_to_sandbox() {
        assert_eq!(
            QuickBooksEnvironment::parse("production"),
            QuickBooksEnvironment::Production
        );
        assert_eq!(
            QuickBooksEnvironment::parse("PRODUCTION"),
            QuickBooksEnvironment::Production
        );
        assert_eq!(
            QuickBooksEnvironment::parse("sandbox"),
            QuickBooksEnvironment::Sandbox
        );
        assert_eq!(
            QuickBooksEnvironment::parse("staging"),
            QuickBooksEnvironment::Sandbox
        );
    }

    #[test]
    fn api_base_url_by_environment() {
        assert_eq!(
            QuickBooksEnvironment::Sandbox.api_base_url(),
            "https://sandbox-quickbooks.api.intuit.com"
        );
        assert_eq!(
            QuickBooksEnvironment::Production.api_base_url(),
            "https://quickbooks.api.intuit.com"
        );
    }

    #[test]
    fn secrets_optional_only_in_development() {
        let name = "CRAB_LOYALTY_TEST_SECRET_NEVER_SET";
        assert_eq!(Config::require_secret(name, "development").unwrap(), "");
        assert!(Config::require_secret(name, "production").is_err());
    }
}
