//! QuickBooks Online client via REST API (no SDK dependency)
//!
//! Stateless: every call builds its own `reqwest::Client` and takes the
//! access token and realm explicitly. Token freshness is the caller's job.

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::QuickBooksError;
use super::types::{QbCustomer, QbInvoice, QbPayment, TokenResponse};
use crate::config::{Config, QuickBooksEnvironment};

const AUTHORIZE_URL: &str = "https://appcenter.intuit.com/connect/oauth2";
const TOKEN_URL: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";
const REVOKE_URL: &str = "https://developer.api.intuit.com/v2/oauth2/tokens/revoke";
const ACCOUNTING_SCOPE: &str = "com.intuit.quickbooks.accounting";
const MINOR_VERSION: &str = "65";

/// Maximum page size the query API accepts
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Access token plus the company it is valid for
#[derive(Debug, Clone)]
pub struct RealmAuth {
    pub access_token: String,
    pub realm_id: String,
}

#[derive(Debug, Clone)]
pub struct QuickBooksClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    environment: QuickBooksEnvironment,
}

impl QuickBooksClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        environment: QuickBooksEnvironment,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            environment,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.quickbooks_client_id,
            &config.quickbooks_client_secret,
            &config.quickbooks_redirect_uri,
            config.quickbooks_environment,
        )
    }

    /// Client id, secret and redirect URI are all present
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.redirect_uri.is_empty()
    }

    /// Intuit consent page URL for the given state
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?client_id={}&response_type=code&scope={}&redirect_uri={}&state={}",
            urlencoding::encode(&self.client_id),
            urlencoding::encode(ACCOUNTING_SCOPE),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(state),
        )
    }

    // ── OAuth ──

    /// Exchange an authorization code for a token pair
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, QuickBooksError> {
        let resp = reqwest::Client::new()
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;
        let body = read_json(resp).await?;
        decode(body)
    }

    /// Trade a refresh token for a new token pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, QuickBooksError> {
        let resp = reqwest::Client::new()
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(QuickBooksError::TokenRefresh(format!("{status}: {body}")));
        }
        Ok(resp.json().await?)
    }

    /// Revoke a token (refresh or access)
    pub async fn revoke(&self, token: &str) -> Result<(), QuickBooksError> {
        let resp = reqwest::Client::new()
            .post(REVOKE_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(QuickBooksError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    // ── Accounting API ──

    fn company_url(&self, realm_id: &str, path: &str) -> String {
        format!(
            "{}/v3/company/{realm_id}/{path}",
            self.environment.api_base_url()
        )
    }

    async fn get(&self, auth: &RealmAuth, path: &str) -> Result<Value, QuickBooksError> {
        let resp = reqwest::Client::new()
            .get(self.company_url(&auth.realm_id, path))
            .bearer_auth(&auth.access_token)
            .header(ACCEPT, "application/json")
            .query(&[("minorversion", MINOR_VERSION)])
            .send()
            .await?;
        read_json(resp).await
    }

    async fn query<T: DeserializeOwned>(
        &self,
        auth: &RealmAuth,
        entity: &str,
        statement: String,
    ) -> Result<Vec<T>, QuickBooksError> {
        let resp = reqwest::Client::new()
            .get(self.company_url(&auth.realm_id, "query"))
            .bearer_auth(&auth.access_token)
            .header(ACCEPT, "application/json")
            .query(&[("query", statement.as_str()), ("minorversion", MINOR_VERSION)])
            .send()
            .await?;
        let body = read_json(resp).await?;
        match body.get("QueryResponse").and_then(|q| q.get(entity)) {
            Some(rows) => decode(rows.clone()),
            None => Ok(Vec::new()),
        }
    }

    /// `CompanyInfo.CompanyName`
    pub async fn company_name(&self, auth: &RealmAuth) -> Result<Option<String>, QuickBooksError> {
        let body = self
            .get(auth, &format!("companyinfo/{}", auth.realm_id))
            .await?;
        Ok(body["CompanyInfo"]["CompanyName"].as_str().map(String::from))
    }

    /// One page of customers (`start` is 1-based)
    pub async fn query_customers(
        &self,
        auth: &RealmAuth,
        start: u32,
        max: u32,
    ) -> Result<Vec<QbCustomer>, QuickBooksError> {
        self.query(auth, "Customer", build_query("Customer", start, max, None))
            .await
    }

    /// One page of invoices, optionally only those updated after an RFC 3339 instant
    pub async fn query_invoices(
        &self,
        auth: &RealmAuth,
        start: u32,
        max: u32,
        modified_after: Option<&str>,
    ) -> Result<Vec<QbInvoice>, QuickBooksError> {
        self.query(
            auth,
            "Invoice",
            build_query("Invoice", start, max, modified_after),
        )
        .await
    }

    /// One page of payments, optionally only those updated after an RFC 3339 instant
    pub async fn query_payments(
        &self,
        auth: &RealmAuth,
        start: u32,
        max: u32,
        modified_after: Option<&str>,
    ) -> Result<Vec<QbPayment>, QuickBooksError> {
        self.query(
            auth,
            "Payment",
            build_query("Payment", start, max, modified_after),
        )
        .await
    }

    pub async fn get_customer(
        &self,
        auth: &RealmAuth,
        id: &str,
    ) -> Result<QbCustomer, QuickBooksError> {
        let mut body = self.get(auth, &format!("customer/{id}")).await?;
        decode(body["Customer"].take())
    }

    pub async fn get_invoice(&self, auth: &RealmAuth, id: &str) -> Result<QbInvoice, QuickBooksError> {
        let mut body = self.get(auth, &format!("invoice/{id}")).await?;
        decode(body["Invoice"].take())
    }

    pub async fn get_payment(&self, auth: &RealmAuth, id: &str) -> Result<QbPayment, QuickBooksError> {
        let mut body = self.get(auth, &format!("payment/{id}")).await?;
        decode(body["Payment"].take())
    }
}

/// Build a query-language statement for one page
pub fn build_query(entity: &str, start: u32, max: u32, modified_after: Option<&str>) -> String {
    let filter = modified_after
        .map(|ts| format!(" WHERE MetaData.LastUpdatedTime > '{ts}'"))
        .unwrap_or_default();
    format!(
        "SELECT * FROM {entity}{filter} STARTPOSITION {} MAXRESULTS {}",
        start.max(1),
        max.clamp(1, MAX_PAGE_SIZE)
    )
}

async fn read_json(resp: reqwest::Response) -> Result<Value, QuickBooksError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(QuickBooksError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json().await?)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, QuickBooksError> {
    serde_json::from_value(value).map_err(|e| QuickBooksError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> QuickBooksClient {
        QuickBooksClient::new(
            "client-id",
            "secret",
            "http://localhost:8080/quickbooks/callback",
            QuickBooksEnvironment::Sandbox,
        )
    }

    #[test]
    fn configured_requires_all_three() {
        assert!(client().is_configured());
        let missing = QuickBooksClient::new("id", "", "uri", QuickBooksEnvironment::Sandbox);
        assert!(!missing.is_configured());
    }

    #[test]
    fn authorization_url_encodes_params() {
        let url = client().authorization_url("abc123");
        assert!(url.starts_with("https://appcenter.intuit.com/connect/oauth2?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=com.intuit.quickbooks.accounting"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fquickbooks%2Fcallback"
        ));
        assert!(url.ends_with("state=abc123"));
    }

    #[test]
    fn query_statements() {
        assert_eq!(
            build_query("Customer", 101, 100, None),
            "SELECT * FROM Customer STARTPOSITION 101 MAXRESULTS 100"
        );
        assert_eq!(
            build_query("Invoice", 0, 5000, Some("2024-05-01T00:00:00+00:00")),
            "SELECT * FROM Invoice WHERE MetaData.LastUpdatedTime > '2024-05-01T00:00:00+00:00' \
             STARTPOSITION 1 MAXRESULTS 1000"
        );
    }

    #[test]
    fn company_urls_follow_environment() {
        assert_eq!(
            client().company_url("9130", "query"),
            "https://sandbox-quickbooks.api.intuit.com/v3/company/9130/query"
        );
    }
}
