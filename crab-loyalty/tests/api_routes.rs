//! Router-level checks for paths that never reach the database.
//! The pool is lazy, so no Postgres is needed.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use base64::Engine;
use crab_loyalty::api::create_router;
use crab_loyalty::config::{Config, QuickBooksEnvironment};
use crab_loyalty::state::AppState;
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use tower::ServiceExt;

const VERIFIER: &str = "test-verifier";

fn config(client_id: &str) -> Config {
    Config {
        database_url: "postgres://localhost/unused".into(),
        http_port: 0,
        environment: "development".into(),
        frontend_url: "http://localhost:3000".into(),
        quickbooks_client_id: client_id.into(),
        quickbooks_client_secret: "secret".into(),
        quickbooks_redirect_uri: "http://localhost:8080/quickbooks/callback".into(),
        quickbooks_environment: QuickBooksEnvironment::Sandbox,
        quickbooks_webhook_verifier_token: VERIFIER.into(),
    }
}

fn app(client_id: &str) -> axum::Router {
    let config = config(client_id);
    let pool = sqlx::PgPool::connect_lazy(&config.database_url).unwrap();
    create_router(AppState::with_pool(pool, &config))
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn sign(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(VERIFIER.as_bytes()).unwrap();
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

#[tokio::test]
async fn webhook_without_signature_is_unauthorized() {
    let resp = app("client")
        .oneshot(
            Request::post("/quickbooks/webhook")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"eventNotifications":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(resp).await;
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn signed_but_unreadable_webhook_is_acknowledged() {
    let payload = b"not json";
    let resp = app("client")
        .oneshot(
            Request::post("/quickbooks/webhook")
                .header("intuit-signature", sign(payload))
                .body(Body::from(payload.as_slice()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn calculate_stacks_discounts() {
    let input = json!({
        "orderAmount": 200.0,
        "memberDiscountPercent": 10.0,
        "promoDiscountPercent": 5.0,
        "redeemPoints": 1000,
        "pointsRedemptionRate": 0.01
    });
    let resp = app("client")
        .oneshot(
            Request::post("/quickbooks/discount-helper/calculate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(input.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["memberDiscount"], 20.0);
    assert_eq!(body["promoDiscount"], 9.0);
    assert_eq!(body["pointsDiscount"], 10.0);
    assert_eq!(body["finalAmount"], 161.0);
}

#[tokio::test]
async fn lookup_rejects_short_queries() {
    let resp = app("client")
        .oneshot(
            Request::get("/quickbooks/discount-helper/lookup?q=a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn auth_url_needs_credentials() {
    let resp = app("")
        .oneshot(
            Request::get("/quickbooks/auth-url")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app("client")
        .oneshot(
            Request::get("/quickbooks/auth-url")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let state = body["state"].as_str().unwrap();
    assert!(body["url"].as_str().unwrap().ends_with(&format!("state={state}")));
}

#[tokio::test]
async fn denied_consent_redirects_with_error() {
    let resp = app("client")
        .oneshot(
            Request::get("/quickbooks/callback?error=access_denied")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()[header::LOCATION],
        "http://localhost:3000/settings/quickbooks?error=access_denied"
    );
}

#[tokio::test]
async fn callback_with_unknown_state_redirects_with_error() {
    let resp = app("client")
        .oneshot(
            Request::get("/quickbooks/callback?code=abc&realmId=9130&state=forged")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("http://localhost:3000/settings/quickbooks?error="));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let resp = app("client")
        .oneshot(
            Request::get("/quickbooks/discount-helper/lookup?q=")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn sync_filter_is_read_from_the_body() {
    for path in ["/quickbooks/sync/orders", "/quickbooks/sync/payments"] {
        let resp = app("client")
            .oneshot(
                Request::post(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"modifiedAfter":"garbage"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{path}");
        let body = json_body(resp).await;
        assert_eq!(body["code"], 2, "{path}");
        assert_eq!(body["details"]["field"], "modifiedAfter", "{path}");
    }
}

#[tokio::test]
async fn sync_filter_falls_back_to_the_query() {
    let resp = app("client")
        .oneshot(
            Request::post("/quickbooks/sync/orders?modifiedAfter=garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["code"], 2);
}
