//! QuickBooks webhook
//!
//! POST /quickbooks/webhook takes the raw body for HMAC verification. A bad or
//! missing signature rejects the whole payload; after that the response is
//! always 200 so Intuit does not redeliver.

use axum::{body::Bytes, extract::State, http::HeaderMap};
use shared::error::{AppError, ErrorCode};

use super::super::{ApiResult, MessageResponse};
use crate::quickbooks::webhook::{SIGNATURE_HEADER, WebhookPayload, verify_webhook_signature};
use crate::services::sync;
use crate::state::AppState;

pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<MessageResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if let Err(reason) = verify_webhook_signature(&body, signature, &state.webhook_verifier_token) {
        tracing::warn!(reason, "Webhook signature verification failed");
        return Err(AppError::new(ErrorCode::WebhookSignatureInvalid).into());
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable webhook payload, ignored");
            return Ok(MessageResponse::new("Webhook received"));
        }
    };

    let tally = sync::handle_webhook(&state, &payload).await;
    tracing::info!(
        processed = tally.synced,
        failed = tally.errors.len(),
        "Webhook processed"
    );
    Ok(MessageResponse::new("Webhook processed"))
}
