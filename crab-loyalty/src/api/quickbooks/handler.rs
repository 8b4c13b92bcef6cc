//! Connection and sync handlers

use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use shared::models::{ConnectionStatus, SyncLog, SyncResult};

use super::super::{ApiResult, MessageResponse};
use crate::db;
use crate::services::connection::{self, AuthorizationUrl};
use crate::services::sync;
use crate::state::AppState;

/// GET /quickbooks/auth-url
pub async fn auth_url(State(state): State<AppState>) -> ApiResult<AuthorizationUrl> {
    Ok(Json(connection::authorization_url(&state).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub realm_id: Option<String>,
    pub state: Option<String>,
    /// Set by Intuit when the user denies consent
    pub error: Option<String>,
}

fn settings_redirect(frontend_url: &str, outcome: Result<(), String>) -> Redirect {
    let query = match outcome {
        Ok(()) => "success=true".to_string(),
        Err(message) => format!("error={}", urlencoding::encode(&message)),
    };
    Redirect::to(&format!("{frontend_url}/settings/quickbooks?{query}"))
}

/// GET /quickbooks/callback: always redirects back to the dashboard
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    if let Some(error) = query.error {
        tracing::warn!(error = %error, "QuickBooks authorization denied");
        return settings_redirect(&state.frontend_url, Err(error));
    }
    let (Some(code), Some(realm_id), Some(oauth_state)) = (query.code, query.realm_id, query.state)
    else {
        return settings_redirect(
            &state.frontend_url,
            Err("Missing code, realmId or state".into()),
        );
    };

    match connection::handle_callback(&state, &code, &realm_id, &oauth_state).await {
        Ok(_) => settings_redirect(&state.frontend_url, Ok(())),
        Err(e) => {
            tracing::warn!(realm_id = %realm_id, error = %e, "QuickBooks callback failed");
            let app_error: shared::error::AppError = e.into();
            settings_redirect(&state.frontend_url, Err(app_error.message))
        }
    }
}

/// GET /quickbooks/status
pub async fn status(State(state): State<AppState>) -> Json<ConnectionStatus> {
    Json(connection::status(&state).await)
}

/// POST /quickbooks/disconnect
pub async fn disconnect(State(state): State<AppState>) -> ApiResult<MessageResponse> {
    connection::disconnect(&state).await?;
    Ok(MessageResponse::new("QuickBooks disconnected"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub message: String,
    pub token_expires_at: i64,
}

/// POST /quickbooks/refresh-token
pub async fn refresh_token(State(state): State<AppState>) -> ApiResult<RefreshResponse> {
    let conn = connection::force_refresh(&state).await?;
    Ok(Json(RefreshResponse {
        message: "Token refreshed".into(),
        token_expires_at: conn.token_expires_at,
    }))
}

/// POST /quickbooks/sync/customers
pub async fn sync_customers(State(state): State<AppState>) -> ApiResult<SyncResult> {
    Ok(Json(sync::sync_customers(&state).await?))
}

/// `modifiedAfter` filter, accepted as a JSON body or a query parameter
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub modified_after: Option<String>,
}

/// Body value wins; the query string is the fallback
fn modified_after(query: SyncRequest, body: Option<Json<SyncRequest>>) -> Option<String> {
    body.and_then(|Json(b)| b.modified_after)
        .or(query.modified_after)
}

/// POST /quickbooks/sync/orders {modifiedAfter?}
pub async fn sync_orders(
    State(state): State<AppState>,
    Query(query): Query<SyncRequest>,
    body: Option<Json<SyncRequest>>,
) -> ApiResult<SyncResult> {
    let filter = modified_after(query, body);
    Ok(Json(sync::sync_orders(&state, filter.as_deref()).await?))
}

/// POST /quickbooks/sync/payments {modifiedAfter?}
pub async fn sync_payments(
    State(state): State<AppState>,
    Query(query): Query<SyncRequest>,
    body: Option<Json<SyncRequest>>,
) -> ApiResult<SyncResult> {
    let filter = modified_after(query, body);
    Ok(Json(sync::sync_payments(&state, filter.as_deref()).await?))
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<i64>,
}

/// GET /quickbooks/sync-logs
pub async fn sync_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Vec<SyncLog>> {
    let logs = db::sync_logs::list(&state.pool, query.limit.unwrap_or(50)).await?;
    Ok(Json(logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn location(redirect: Redirect) -> String {
        let resp = redirect.into_response();
        resp.headers()[http::header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn callback_redirects_encode_errors() {
        assert_eq!(
            location(settings_redirect("http://localhost:3000", Ok(()))),
            "http://localhost:3000/settings/quickbooks?success=true"
        );
        assert_eq!(
            location(settings_redirect(
                "http://localhost:3000",
                Err("OAuth state has expired".into())
            )),
            "http://localhost:3000/settings/quickbooks?error=OAuth%20state%20has%20expired"
        );
    }

    fn request(value: Option<&str>) -> SyncRequest {
        SyncRequest {
            modified_after: value.map(String::from),
        }
    }

    #[test]
    fn body_filter_wins_over_query() {
        assert_eq!(
            modified_after(request(Some("2024-01-01")), Some(Json(request(Some("2024-05-01"))))),
            Some("2024-05-01".to_string())
        );
        assert_eq!(
            modified_after(request(Some("2024-01-01")), Some(Json(request(None)))),
            Some("2024-01-01".to_string())
        );
        assert_eq!(modified_after(request(None), None), None);
    }
}
