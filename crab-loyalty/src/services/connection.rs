//! QuickBooks connection lifecycle: OAuth handshake, token refresh, status

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{ConnectionStatus, SyncStats};

use crate::db::{self, connections::QuickBooksConnection, connections::StoredTokens};
use crate::error::ServiceResult;
use crate::quickbooks::types::TokenResponse;
use crate::quickbooks::{RealmAuth, StateRejection};
use crate::state::AppState;

/// Tokens closer than this to expiry are refreshed before use
pub const REFRESH_THRESHOLD_MILLIS: i64 = 10 * 60 * 1000;

#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationUrl {
    pub url: String,
    pub state: String,
}

pub fn needs_refresh(token_expires_at: i64, now: i64) -> bool {
    token_expires_at - now <= REFRESH_THRESHOLD_MILLIS
}

/// Absolute expiry instants for a token response
pub fn stored_tokens(resp: TokenResponse, now: i64) -> StoredTokens {
    StoredTokens {
        token_expires_at: now + resp.expires_in * 1000,
        refresh_token_expires_at: resp.x_refresh_token_expires_in.map(|s| now + s * 1000),
        access_token: resp.access_token,
        refresh_token: resp.refresh_token,
    }
}

fn realm_auth(conn: &QuickBooksConnection) -> RealmAuth {
    RealmAuth {
        access_token: conn.access_token.clone(),
        realm_id: conn.realm_id.clone(),
    }
}

fn require_configured(state: &AppState) -> ServiceResult<()> {
    if state.quickbooks.is_configured() {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::QuickBooksNotConfigured).into())
    }
}

async fn active_connection(state: &AppState) -> ServiceResult<QuickBooksConnection> {
    db::connections::find_active(&state.pool)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::QuickBooksNotConnected).into())
}

/// Issue a single-use OAuth state and build the consent URL
pub async fn authorization_url(state: &AppState) -> ServiceResult<AuthorizationUrl> {
    require_configured(state)?;
    let oauth_state = state.oauth_states.issue().await;
    Ok(AuthorizationUrl {
        url: state.quickbooks.authorization_url(&oauth_state),
        state: oauth_state,
    })
}

/// Complete the OAuth handshake and store the connection as the active one
pub async fn handle_callback(
    state: &AppState,
    code: &str,
    realm_id: &str,
    oauth_state: &str,
) -> ServiceResult<QuickBooksConnection> {
    state
        .oauth_states
        .consume(oauth_state)
        .await
        .map_err(|rejection| match rejection {
            StateRejection::Unknown => AppError::new(ErrorCode::OAuthStateInvalid),
            StateRejection::Expired => AppError::new(ErrorCode::OAuthStateExpired),
        })?;
    require_configured(state)?;

    let now = shared::util::now_millis();
    let tokens = stored_tokens(state.quickbooks.exchange_code(code).await?, now);

    let auth = RealmAuth {
        access_token: tokens.access_token.clone(),
        realm_id: realm_id.to_string(),
    };
    let company_name = match state.quickbooks.company_name(&auth).await {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(realm_id, error = %e, "Could not read company info");
            None
        }
    };

    let conn = db::connections::upsert_active(
        &state.pool,
        realm_id,
        &tokens,
        company_name.as_deref(),
        now,
    )
    .await?;
    tracing::info!(realm_id, company = ?conn.company_name, "QuickBooks connected");
    Ok(conn)
}

async fn refresh(state: &AppState, conn: &QuickBooksConnection) -> ServiceResult<QuickBooksConnection> {
    let now = shared::util::now_millis();
    let resp = state.quickbooks.refresh(&conn.refresh_token).await?;
    let updated =
        db::connections::update_tokens(&state.pool, conn.id, &stored_tokens(resp, now), now)
            .await?;
    tracing::info!(realm_id = %updated.realm_id, "QuickBooks token refreshed");
    Ok(updated)
}

/// Credentials for the active connection, refreshed when close to expiry
pub async fn refresh_token_if_needed(state: &AppState) -> ServiceResult<RealmAuth> {
    let conn = active_connection(state).await?;
    if !needs_refresh(conn.token_expires_at, shared::util::now_millis()) {
        return Ok(realm_auth(&conn));
    }
    let conn = refresh(state, &conn).await?;
    Ok(realm_auth(&conn))
}

/// Refresh regardless of expiry
pub async fn force_refresh(state: &AppState) -> ServiceResult<QuickBooksConnection> {
    let conn = active_connection(state).await?;
    refresh(state, &conn).await
}

async fn load_status(state: &AppState) -> ServiceResult<ConnectionStatus> {
    let Some(conn) = db::connections::find_active(&state.pool).await? else {
        return Ok(ConnectionStatus::disconnected());
    };
    let stats = SyncStats {
        linked_customers: db::customers::count_linked(&state.pool).await?,
        synced_orders: db::orders::count_synced(&state.pool).await?,
        last_sync_at: db::sync_logs::last_sync_at(&state.pool).await?,
    };
    Ok(ConnectionStatus {
        connected: true,
        realm_id: Some(conn.realm_id),
        company_name: conn.company_name,
        token_expires_at: Some(conn.token_expires_at),
        stats: Some(stats),
    })
}

/// Connection status; any failure reads as disconnected
pub async fn status(state: &AppState) -> ConnectionStatus {
    match load_status(state).await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load QuickBooks status");
            ConnectionStatus::disconnected()
        }
    }
}

/// Revoke (best effort) and deactivate the active connection
pub async fn disconnect(state: &AppState) -> ServiceResult<()> {
    let conn = active_connection(state).await?;
    if let Err(e) = state.quickbooks.revoke(&conn.refresh_token).await {
        tracing::warn!(realm_id = %conn.realm_id, error = %e, "Token revoke failed, disconnecting anyway");
    }
    db::connections::deactivate(&state.pool, conn.id, shared::util::now_millis()).await?;
    tracing::info!(realm_id = %conn.realm_id, "QuickBooks disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn refresh_window_is_ten_minutes() {
        assert!(!needs_refresh(NOW + 60 * 60 * 1000, NOW));
        assert!(!needs_refresh(NOW + REFRESH_THRESHOLD_MILLIS + 1, NOW));
        assert!(needs_refresh(NOW + REFRESH_THRESHOLD_MILLIS, NOW));
        assert!(needs_refresh(NOW - 1, NOW));
    }

    #[test]
    fn token_expiry_is_absolute_millis() {
        let tokens = stored_tokens(
            TokenResponse {
                access_token: "at".into(),
                refresh_token: "rt".into(),
                expires_in: 3600,
                x_refresh_token_expires_in: Some(8_726_400),
            },
            NOW,
        );
        assert_eq!(tokens.token_expires_at, NOW + 3_600_000);
        assert_eq!(tokens.refresh_token_expires_at, Some(NOW + 8_726_400_000));
        assert_eq!(tokens.access_token, "at");
    }
}
