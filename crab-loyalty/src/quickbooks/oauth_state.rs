//! OAuth `state` parameter store
//!
//! Issued by `GET /quickbooks/auth-url`, consumed once by the callback.
//! Expiry is checked on lookup; `sweep` only bounds memory.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Lifetime of an issued state
pub const STATE_TTL: Duration = Duration::from_secs(15 * 60);

/// Why a callback state was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateRejection {
    /// Never issued, or already consumed
    Unknown,
    Expired,
}

#[derive(Clone)]
pub struct OAuthStateStore {
    /// state -> issued at
    inner: Arc<Mutex<HashMap<String, Instant>>>,
}

impl OAuthStateStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Issue a fresh 32-hex-character state
    pub async fn issue(&self) -> String {
        self.issue_at(Instant::now()).await
    }

    pub async fn issue_at(&self, now: Instant) -> String {
        let state = hex::encode(rand::random::<[u8; 16]>());
        self.inner.lock().await.insert(state.clone(), now);
        state
    }

    /// Consume a state. It is removed whether or not it is still valid.
    pub async fn consume(&self, state: &str) -> Result<(), StateRejection> {
        self.consume_at(state, Instant::now()).await
    }

    pub async fn consume_at(&self, state: &str, now: Instant) -> Result<(), StateRejection> {
        let issued_at = self
            .inner
            .lock()
            .await
            .remove(state)
            .ok_or(StateRejection::Unknown)?;
        if now.saturating_duration_since(issued_at) > STATE_TTL {
            return Err(StateRejection::Expired);
        }
        Ok(())
    }

    /// Drop expired entries, returns how many were removed
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now()).await
    }

    pub async fn sweep_at(&self, now: Instant) -> usize {
        let mut map = self.inner.lock().await;
        let before = map.len();
        map.retain(|_, issued_at| now.saturating_duration_since(*issued_at) <= STATE_TTL);
        before - map.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

impl Default for OAuthStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn state_is_32_hex_chars() {
        let store = OAuthStateStore::new();
        let state = store.issue().await;
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn state_is_single_use() {
        let store = OAuthStateStore::new();
        let state = store.issue().await;
        assert_eq!(store.consume(&state).await, Ok(()));
        assert_eq!(store.consume(&state).await, Err(StateRejection::Unknown));
    }

    #[tokio::test]
    async fn unknown_state_rejected() {
        let store = OAuthStateStore::new();
        assert_eq!(
            store.consume("deadbeefdeadbeefdeadbeefdeadbeef").await,
            Err(StateRejection::Unknown)
        );
    }

    #[tokio::test]
    async fn expired_state_rejected_and_removed() {
        let store = OAuthStateStore::new();
        let issued = Instant::now();
        let state = store.issue_at(issued).await;

        let later = issued + STATE_TTL + Duration::from_secs(1);
        assert_eq!(
            store.consume_at(&state, later).await,
            Err(StateRejection::Expired)
        );
        // Removed even though it failed
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn state_valid_just_before_ttl() {
        let store = OAuthStateStore::new();
        let issued = Instant::now();
        let state = store.issue_at(issued).await;
        let later = issued + STATE_TTL - Duration::from_secs(1);
        assert_eq!(store.consume_at(&state, later).await, Ok(()));
    }

    #[tokio::test]
    async fn sweep_evicts_only_expired() {
        let store = OAuthStateStore::new();
        let t0 = Instant::now();
        store.issue_at(t0).await;
        store.issue_at(t0 + Duration::from_secs(10 * 60)).await;

        let removed = store.sweep_at(t0 + STATE_TTL + Duration::from_secs(1)).await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
    }
}
