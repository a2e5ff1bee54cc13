use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    error::ProxyError,
    spotify::SpotifyApi,
    store::{KvStore, StoreError},
};

/// Access-token cache with refresh on miss, for one fixed client identity.
///
/// The access token lives in the store under `access_token:<client_id>` with a
/// time-to-live a bit shorter than Spotify's real lifetime, so a cache hit is
/// always still valid upstream. The refresh token lives under
/// `refresh:<client_id>`; it is provisioned out-of-band and only read here.
///
/// Refreshes are single-flight within this process: concurrent cache misses
/// queue on `refresh_lock`, and whoever enters after the first refresh finds
/// the new token in the cache. Separate processes sharing one store can
/// still refresh concurrently; the last write wins.
pub struct TokenManager {
    store: Arc<dyn KvStore>,
    spotify: Arc<dyn SpotifyApi>,
    client_id: String,
    ttl: Duration,
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        store: Arc<dyn KvStore>,
        spotify: Arc<dyn SpotifyApi>,
        client_id: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        TokenManager {
            store,
            spotify,
            client_id: client_id.into(),
            ttl,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn access_token_key(&self) -> String {
        format!("access_token:{}", self.client_id)
    }

    pub fn refresh_token_key(&self) -> String {
        format!("refresh:{}", self.client_id)
    }

    /// Returns a usable access token, refreshing it when the cache has none.
    pub async fn get_valid_token(&self) -> Result<String, ProxyError> {
        if let Some(token) = self.cached_access_token().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // another request may have refreshed while we waited
        if let Some(token) = self.cached_access_token().await {
            return Ok(token);
        }

        tracing::info!(client_id = %self.client_id, "access token cache miss, refreshing");
        self.refresh().await
    }

    /// Cached access token, if any. Store failures read as a miss.
    pub async fn cached_access_token(&self) -> Option<String> {
        self.read(&self.access_token_key()).await
    }

    /// Refresh token on record, if any. Store failures read as absent.
    pub async fn stored_refresh_token(&self) -> Option<String> {
        self.read(&self.refresh_token_key()).await
    }

    pub async fn store_access_token(&self, token: &str, ttl: Duration) -> Result<(), StoreError> {
        self.store
            .put(&self.access_token_key(), token, Some(ttl))
            .await
    }

    /// Records the refresh token. It never expires on our side.
    pub async fn store_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.put(&self.refresh_token_key(), token, None).await
    }

    /// Mints a new access token from the stored refresh token and caches it.
    ///
    /// # Errors
    ///
    /// - [`ProxyError::MissingRefreshToken`] when no refresh token is on record
    /// - [`ProxyError::UpstreamAuth`] when the token endpoint refuses the exchange
    ///
    /// A failure to cache the new token is only logged; the token is still
    /// returned so the current request can proceed.
    pub async fn refresh(&self) -> Result<String, ProxyError> {
        let Some(refresh_token) = self.stored_refresh_token().await else {
            return Err(ProxyError::MissingRefreshToken {
                client_id: self.client_id.clone(),
            });
        };

        let access_token = self.spotify.refresh_access_token(&refresh_token).await?;

        if let Err(e) = self.store_access_token(&access_token, self.ttl).await {
            tracing::warn!(client_id = %self.client_id, error = %e, "failed to cache access token");
        } else {
            tracing::debug!(
                client_id = %self.client_id,
                ttl_secs = self.ttl.as_secs(),
                "cached fresh access token"
            );
        }

        Ok(access_token)
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "token store read failed, treating as miss");
                None
            }
        }
    }
}
