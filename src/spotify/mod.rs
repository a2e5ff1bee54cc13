//! # Spotify Integration Module
//!
//! The two Spotify endpoints the proxy talks to, behind the [`SpotifyApi`]
//! trait so the request pipeline can be exercised without the network.
//!
//! ```text
//! Request pipeline
//!          ↓
//! TokenManager ──→ SpotifyApi::refresh_access_token ──→ POST accounts.spotify.com/api/token
//!          ↓
//! current_track ─→ SpotifyApi::currently_playing ────→ GET  api.spotify.com/v1/me/player/currently-playing
//! ```
//!
//! ## Authentication
//!
//! [`auth`] performs the refresh-token grant. The client identifies itself
//! with HTTP Basic auth built from the client id and client secret, which is
//! the confidential-client variant of the flow (no PKCE here, the secret
//! stays on the server).
//!
//! ## Player
//!
//! [`player`] reads the currently playing item with a bearer access token.
//! A `204 No Content` is a regular answer meaning nothing is playing.
//!
//! ## Error Types
//!
//! Both calls report failures as [`ProxyError`]: `UpstreamAuth` for the
//! token endpoint, `UpstreamFetch` for the player endpoint. There are no
//! retries. The shared `reqwest::Client` bounds each call by
//! `UPSTREAM_TIMEOUT_SECS`.

pub mod auth;
pub mod player;

use async_trait::async_trait;
use reqwest::Client;

use crate::{config::Config, error::ProxyError, types::Playback};

#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Exchanges a refresh token for a new access token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ProxyError>;

    /// Asks what the user is currently playing.
    async fn currently_playing(&self, access_token: &str) -> Result<Playback, ProxyError>;
}

/// [`SpotifyApi`] over HTTPS.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(client: Client, config: &Config) -> Self {
        SpotifyClient {
            client,
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
            token_url: config.spotify_apitoken_url.clone(),
            api_url: config.spotify_apiurl.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ProxyError> {
        auth::refresh_token(
            &self.client,
            &self.token_url,
            &self.client_id,
            &self.client_secret,
            refresh_token,
        )
        .await
    }

    async fn currently_playing(&self, access_token: &str) -> Result<Playback, ProxyError> {
        player::currently_playing(&self.client, &self.api_url, access_token).await
    }
}
