use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Router, middleware, routing::get};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    Res, api,
    config::{AllowedOrigins, Config},
    management::TokenManager,
    spotify::{SpotifyApi, SpotifyClient},
    store,
};

/// Everything a request handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenManager>,
    pub spotify: Arc<dyn SpotifyApi>,
    pub shared_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenManager>,
        spotify: Arc<dyn SpotifyApi>,
        shared_secret: impl Into<Arc<str>>,
    ) -> Self {
        AppState {
            tokens,
            spotify,
            shared_secret: shared_secret.into(),
        }
    }

    /// Wires the store, the Spotify client and the token manager from the
    /// configuration. All outbound HTTP goes through one client.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let http = http_client(config)?;
        let spotify: Arc<dyn SpotifyApi> = Arc::new(SpotifyClient::new(http.clone(), config));
        let kv = store::open(&config.store, http);
        let tokens = Arc::new(TokenManager::new(
            kv,
            Arc::clone(&spotify),
            config.spotify_client_id.clone(),
            config.access_token_ttl,
        ));

        Ok(AppState::new(
            tokens,
            spotify,
            config.shared_secret.as_str(),
        ))
    }
}

/// Outbound HTTP client. Every request is bounded by `UPSTREAM_TIMEOUT_SECS`,
/// so a stalled token endpoint cannot hold the refresh lock indefinitely.
pub fn http_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .connect_timeout(config.upstream_timeout)
        .build()
}

/// Builds the router with its middleware stack.
///
/// Layers, outermost first: CORS, request tracing, panic catcher, shared
/// secret gate. CORS sits outside the gate so preflights are answered
/// without credentials and rejections still carry CORS headers.
///
/// Only GET is served. axum would otherwise answer HEAD with the GET
/// handler, so HEAD is routed to the 404 responder explicitly.
pub fn app(state: AppState, origins: &AllowedOrigins) -> Router {
    Router::new()
        .route(
            "/currentTrack",
            get(api::current_track)
                .head(api::not_found)
                .fallback(api::not_found),
        )
        .route(
            "/health",
            get(api::health).head(api::not_found).fallback(api::not_found),
        )
        .fallback(api::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_shared_secret,
        ))
        .layer(CatchPanicLayer::custom(api::panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(api::cors_layer(origins))
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn start_api_server(config: &Config, state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(&config.server_addr)
        .map_err(|e| format!("Failed to parse server address '{}': {}", config.server_addr, e))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app(state, &config.allowed_origins))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
