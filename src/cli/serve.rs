use tracing_subscriber::EnvFilter;

use crate::{
    Res,
    config::{Config, StoreBackend},
    info,
    server::{AppState, start_api_server},
    success, warning,
};

/// Starts the proxy.
///
/// Installs the `tracing` subscriber (filter from `RUST_LOG`, default
/// `info`), wires the application state, seeds `SPOTIFY_REFRESH_TOKEN` into
/// the token store when it is set, then serves until interrupted.
///
/// # Errors
///
/// Fails when the refresh token cannot be written to the store, the address
/// cannot be parsed or bound, or the server stops with an I/O error.
pub async fn serve(config: Config) -> Res<()> {
    init_tracing();

    let state = AppState::from_config(&config)?;

    match &config.spotify_refresh_token {
        Some(refresh_token) => {
            state.tokens.store_refresh_token(refresh_token).await?;
            success!(
                "Seeded refresh token for '{}' from the environment",
                state.tokens.client_id()
            );
        }
        None if config.store == StoreBackend::Memory => warning!(
            "SPOTIFY_REFRESH_TOKEN is not set and the memory store starts empty; /currentTrack will fail until a refresh token is provisioned"
        ),
        None => {}
    }

    info!("Listening on http://{}", config.server_addr);
    start_api_server(&config, state).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
