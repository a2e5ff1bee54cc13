use crate::{Res, config::Config, info, server::AppState, success, warning};

/// Provisions the refresh token into the configured store.
///
/// This is the out-of-band step that makes `/currentTrack` work: the proxy
/// only ever reads the refresh token, it never obtains one itself.
///
/// # Arguments
///
/// * `config` - Loaded configuration; selects the store and client identity
/// * `refresh_token` - Token obtained once through Spotify's authorization flow
pub async fn set_refresh_token(config: Config, refresh_token: String) -> Res<()> {
    let refresh_token = refresh_token.trim();
    if refresh_token.is_empty() {
        return Err("refresh token must not be empty".into());
    }

    if config.store == crate::config::StoreBackend::Memory {
        warning!(
            "KV_BACKEND is memory; the token is lost when this command exits. Use SPOTIFY_REFRESH_TOKEN or a persistent backend."
        );
    }

    let state = AppState::from_config(&config)?;
    state.tokens.store_refresh_token(refresh_token).await?;

    success!(
        "Stored refresh token under '{}'",
        state.tokens.refresh_token_key()
    );
    Ok(())
}

/// Runs one refresh exchange against Spotify and caches the result.
///
/// Useful right after provisioning to verify the client credentials and the
/// refresh token together. The access token itself is never printed.
pub async fn check_refresh_token(config: Config) -> Res<()> {
    let state = AppState::from_config(&config)?;
    if let Some(refresh_token) = &config.spotify_refresh_token {
        state.tokens.store_refresh_token(refresh_token).await?;
    }

    info!("Refreshing access token for '{}'...", state.tokens.client_id());
    state.tokens.refresh().await?;

    success!(
        "Refresh token is valid; access token cached for {} seconds",
        config.access_token_ttl.as_secs()
    );
    Ok(())
}
