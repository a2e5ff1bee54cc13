use reqwest::{Client, StatusCode};

use crate::{
    error::ProxyError,
    types::{CurrentlyPlaying, Playback},
};

/// Reads the user's currently playing item.
///
/// Calls `GET {api_url}/me/player/currently-playing` with the access token as
/// a bearer credential.
///
/// # Returns
///
/// - `Playback::NotPlaying` when Spotify answers `204 No Content`
/// - `Playback::Playing` with `is_playing`, `item` and `progress_ms` on any other 2xx
///
/// # Errors
///
/// [`ProxyError::UpstreamFetch`] for transport failures, non-2xx statuses and
/// bodies that are not JSON.
pub async fn currently_playing(
    client: &Client,
    api_url: &str,
    access_token: &str,
) -> Result<Playback, ProxyError> {
    let res = client
        .get(format!("{api_url}/me/player/currently-playing"))
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| ProxyError::UpstreamFetch(e.to_string()))?;

    let status = res.status();
    tracing::debug!(status = status.as_u16(), "currently-playing answered");

    if status == StatusCode::NO_CONTENT {
        return Ok(Playback::NotPlaying);
    }
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(ProxyError::UpstreamFetch(format!("{status}: {body}")));
    }

    let current: CurrentlyPlaying = res
        .json()
        .await
        .map_err(|e| ProxyError::UpstreamFetch(format!("unreadable player response: {e}")))?;

    Ok(Playback::Playing(current))
}
