use axum::{Json, extract::State};

use crate::{error::ProxyError, server::AppState, types::TrackSnapshot};

/// `GET /currentTrack`
///
/// Gets an access token (cached, or refreshed on a miss), asks Spotify what
/// is playing and answers with the three fields the front-end uses. Nothing
/// playing is a normal `200 { "isPlaying": false }`.
pub async fn current_track(
    State(state): State<AppState>,
) -> Result<Json<TrackSnapshot>, ProxyError> {
    let access_token = state.tokens.get_valid_token().await?;
    let playback = state.spotify.currently_playing(&access_token).await?;

    Ok(Json(TrackSnapshot::from(playback)))
}
