use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the token endpoint's answer to a refresh grant.
///
/// Only `access_token` is read. It is optional so that a response without
/// it is reported as an upstream error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
}

/// The parts of `GET /me/player/currently-playing` the proxy reads.
///
/// `item` is the provider's track (or episode) object and is kept as an
/// opaque JSON value; it is passed through to the client untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub item: Option<Value>,
    #[serde(default)]
    pub progress_ms: Option<u64>,
}

/// Outcome of asking the provider what is playing.
#[derive(Debug, Clone)]
pub enum Playback {
    Playing(CurrentlyPlaying),
    /// The provider answered 204: nothing is playing.
    NotPlaying,
}

/// What `GET /currentTrack` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSnapshot {
    pub is_playing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_track: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_track_progress: Option<u64>,
}

impl TrackSnapshot {
    pub fn not_playing() -> Self {
        TrackSnapshot {
            is_playing: false,
            current_track: None,
            current_track_progress: None,
        }
    }
}

impl From<Playback> for TrackSnapshot {
    fn from(playback: Playback) -> Self {
        match playback {
            Playback::NotPlaying => TrackSnapshot::not_playing(),
            Playback::Playing(current) => TrackSnapshot {
                is_playing: current.is_playing,
                current_track: current.item,
                current_track_progress: current.progress_ms,
            },
        }
    }
}
