use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use nowplaying_proxy::{
    config::Config,
    error::ProxyError,
    management::TokenManager,
    server::http_client,
    spotify::{SpotifyApi, SpotifyClient},
    store::MemoryStore,
    types::Playback,
};
use serde_json::json;

/// What the fake Spotify saw.
#[derive(Default)]
struct Seen {
    authorization: Mutex<Vec<String>>,
    forms: Mutex<Vec<HashMap<String, String>>>,
}

impl Seen {
    fn authorization(&self) -> Vec<String> {
        self.authorization.lock().unwrap().clone()
    }

    fn forms(&self) -> Vec<HashMap<String, String>> {
        self.forms.lock().unwrap().clone()
    }

    fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        self.authorization.lock().unwrap().push(value);
    }
}

async fn token(
    State(seen): State<Arc<Seen>>,
    Path(case): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    seen.record(&headers);
    seen.forms.lock().unwrap().push(form);

    match case.as_str() {
        "ok" => Json(json!({
            "access_token": "minted",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "user-read-currently-playing"
        }))
        .into_response(),
        "denied" => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid refresh token" })),
        )
            .into_response(),
        "blank" => Json(json!({ "access_token": "", "token_type": "Bearer" })).into_response(),
        "garbage" => "<html>maintenance</html>".into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "access_token": "too-late" })).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn player(
    State(seen): State<Arc<Seen>>,
    Path(case): Path<String>,
    headers: HeaderMap,
) -> Response {
    seen.record(&headers);

    match case.as_str() {
        "playing" => Json(json!({
            "is_playing": true,
            "progress_ms": 4200,
            "item": { "id": "track-1", "name": "Song" }
        }))
        .into_response(),
        "idle" => StatusCode::NO_CONTENT.into_response(),
        "expired" => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
        )
            .into_response(),
        "garbage" => "not json".into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Starts the fake Spotify on an ephemeral port and returns its base url.
async fn spawn_upstream() -> (String, Arc<Seen>) {
    let seen = Arc::new(Seen::default());
    let app = Router::new()
        .route("/token/{case}", post(token))
        .route("/player/{case}/me/player/currently-playing", get(player))
        .with_state(Arc::clone(&seen));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), seen)
}

fn config(base: &str, token_case: &str, player_case: &str, timeout_secs: &str) -> Config {
    let vars = HashMap::from([
        ("SPOTIFY_CLIENT_ID", "client".to_string()),
        ("SPOTIFY_CLIENT_SECRET", "secret".to_string()),
        ("PROXY_SHARED_SECRET", "shared".to_string()),
        ("SPOTIFY_API_TOKEN_URL", format!("{base}/token/{token_case}")),
        // trailing slash is trimmed by the client
        ("SPOTIFY_API_URL", format!("{base}/player/{player_case}/")),
        ("UPSTREAM_TIMEOUT_SECS", timeout_secs.to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn spotify(base: &str, token_case: &str, player_case: &str) -> SpotifyClient {
    let config = config(base, token_case, player_case, "5");
    SpotifyClient::new(http_client(&config).unwrap(), &config)
}

#[tokio::test]
async fn refresh_posts_the_grant_with_client_credentials() {
    let (base, seen) = spawn_upstream().await;

    let token = spotify(&base, "ok", "idle")
        .refresh_access_token("refresh-123")
        .await
        .unwrap();

    assert_eq!(token, "minted");
    // base64("client:secret")
    assert_eq!(seen.authorization(), vec!["Basic Y2xpZW50OnNlY3JldA=="]);
    let forms = seen.forms();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0]["grant_type"], "refresh_token");
    assert_eq!(forms[0]["refresh_token"], "refresh-123");
}

#[tokio::test]
async fn refresh_failures_are_upstream_auth_errors() {
    let (base, _) = spawn_upstream().await;

    for case in ["denied", "blank", "garbage", "missing"] {
        let err = spotify(&base, case, "idle")
            .refresh_access_token("refresh-123")
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::UpstreamAuth(_)), "{case}: {err:?}");
    }

    let err = spotify(&base, "denied", "idle")
        .refresh_access_token("refresh-123")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid_grant"), "{err}");
}

#[tokio::test]
async fn currently_playing_sends_bearer_and_reads_the_item() {
    let (base, seen) = spawn_upstream().await;

    let playback = spotify(&base, "ok", "playing")
        .currently_playing("access-1")
        .await
        .unwrap();

    match playback {
        Playback::Playing(current) => {
            assert!(current.is_playing);
            assert_eq!(current.progress_ms, Some(4200));
            assert_eq!(current.item, Some(json!({ "id": "track-1", "name": "Song" })));
        }
        Playback::NotPlaying => panic!("expected a playing track"),
    }
    assert_eq!(seen.authorization(), vec!["Bearer access-1"]);
}

#[tokio::test]
async fn no_content_means_nothing_is_playing() {
    let (base, _) = spawn_upstream().await;

    let playback = spotify(&base, "ok", "idle")
        .currently_playing("access-1")
        .await
        .unwrap();

    assert!(matches!(playback, Playback::NotPlaying));
}

#[tokio::test]
async fn player_failures_are_upstream_fetch_errors() {
    let (base, _) = spawn_upstream().await;

    for case in ["expired", "garbage", "missing"] {
        let err = spotify(&base, "ok", case)
            .currently_playing("access-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::UpstreamFetch(_)), "{case}: {err:?}");
    }
}

#[tokio::test]
async fn stalled_token_endpoint_times_out_and_releases_the_refresh_lock() {
    let (base, _) = spawn_upstream().await;
    let config = config(&base, "slow", "idle", "1");
    let spotify: Arc<dyn SpotifyApi> =
        Arc::new(SpotifyClient::new(http_client(&config).unwrap(), &config));
    let store = Arc::new(MemoryStore::new());
    let tokens = TokenManager::new(
        store,
        spotify,
        config.spotify_client_id.clone(),
        config.access_token_ttl,
    );
    tokens.store_refresh_token("refresh-123").await.unwrap();

    let started = tokio::time::Instant::now();
    let (first, second) = tokio::join!(tokens.get_valid_token(), tokens.get_valid_token());

    // each attempt gives up after one second; the second waits for the first
    assert!(matches!(first, Err(ProxyError::UpstreamAuth(_))), "{first:?}");
    assert!(matches!(second, Err(ProxyError::UpstreamAuth(_))), "{second:?}");
    assert!(started.elapsed() < Duration::from_secs(4), "{:?}", started.elapsed());
    assert_eq!(tokens.cached_access_token().await, None);
}
