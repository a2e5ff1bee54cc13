#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use nowplaying_proxy::{
    config::AllowedOrigins,
    error::ProxyError,
    management::TokenManager,
    server::{self, AppState},
    spotify::SpotifyApi,
    store::{KvStore, MemoryStore},
    types::{CurrentlyPlaying, Playback},
};

pub const CLIENT_ID: &str = "portfolio-client";
pub const SHARED_SECRET: &str = "let-me-in";
pub const ORIGIN: &str = "https://portfolio.example";
pub const TTL: Duration = Duration::from_secs(3500);

pub enum RefreshBehavior {
    Token(&'static str),
    Reject,
}

pub enum FetchBehavior {
    Playing(Value),
    NotPlaying,
    Fail,
    Panic,
}

/// Scripted [`SpotifyApi`] that counts its calls.
pub struct FakeSpotify {
    refresh: RefreshBehavior,
    fetch: FetchBehavior,
    pub refresh_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub last_bearer: Mutex<Option<String>>,
}

impl FakeSpotify {
    pub fn new(refresh: RefreshBehavior, fetch: FetchBehavior) -> Self {
        FakeSpotify {
            refresh,
            fetch,
            refresh_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            last_bearer: Mutex::new(None),
        }
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn last_bearer(&self) -> Option<String> {
        self.last_bearer.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn refresh_access_token(&self, _refresh_token: &str) -> Result<String, ProxyError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        // let concurrent requests interleave
        tokio::task::yield_now().await;
        match &self.refresh {
            RefreshBehavior::Token(token) => Ok(token.to_string()),
            RefreshBehavior::Reject => Err(ProxyError::UpstreamAuth("400: invalid_grant".into())),
        }
    }

    async fn currently_playing(&self, access_token: &str) -> Result<Playback, ProxyError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_bearer.lock().unwrap() = Some(access_token.to_string());
        match &self.fetch {
            FetchBehavior::Playing(body) => {
                let current: CurrentlyPlaying = serde_json::from_value(body.clone()).unwrap();
                Ok(Playback::Playing(current))
            }
            FetchBehavior::NotPlaying => Ok(Playback::NotPlaying),
            FetchBehavior::Fail => Err(ProxyError::UpstreamFetch("401: token expired".into())),
            FetchBehavior::Panic => panic!("player endpoint exploded"),
        }
    }
}

pub struct Harness {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub spotify: Arc<FakeSpotify>,
    pub tokens: Arc<TokenManager>,
}

pub fn harness(spotify: FakeSpotify) -> Harness {
    harness_with(spotify, Arc::new(MemoryStore::new()), &AllowedOrigins::Any)
}

pub fn harness_with(
    spotify: FakeSpotify,
    store: Arc<MemoryStore>,
    origins: &AllowedOrigins,
) -> Harness {
    let kv: Arc<dyn KvStore> = store.clone();
    harness_over(spotify, kv, store, origins)
}

/// Like [`harness_with`] but the token manager talks to `kv`, which may wrap `store`.
pub fn harness_over(
    spotify: FakeSpotify,
    kv: Arc<dyn KvStore>,
    store: Arc<MemoryStore>,
    origins: &AllowedOrigins,
) -> Harness {
    let spotify = Arc::new(spotify);
    let tokens = Arc::new(TokenManager::new(kv, spotify.clone(), CLIENT_ID, TTL));
    let state = AppState::new(tokens.clone(), spotify.clone(), SHARED_SECRET);

    Harness {
        app: server::app(state, origins),
        store,
        spotify,
        tokens,
    }
}

pub fn access_key() -> String {
    format!("access_token:{CLIENT_ID}")
}

pub fn refresh_key() -> String {
    format!("refresh:{CLIENT_ID}")
}

pub fn request(method: &str, path: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::ORIGIN, ORIGIN);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn authorized(path: &str) -> Request<Body> {
    request("GET", path, Some(&format!("Basic {SHARED_SECRET}")))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn allow_origin(&self) -> Option<&str> {
        self.headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}
