//! Configuration management for the now-playing proxy.
//!
//! This module handles loading configuration values from environment
//! variables and `.env` files. All values are collected into one explicit
//! [`Config`] struct at startup, which is then handed to every component.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use thiserror::Error;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8787";
pub const DEFAULT_SPOTIFY_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// Spotify access tokens live for 3600 seconds. The cached copy is evicted a
/// little earlier so a cache hit is never an already expired token.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 3500;
pub const MAX_ACCESS_TOKEN_TTL_SECS: u64 = 86_400;

pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
pub const MAX_UPSTREAM_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Which key-value store backs the token cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
    Cloudflare(CloudflareKv),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudflareKv {
    pub api_url: String,
    pub account_id: String,
    pub namespace_id: String,
    pub api_token: String,
}

/// Origins allowed by the CORS policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    /// Credential callers must send as `Authorization: Basic <secret>`.
    pub shared_secret: String,
    /// Seeded into the store on startup when present.
    pub spotify_refresh_token: Option<String>,
    pub spotify_apitoken_url: String,
    pub spotify_apiurl: String,
    pub access_token_ttl: Duration,
    /// Whole-request timeout for every outbound call.
    pub upstream_timeout: Duration,
    pub allowed_origins: AllowedOrigins,
    pub store: StoreBackend,
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Looks for `nowplaying-proxy/.env` in the platform-specific local data
/// directory:
/// - Linux: `~/.local/share/nowplaying-proxy/.env`
/// - macOS: `~/Library/Application Support/nowplaying-proxy/.env`
/// - Windows: `%LOCALAPPDATA%/nowplaying-proxy/.env`
///
/// A missing file is fine; the process environment is used as is. Values
/// already present in the environment are never overwritten.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("nowplaying-proxy/.env");
    path
}

/// Default location of the JSON file used by the `file` store backend.
pub fn default_kv_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("nowplaying-proxy/kv.json");
    path
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let access_token_ttl = parse_secs(
            "ACCESS_TOKEN_TTL_SECS",
            get("ACCESS_TOKEN_TTL_SECS"),
            DEFAULT_ACCESS_TOKEN_TTL_SECS,
            MAX_ACCESS_TOKEN_TTL_SECS,
        )?;
        let upstream_timeout = parse_secs(
            "UPSTREAM_TIMEOUT_SECS",
            get("UPSTREAM_TIMEOUT_SECS"),
            DEFAULT_UPSTREAM_TIMEOUT_SECS,
            MAX_UPSTREAM_TIMEOUT_SECS,
        )?;

        let allowed_origins = parse_origins(get("CORS_ALLOWED_ORIGINS").as_deref());

        let store = match get("KV_BACKEND").as_deref().map(str::trim) {
            None | Some("memory") => StoreBackend::Memory,
            Some("file") => StoreBackend::File(
                get("KV_FILE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_kv_file_path),
            ),
            Some("cloudflare") => StoreBackend::Cloudflare(CloudflareKv {
                api_url: get("CF_API_URL")
                    .unwrap_or_else(|| DEFAULT_CLOUDFLARE_API_URL.to_string()),
                account_id: require("CF_ACCOUNT_ID")?,
                namespace_id: require("CF_KV_NAMESPACE_ID")?,
                api_token: require("CF_API_TOKEN")?,
            }),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "KV_BACKEND",
                    value: other.to_string(),
                    reason: "expected one of memory, file, cloudflare".to_string(),
                });
            }
        };

        Ok(Config {
            server_addr: get("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
            spotify_client_id: require("SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: require("SPOTIFY_CLIENT_SECRET")?,
            shared_secret: require("PROXY_SHARED_SECRET")?,
            spotify_refresh_token: get("SPOTIFY_REFRESH_TOKEN"),
            spotify_apitoken_url: get("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_TOKEN_URL.to_string()),
            spotify_apiurl: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string()),
            access_token_ttl,
            upstream_timeout,
            allowed_origins,
            store,
        })
    }
}

/// Parses a whole number of seconds in `1..=max`.
fn parse_secs(
    key: &'static str,
    raw: Option<String>,
    default: u64,
    max: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(default));
    };

    let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    if secs == 0 || secs > max {
        return Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: format!("must be between 1 and {max}"),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a comma separated origin list. `*` anywhere, or no value, means any origin.
fn parse_origins(raw: Option<&str>) -> AllowedOrigins {
    let Some(raw) = raw else {
        return AllowedOrigins::Any;
    };

    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| o.trim_end_matches('/').to_string())
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}
