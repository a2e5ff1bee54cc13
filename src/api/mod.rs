//! # API Module
//!
//! HTTP handlers and the middleware that runs in front of them.
//!
//! ## Endpoints
//!
//! - [`current_track`] - `GET /currentTrack`, the currently playing track
//!   projected to `{ isPlaying, currentTrack, currentTrackProgress }`
//! - [`health`] - `GET /health`, service name and version
//!
//! ## Request gate
//!
//! - [`cors_layer`] - CORS policy; answers preflight (`OPTIONS`) requests on
//!   its own and stamps CORS headers on every other response
//! - [`require_shared_secret`] - `Authorization: Basic <shared secret>` check
//!   that runs before route matching
//!
//! ## Fallback
//!
//! - [`not_found`] - 404 for anything no route claims
//! - [`panic_response`] - generic 500 when a handler panics
//!
//! Error responses all share one body shape, `{ "status": <code>, "error": <message> }`,
//! built from [`crate::error::ProxyError`].
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, middleware, routing::get};
//! use nowplaying_proxy::api;
//!
//! let app = Router::new()
//!     .route("/currentTrack", get(api::current_track))
//!     .fallback(api::not_found)
//!     .layer(middleware::from_fn_with_state(state.clone(), api::require_shared_secret))
//!     .layer(api::cors_layer(&config.allowed_origins))
//!     .with_state(state);
//! ```

mod current_track;
mod fallback;
mod gate;
mod health;

pub use current_track::current_track;
pub use fallback::{not_found, panic_response};
pub use gate::{cors_layer, require_shared_secret, shared_secret_matches};
pub use health::{HealthStatus, health};
