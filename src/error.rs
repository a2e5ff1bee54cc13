//! Error taxonomy for request handling.
//!
//! Every failure a request can run into ends up as a [`ProxyError`]. The
//! top-level router turns it into a well-formed JSON response; the client
//! only ever sees a fixed message per status, never the underlying detail.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// No refresh token is on record for the configured client identity.
    #[error("no refresh token for '{client_id}'")]
    MissingRefreshToken { client_id: String },

    /// The token endpoint rejected the exchange or answered with something
    /// that has no `access_token`.
    #[error("token exchange failed: {0}")]
    UpstreamAuth(String),

    /// The currently-playing endpoint answered with an unexpected status or body.
    #[error("track fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("missing or invalid shared secret")]
    Unauthorized,

    #[error("no route matched")]
    NotFound,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::MissingRefreshToken { .. }
            | ProxyError::UpstreamAuth(_)
            | ProxyError::UpstreamFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the client sees. Fixed per status.
    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::Unauthorized => "Unauthorized",
            ProxyError::NotFound => "404, not found!",
            _ => INTERNAL_ERROR_MESSAGE,
        }
    }
}

pub(crate) const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Builds the JSON error body shared by every error status.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({ "status": status.as_u16(), "error": message }));
    (status, body).into_response()
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        error_response(status, self.public_message())
    }
}
