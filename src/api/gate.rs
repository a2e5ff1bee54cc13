use axum::{
    extract::{Request, State},
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{config::AllowedOrigins, error::ProxyError, server::AppState};

/// Rejects every request that does not carry `Authorization: Basic <shared secret>`.
///
/// Runs before routing, so unknown paths are rejected with 401 as well.
/// Preflight requests never get here; the CORS layer answers them first.
pub async fn require_shared_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ProxyError> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| shared_secret_matches(value, &state.shared_secret));

    if !authorized {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "rejected request without a valid shared secret"
        );
        return Err(ProxyError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Checks an `Authorization` header value against the shared secret.
///
/// The header must hold exactly two tokens: the scheme `Basic` (any case)
/// and a credential equal to `secret`. The credential is not decoded; it is
/// the raw secret, not a base64 `user:password` pair.
pub fn shared_secret_matches(header: &str, secret: &str) -> bool {
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(credential), None) => {
            scheme.eq_ignore_ascii_case("Basic") && credential == secret
        }
        _ => false,
    }
}

/// CORS policy applied to every response, preflight answers included.
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::any(),
        AllowedOrigins::List(list) => AllowOrigin::list(list.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!(origin = %origin, "ignoring invalid CORS origin"))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
