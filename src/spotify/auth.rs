use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;

use crate::{error::ProxyError, types::TokenResponse};

/// Value of the `Authorization` header identifying this application to the
/// token endpoint: `Basic base64(client_id:client_secret)`.
pub fn basic_client_auth(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

/// Exchanges a refresh token for a new access token.
///
/// Posts a form-encoded `grant_type=refresh_token` request to the token
/// endpoint, authenticated with the application's client credentials.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `token_url` - Token endpoint, e.g. `https://accounts.spotify.com/api/token`
/// * `client_id` / `client_secret` - Application credentials
/// * `refresh_token` - Long-lived token provisioned out-of-band
///
/// # Returns
///
/// The new access token. Only the token string is returned; how long it is
/// cached is decided by the caller.
///
/// # Errors
///
/// Returns [`ProxyError::UpstreamAuth`] when the request cannot be sent, the
/// endpoint answers with a non-success status, the body is not JSON, or the
/// body has no non-empty `access_token`.
pub async fn refresh_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<String, ProxyError> {
    let res = client
        .post(token_url)
        .header(
            reqwest::header::AUTHORIZATION,
            basic_client_auth(client_id, client_secret),
        )
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await
        .map_err(|e| ProxyError::UpstreamAuth(e.to_string()))?;

    let status = res.status();
    if !status.is_success() {
        // the body usually carries `error` / `error_description`; keep it for the logs
        let body = res.text().await.unwrap_or_default();
        return Err(ProxyError::UpstreamAuth(format!("{status}: {body}")));
    }

    let token: TokenResponse = res
        .json()
        .await
        .map_err(|e| ProxyError::UpstreamAuth(format!("unreadable token response: {e}")))?;

    match token.access_token {
        Some(access_token) if !access_token.is_empty() => Ok(access_token),
        _ => Err(ProxyError::UpstreamAuth(
            "token response has no access_token".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_client_auth_encodes_id_and_secret() {
        // "client:secret"
        assert_eq!(
            basic_client_auth("client", "secret"),
            "Basic Y2xpZW50OnNlY3JldA=="
        );
    }
}
