use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::{KvStore, StoreError};
use crate::config::CloudflareKv;

/// Workers KV rejects expirations shorter than a minute.
const MIN_EXPIRATION_TTL_SECS: u64 = 60;

/// A Workers KV namespace accessed through the Cloudflare REST API.
pub struct CloudflareKvStore {
    client: Client,
    kv: CloudflareKv,
}

impl CloudflareKvStore {
    pub fn new(client: Client, kv: CloudflareKv) -> Self {
        Self { client, kv }
    }

    /// `{api}/accounts/{account}/storage/kv/namespaces/{namespace}/values/{key}`,
    /// with every segment percent-encoded.
    fn value_url(&self, key: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.kv.api_url).map_err(|e| StoreError::Backend {
            status: 0,
            body: format!("invalid Cloudflare API url '{}': {}", self.kv.api_url, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| StoreError::Backend {
                status: 0,
                body: format!("Cloudflare API url '{}' cannot be a base", self.kv.api_url),
            })?
            .pop_if_empty()
            .extend([
                "accounts",
                self.kv.account_id.as_str(),
                "storage",
                "kv",
                "namespaces",
                self.kv.namespace_id.as_str(),
                "values",
                key,
            ]);

        Ok(url)
    }
}

#[async_trait]
impl KvStore for CloudflareKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let res = self
            .client
            .get(self.value_url(key)?)
            .bearer_auth(&self.kv.api_token)
            .send()
            .await?;

        match res.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(res.text().await?)),
            status => Err(StoreError::Backend {
                status: status.as_u16(),
                body: res.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut request = self
            .client
            .put(self.value_url(key)?)
            .bearer_auth(&self.kv.api_token)
            .body(value.to_string());

        if let Some(ttl) = ttl {
            let secs = ttl.as_secs().max(MIN_EXPIRATION_TTL_SECS);
            request = request.query(&[("expiration_ttl", secs)]);
        }

        let res = request.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(StoreError::Backend {
                status: status.as_u16(),
                body: res.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(api_url: &str) -> CloudflareKvStore {
        CloudflareKvStore::new(
            Client::new(),
            CloudflareKv {
                api_url: api_url.to_string(),
                account_id: "acc".to_string(),
                namespace_id: "ns".to_string(),
                api_token: "tok".to_string(),
            },
        )
    }

    #[test]
    fn value_url_encodes_the_key() {
        let url = store("https://api.cloudflare.com/client/v4/")
            .value_url("access_token:my client")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cloudflare.com/client/v4/accounts/acc/storage/kv/namespaces/ns/values/access_token:my%20client"
        );
    }

    #[test]
    fn value_url_rejects_garbage_base() {
        assert!(store("not a url").value_url("k").is_err());
    }
}
