//! # Store Module
//!
//! Key-value storage used as the token cache. The proxy only ever needs two
//! operations, an unconditional `get` and an unconditional `put` with an
//! optional time-to-live, so that is the whole [`KvStore`] surface.
//!
//! ## Backends
//!
//! - [`MemoryStore`] - in-process map, lost on restart. Default.
//! - [`FileStore`] - a JSON document in the local data directory.
//! - [`CloudflareKvStore`] - a Workers KV namespace through the Cloudflare REST API.
//!
//! Entries whose time-to-live has elapsed read as absent on every backend.
//! There are no transactions or compare-and-swap; last write wins.

mod cloudflare;
mod file;
mod memory;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::StoreBackend;

pub use cloudflare::CloudflareKvStore;
pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document is malformed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store backend answered {status}: {body}")]
    Backend { status: u16, body: String },
}

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value. With a
    /// `ttl`, the entry disappears once it has elapsed.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;
}

/// Opens the store selected by the configuration.
pub fn open(backend: &StoreBackend, client: reqwest::Client) -> Arc<dyn KvStore> {
    match backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File(path) => Arc::new(FileStore::new(path.clone())),
        StoreBackend::Cloudflare(kv) => Arc::new(CloudflareKvStore::new(client, kv.clone())),
    }
}
