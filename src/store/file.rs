use std::{collections::HashMap, io::ErrorKind, path::PathBuf, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{KvStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    /// UNIX timestamp (seconds) after which the entry is gone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
}

impl StoredValue {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

type Document = HashMap<String, StoredValue>;

/// Store persisted as a single pretty-printed JSON document.
///
/// Reads and writes go through one async mutex so a `put` never interleaves
/// with another `put` from the same process. Expired entries are dropped
/// whenever the document is rewritten.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn load(&self) -> Result<Document, StoreError> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Document::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(document)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;
        let now = Utc::now().timestamp();

        Ok(document
            .get(key)
            .filter(|stored| !stored.is_expired(now))
            .map(|stored| stored.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let now = Utc::now().timestamp();

        document.retain(|_, stored| !stored.is_expired(now));
        document.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: ttl.and_then(|ttl| {
                    i64::try_from(ttl.as_secs())
                        .ok()
                        .and_then(|secs| now.checked_add(secs))
                }),
            },
        );

        self.persist(&document).await
    }
}
