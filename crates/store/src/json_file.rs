use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use common::{Error, Result, SubscriptionStore, Subscriptions};

use crate::{apply_add, apply_pairs, apply_remove};

/// Subscriptions persisted as pretty-printed JSON.
///
/// Every mutation is a locked read-modify-write; the new document is written
/// to a sibling temp file and renamed over the original.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!(path = %path.display(), "Using JSON subscription store");
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Subscriptions> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::Store(format!("corrupt {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No subscription file yet — using defaults");
                Ok(Subscriptions::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, subs: &Subscriptions) -> Result<()> {
        let json = serde_json::to_vec_pretty(subs)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            warn!(path = %self.path.display(), error = %e, "Failed to replace subscription file");
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!(
            path = %self.path.display(),
            chats = subs.chats.len(),
            pairs = subs.pairs.len(),
            "Subscriptions saved"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "subscriptions.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn update<T>(&self, f: impl FnOnce(&mut Subscriptions) -> Result<(T, bool)>) -> Result<T> {
        let _guard = self.lock.lock().await;
        let mut subs = self.load().await?;
        let (out, changed) = f(&mut subs)?;
        if changed {
            self.save(&subs).await?;
        }
        Ok(out)
    }
}

#[async_trait]
impl SubscriptionStore for JsonFileStore {
    async fn snapshot(&self) -> Result<Subscriptions> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn add_chat(&self, chat_id: i64) -> Result<bool> {
        self.update(|subs| {
            let added = apply_add(subs, chat_id);
            Ok((added, added))
        })
        .await
    }

    async fn remove_chat(&self, chat_id: i64) -> Result<bool> {
        self.update(|subs| {
            let removed = apply_remove(subs, chat_id);
            Ok((removed, removed))
        })
        .await
    }

    async fn set_pairs(&self, pairs: Vec<String>) -> Result<Vec<String>> {
        self.update(|subs| {
            let pairs = apply_pairs(subs, pairs)?;
            Ok((pairs, true))
        })
        .await
    }
}
