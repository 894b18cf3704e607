use async_trait::async_trait;
use tokio::sync::Mutex;

use common::{Result, SubscriptionStore, Subscriptions};

use crate::{apply_add, apply_pairs, apply_remove};

/// Volatile store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Subscriptions>,
}

impl MemoryStore {
    pub fn new(subs: Subscriptions) -> Self {
        Self {
            inner: Mutex::new(subs),
        }
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn snapshot(&self) -> Result<Subscriptions> {
        Ok(self.inner.lock().await.clone())
    }

    async fn add_chat(&self, chat_id: i64) -> Result<bool> {
        Ok(apply_add(&mut *self.inner.lock().await, chat_id))
    }

    async fn remove_chat(&self, chat_id: i64) -> Result<bool> {
        Ok(apply_remove(&mut *self.inner.lock().await, chat_id))
    }

    async fn set_pairs(&self, pairs: Vec<String>) -> Result<Vec<String>> {
        apply_pairs(&mut *self.inner.lock().await, pairs)
    }
}
