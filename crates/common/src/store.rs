use async_trait::async_trait;

use crate::{Result, Subscriptions};

/// Persistence for the subscriber and pair list.
///
/// Injected into the scheduler and the Telegram handlers; nothing reads the
/// backing file directly.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Current subscriptions, or the defaults when nothing is persisted yet.
    async fn snapshot(&self) -> Result<Subscriptions>;

    /// Add a chat. Returns `false` if it was already subscribed.
    async fn add_chat(&self, chat_id: i64) -> Result<bool>;

    /// Remove a chat. Returns `false` if it was not subscribed.
    async fn remove_chat(&self, chat_id: i64) -> Result<bool>;

    /// Replace the tracked pairs and return the normalised list.
    async fn set_pairs(&self, pairs: Vec<String>) -> Result<Vec<String>>;
}

/// Upper-case, trim and de-duplicate pair symbols, keeping first-seen order.
pub fn normalize_pairs(pairs: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let pair = pair.trim().to_uppercase();
        if !pair.is_empty() && !out.contains(&pair) {
            out.push(pair);
        }
    }
    out
}
