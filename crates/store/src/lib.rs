//! Subscription persistence: a JSON file for production and an in-memory
//! store for tests.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use common::{normalize_pairs, Error, Result, Subscriptions};

/// Shared mutation rules so both stores behave identically.
pub(crate) fn apply_add(subs: &mut Subscriptions, chat_id: i64) -> bool {
    if subs.chats.contains(&chat_id) {
        return false;
    }
    subs.chats.push(chat_id);
    true
}

pub(crate) fn apply_remove(subs: &mut Subscriptions, chat_id: i64) -> bool {
    let before = subs.chats.len();
    subs.chats.retain(|c| *c != chat_id);
    subs.chats.len() != before
}

pub(crate) fn apply_pairs(subs: &mut Subscriptions, pairs: Vec<String>) -> Result<Vec<String>> {
    let pairs = normalize_pairs(pairs);
    if pairs.is_empty() {
        return Err(Error::Store("at least one pair is required".into()));
    }
    subs.pairs = pairs.clone();
    Ok(pairs)
}
