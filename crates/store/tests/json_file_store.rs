use std::sync::Arc;

use common::{Interval, SubscriptionStore, Subscriptions};
use store::JsonFileStore;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> JsonFileStore {
    JsonFileStore::new(dir.path().join("subscriptions.json"))
}

#[tokio::test]
async fn missing_file_yields_defaults_without_creating_it() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert_eq!(store.snapshot().await.unwrap(), Subscriptions::default());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn changes_survive_a_reopen() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(store.add_chat(1001).await.unwrap());
    assert!(store.add_chat(-42).await.unwrap());
    store
        .set_pairs(vec!["eurjpy".into(), "EURUSD".into()])
        .await
        .unwrap();

    let reopened = store_in(&dir);
    let subs = reopened.snapshot().await.unwrap();
    assert_eq!(subs.chats, vec![1001, -42]);
    assert_eq!(subs.pairs, vec!["EURJPY", "EURUSD"]);
    assert_eq!(subs.interval, Interval::FiveMinutes);
}

#[tokio::test]
async fn no_temp_file_is_left_behind() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.add_chat(7).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["subscriptions.json".to_string()]);
}

#[tokio::test]
async fn duplicate_add_and_unknown_remove_do_not_write() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(!store.remove_chat(99).await.unwrap());
    assert!(!store.path().exists());

    store.add_chat(3).await.unwrap();
    assert!(!store.add_chat(3).await.unwrap());
    assert_eq!(store.snapshot().await.unwrap().chats, vec![3]);
}

#[tokio::test]
async fn partial_documents_fill_in_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("subscriptions.json");
    std::fs::write(&path, r#"{"chats": [12, 34]}"#).unwrap();

    let subs = JsonFileStore::new(&path).snapshot().await.unwrap();
    assert_eq!(subs.chats, vec![12, 34]);
    assert_eq!(subs.pairs, Subscriptions::default().pairs);
    assert_eq!(subs.interval, Interval::FiveMinutes);
}

#[tokio::test]
async fn corrupt_file_is_a_store_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("subscriptions.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = JsonFileStore::new(&path).snapshot().await.unwrap_err();
    assert!(matches!(err, common::Error::Store(_)), "{err}");
}

#[tokio::test]
async fn concurrent_subscribers_are_all_recorded() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(store_in(&dir));

    let tasks: Vec<_> = (0..20)
        .map(|id| {
            let store = store.clone();
            tokio::spawn(async move { store.add_chat(id).await.unwrap() })
        })
        .collect();
    for t in tasks {
        assert!(t.await.unwrap());
    }

    let mut chats = store.snapshot().await.unwrap().chats;
    chats.sort();
    assert_eq!(chats, (0..20).collect::<Vec<i64>>());
}
