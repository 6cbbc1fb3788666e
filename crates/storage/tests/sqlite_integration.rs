use std::sync::Arc;

use attempt_core::model::{AttemptField, AttemptIdentity, ChallengeSlug, ElapsedTime, UserId};
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;
use storage::AttemptStore;

fn identity(user: &str, slug: &str) -> AttemptIdentity {
    AttemptIdentity::for_user(UserId::new(user).unwrap(), ChallengeSlug::new(slug).unwrap())
}

#[tokio::test]
async fn sqlite_set_get_remove_round_trip() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Migrations are re-runnable.
    repo.migrate().await.expect("migrate twice");

    assert_eq!(repo.get("missing").await.unwrap(), None);

    repo.set("k", "1").await.unwrap();
    repo.set("k", "2").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("2"));

    repo.remove("k").await.unwrap();
    repo.remove("k").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_attempt_store_survives_reconnect() {
    let url = "sqlite:file:memdb_attempt_reconnect?mode=memory&cache=shared";
    let first = SqliteRepository::connect(url).await.expect("connect");
    first.migrate().await.expect("migrate");

    let id = identity("7", "maze-2");
    let store = AttemptStore::new(Arc::new(first.clone()));
    store
        .seed_resume(&id, ElapsedTime::from_millis(61_000))
        .await
        .unwrap();

    // A second pool against the same shared database stands in for a reload.
    let second = SqliteRepository::connect(url).await.expect("reconnect");
    let reloaded = AttemptStore::new(Arc::new(second));
    let record = reloaded.load(&id).await.unwrap();
    assert!(record.is_resumed);
    assert!(record.active);
    assert_eq!(record.time_spent.as_millis(), 61_000);

    let token = reloaded.take_resume_token(&id).await.unwrap();
    assert!(token.is_some());
    assert!(store.take_resume_token(&id).await.unwrap().is_none());

    reloaded.clear(&id).await.unwrap();
    let raw = store.raw_entries(&id).await.unwrap();
    assert!(raw.iter().all(|(_, v)| v.is_none()));
    drop(first);
}

#[tokio::test]
async fn sqlite_storage_keeps_identities_apart() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage_isolation?mode=memory&cache=shared")
        .await
        .expect("storage");
    let store = AttemptStore::new(Arc::clone(&storage.attempts));

    let a = identity("1", "loops");
    let b = identity("2", "loops");
    store.begin_segment(&a, 1_000).await.unwrap();

    assert_eq!(store.load(&a).await.unwrap().running_start(), Some(1_000));
    assert!(store.load(&b).await.unwrap().is_empty());
    assert_eq!(
        storage
            .attempts
            .get(&a.key(AttemptField::Active))
            .await
            .unwrap()
            .as_deref(),
        Some("true")
    );
}
