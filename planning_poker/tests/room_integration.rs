//! Integration tests for the room and player directories.
//!
//! Covers joins, reveal/reset flows and the exact set of writes a reset
//! produces, all against the in-memory store.

use async_trait::async_trait;
use planning_poker::{
    EstimateOption, MemoryStore, PlayerService, RoomId, RoomService, RoomView, Store,
    StoreEvent, StorePath, StoreResult,
    store::{Mutation, path::PLAYERS},
};
use serde_json::{Value, json};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Store wrapper recording every multi_write it forwards
struct RecordingStore {
    inner: MemoryStore,
    multi_writes: Mutex<Vec<BTreeMap<StorePath, Value>>>,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            multi_writes: Mutex::new(Vec::new()),
        }
    }

    fn recorded(&self) -> Vec<BTreeMap<StorePath, Value>> {
        self.multi_writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn read(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &StorePath, value: Value) -> StoreResult<()> {
        self.inner.write(path, value).await
    }

    async fn multi_write(&self, updates: BTreeMap<StorePath, Value>) -> StoreResult<()> {
        self.multi_writes.lock().unwrap().push(updates.clone());
        self.inner.multi_write(updates).await
    }

    async fn transact(&self, path: &StorePath, mutation: Mutation) -> StoreResult<bool> {
        self.inner.transact(path, mutation).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.subscribe()
    }
}

fn services(store: Arc<dyn Store>) -> (RoomService, PlayerService) {
    (RoomService::new(store.clone()), PlayerService::new(store))
}

fn path(s: &str) -> StorePath {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_full_round() {
    let store = Arc::new(MemoryStore::new());
    let (rooms, players) = services(store.clone());
    let room_id = RoomId::generate();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    players.save_player(alice, "Alice").await.unwrap();
    players.save_player(bob, "Bob").await.unwrap();
    rooms.create_room(&room_id, alice).await.unwrap();
    rooms.add_player(&room_id, bob).await.unwrap();

    players
        .set_estimate(alice, Some(EstimateOption::Eight))
        .await
        .unwrap();
    players
        .set_estimate(bob, Some(EstimateOption::Eight))
        .await
        .unwrap();
    rooms.set_reveal(&room_id, true).await.unwrap();

    let room = rooms.get_room(&room_id).await.unwrap().unwrap();
    let lookup = players.get_players(&room.players).await.unwrap();
    let view = RoomView::project(room_id.clone(), &room, &lookup);
    assert!(view.revealed);
    assert!(view.celebrate);
    assert_eq!(
        view.seats.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        ["Alice", "Bob"]
    );

    rooms.reset_estimates(&room_id).await.unwrap();

    let room = rooms.get_room(&room_id).await.unwrap().unwrap();
    let lookup = players.get_players(&room.players).await.unwrap();
    let view = RoomView::project(room_id, &room, &lookup);
    assert!(!view.revealed);
    assert_eq!(view.votes_cast(), 0);
    assert!(!view.celebrate);
}

#[tokio::test]
async fn test_reset_writes_exactly_roster_estimates_and_flag() {
    let store = Arc::new(RecordingStore::new());
    let (rooms, players) = services(store.clone());
    let room_id: RoomId = "123456".parse().unwrap();
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();
    let outsider = Uuid::new_v4();

    rooms.create_room(&room_id, p1).await.unwrap();
    rooms.add_player(&room_id, p2).await.unwrap();
    for id in [p1, p2, outsider] {
        players.save_player(id, "Player").await.unwrap();
        players
            .set_estimate(id, Some(EstimateOption::Three))
            .await
            .unwrap();
    }

    rooms.reset_estimates(&room_id).await.unwrap();

    let recorded = store.recorded();
    assert_eq!(recorded.len(), 1);

    let mut expected = BTreeMap::new();
    expected.insert(path(&format!("{}/{}/estimate", PLAYERS, p1)), Value::Null);
    expected.insert(path(&format!("{}/{}/estimate", PLAYERS, p2)), Value::Null);
    expected.insert(path("rooms/123456/revealEstimates"), json!(false));
    assert_eq!(recorded[0], expected);

    let untouched = players.get_player(outsider).await.unwrap();
    assert_eq!(untouched.unwrap().estimate.as_deref(), Some("3"));
}

#[tokio::test]
async fn test_reset_skips_malformed_roster_entries() {
    let store = Arc::new(RecordingStore::new());
    let (rooms, _) = services(store.clone());
    let room_id: RoomId = "222222".parse().unwrap();
    let p1 = Uuid::new_v4();

    store
        .write(
            &path("rooms/222222/players"),
            json!([p1.to_string(), null, "legacy-id"]),
        )
        .await
        .unwrap();

    rooms.reset_estimates(&room_id).await.unwrap();

    let recorded = store.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].len(), 2);
    assert!(recorded[0].contains_key(&path(&format!("players/{}/estimate", p1))));
}

#[tokio::test]
async fn test_reset_on_missing_room_writes_nothing() {
    let store = Arc::new(RecordingStore::new());
    let (rooms, _) = services(store.clone());

    rooms
        .reset_estimates(&"999999".parse().unwrap())
        .await
        .unwrap();

    assert!(store.recorded().is_empty());
}

#[tokio::test]
async fn test_concurrent_joins_are_all_kept() {
    let store = Arc::new(MemoryStore::new());
    let (rooms, _) = services(store);
    let room_id: RoomId = "333333".parse().unwrap();
    let owner = Uuid::new_v4();
    rooms.create_room(&room_id, owner).await.unwrap();

    let guests: Vec<Uuid> = (0..32).map(|_| Uuid::new_v4()).collect();
    let mut handles = Vec::new();
    for &guest in &guests {
        let rooms = rooms.clone();
        let room_id = room_id.clone();
        handles.push(tokio::spawn(async move {
            rooms.add_player(&room_id, guest).await.unwrap();
            rooms.add_player(&room_id, guest).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let room = rooms.get_room(&room_id).await.unwrap().unwrap();
    assert_eq!(room.players.len(), guests.len() + 1);
    assert_eq!(room.players[0], owner);
    for guest in guests {
        assert_eq!(room.players.iter().filter(|&&p| p == guest).count(), 1);
    }
}

#[tokio::test]
async fn test_change_feed_reports_room_writes() {
    let store = Arc::new(MemoryStore::new());
    let (rooms, players) = services(store.clone());
    let room_id: RoomId = "444444".parse().unwrap();
    let owner = Uuid::new_v4();
    let mut feed = store.subscribe();

    rooms.create_room(&room_id, owner).await.unwrap();
    players
        .set_estimate(owner, Some(EstimateOption::One))
        .await
        .unwrap();

    let created = feed.recv().await.unwrap();
    assert!(created.touches(&path("rooms/444444")));

    let voted = feed.recv().await.unwrap();
    assert!(!voted.touches(&path("rooms/444444")));
    assert!(voted.touches(&path(&format!("players/{}", owner))));
}
