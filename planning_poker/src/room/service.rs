//! Room directory operations.

use super::models::{Room, RoomId, parse_roster, raw_roster, reveal_path, room_path, roster_path};
use crate::{
    player::{PlayerId, estimate_path},
    store::{Store, StorePath, StoreResult, Update},
};
use chrono::Utc;
use log::{debug, info};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

/// Creates rooms and manages their rosters.
#[derive(Clone)]
pub struct RoomService {
    store: Arc<dyn Store>,
}

impl RoomService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a room with `owner` as its only player
    ///
    /// An existing room with the same id is overwritten.
    ///
    /// # Arguments
    ///
    /// * `room_id` - Room ID
    /// * `owner` - Player who opened the room
    ///
    /// # Returns
    ///
    /// * `StoreResult<Room>` - The record that was written
    pub async fn create_room(&self, room_id: &RoomId, owner: PlayerId) -> StoreResult<Room> {
        let room = Room::new(owner, Utc::now().timestamp_millis());
        self.store
            .write(&room_path(room_id), serde_json::to_value(&room)?)
            .await?;

        info!("Room {} created by {}", room_id, owner);
        Ok(room)
    }

    /// Append `player` to the roster unless already present
    ///
    /// Runs as one atomic read-modify-write, so concurrent joins never drop
    /// each other.
    ///
    /// # Returns
    ///
    /// * `StoreResult<bool>` - `true` when the player was added
    pub async fn add_player(&self, room_id: &RoomId, player: PlayerId) -> StoreResult<bool> {
        let entry = Value::String(player.to_string());
        let added = self
            .store
            .transact(
                &roster_path(room_id),
                Box::new(move |current| {
                    let mut roster = raw_roster(current);
                    if roster.contains(&entry) {
                        return Update::Keep;
                    }
                    roster.push(entry);
                    Update::Set(Value::Array(roster))
                }),
            )
            .await?;

        if added {
            debug!("Player {} joined room {}", player, room_id);
        }
        Ok(added)
    }

    /// Remove `player` from the roster, keeping everyone else's order
    ///
    /// # Returns
    ///
    /// * `StoreResult<bool>` - `true` when the player was on the roster
    pub async fn remove_player(&self, room_id: &RoomId, player: PlayerId) -> StoreResult<bool> {
        let entry = Value::String(player.to_string());
        let removed = self
            .store
            .transact(
                &roster_path(room_id),
                Box::new(move |current| {
                    let roster = raw_roster(current);
                    if !roster.contains(&entry) {
                        return Update::Keep;
                    }
                    let remaining: Vec<Value> =
                        roster.into_iter().filter(|v| *v != entry).collect();
                    Update::Set(Value::Array(remaining))
                }),
            )
            .await?;

        if removed {
            debug!("Player {} left room {}", player, room_id);
        }
        Ok(removed)
    }

    pub async fn set_reveal(&self, room_id: &RoomId, reveal: bool) -> StoreResult<()> {
        self.store
            .write(&reveal_path(room_id), Value::Bool(reveal))
            .await?;

        debug!("Room {} reveal set to {}", room_id, reveal);
        Ok(())
    }

    /// Clear every rostered player's estimate and hide the cards again
    ///
    /// All writes land in one atomic step. A room with an absent or empty
    /// roster is left untouched; roster entries that are not player ids are
    /// skipped.
    pub async fn reset_estimates(&self, room_id: &RoomId) -> StoreResult<()> {
        let roster = self.store.read(&roster_path(room_id)).await?;
        let Some(roster) = roster.filter(|r| !is_empty_collection(r)) else {
            debug!("Room {} has no roster, nothing to reset", room_id);
            return Ok(());
        };

        let mut updates: BTreeMap<StorePath, Value> = parse_roster(Some(&roster))
            .into_iter()
            .map(|id| (estimate_path(id), Value::Null))
            .collect();
        updates.insert(reveal_path(room_id), Value::Bool(false));

        let cleared = updates.len() - 1;
        self.store.multi_write(updates).await?;

        info!("Room {} reset, {} estimates cleared", room_id, cleared);
        Ok(())
    }

    /// Remove the roster. Player estimates and the room's other fields stay.
    pub async fn clear_room(&self, room_id: &RoomId) -> StoreResult<()> {
        self.store.write(&roster_path(room_id), Value::Null).await?;

        info!("Room {} cleared", room_id);
        Ok(())
    }

    pub async fn get_room(&self, room_id: &RoomId) -> StoreResult<Option<Room>> {
        match self.store.read(&room_path(room_id)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

fn is_empty_collection(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use uuid::Uuid;

    fn service() -> (RoomService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (RoomService::new(store.clone()), store)
    }

    fn room_id() -> RoomId {
        "123456".parse().unwrap()
    }

    #[tokio::test]
    async fn test_create_room_overwrites() {
        let (rooms, _) = service();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        rooms.create_room(&room_id(), first).await.unwrap();
        rooms.add_player(&room_id(), second).await.unwrap();
        rooms.set_reveal(&room_id(), true).await.unwrap();
        rooms.create_room(&room_id(), second).await.unwrap();

        let room = rooms.get_room(&room_id()).await.unwrap().unwrap();
        assert_eq!(room.players, vec![second]);
        assert!(!room.reveal_estimates);
        assert!(room.created_at > 0);
    }

    #[tokio::test]
    async fn test_add_player_is_idempotent() {
        let (rooms, _) = service();
        let owner = Uuid::new_v4();
        let guest = Uuid::new_v4();
        rooms.create_room(&room_id(), owner).await.unwrap();

        assert!(rooms.add_player(&room_id(), guest).await.unwrap());
        assert!(!rooms.add_player(&room_id(), guest).await.unwrap());
        assert!(!rooms.add_player(&room_id(), owner).await.unwrap());

        let room = rooms.get_room(&room_id()).await.unwrap().unwrap();
        assert_eq!(room.players, vec![owner, guest]);
    }

    #[tokio::test]
    async fn test_add_player_to_missing_room_starts_roster() {
        let (rooms, store) = service();
        let guest = Uuid::new_v4();

        rooms.add_player(&room_id(), guest).await.unwrap();

        assert_eq!(
            store.read(&room_path(&room_id())).await.unwrap(),
            Some(json!({"players": [guest.to_string()]}))
        );
    }

    #[tokio::test]
    async fn test_remove_player_keeps_order() {
        let (rooms, _) = service();
        let ids: Vec<PlayerId> = (0..3).map(|_| Uuid::new_v4()).collect();
        rooms.create_room(&room_id(), ids[0]).await.unwrap();
        rooms.add_player(&room_id(), ids[1]).await.unwrap();
        rooms.add_player(&room_id(), ids[2]).await.unwrap();

        assert!(rooms.remove_player(&room_id(), ids[1]).await.unwrap());
        assert!(!rooms.remove_player(&room_id(), ids[1]).await.unwrap());

        let room = rooms.get_room(&room_id()).await.unwrap().unwrap();
        assert_eq!(room.players, vec![ids[0], ids[2]]);
    }

    #[tokio::test]
    async fn test_reset_without_roster_is_noop() {
        let (rooms, store) = service();
        store
            .write(&reveal_path(&room_id()), json!(true))
            .await
            .unwrap();
        let mut feed = store.subscribe();

        rooms.reset_estimates(&room_id()).await.unwrap();

        assert!(feed.try_recv().is_err());
        assert_eq!(
            store.read(&reveal_path(&room_id())).await.unwrap(),
            Some(json!(true))
        );
    }

    #[tokio::test]
    async fn test_reset_with_empty_roster_is_noop() {
        let (rooms, store) = service();
        let owner = Uuid::new_v4();
        rooms.create_room(&room_id(), owner).await.unwrap();
        rooms.remove_player(&room_id(), owner).await.unwrap();
        rooms.set_reveal(&room_id(), true).await.unwrap();

        rooms.reset_estimates(&room_id()).await.unwrap();

        assert_eq!(
            store.read(&reveal_path(&room_id())).await.unwrap(),
            Some(json!(true))
        );
    }

    #[tokio::test]
    async fn test_clear_room_keeps_estimates() {
        let (rooms, store) = service();
        let owner = Uuid::new_v4();
        rooms.create_room(&room_id(), owner).await.unwrap();
        store.write(&estimate_path(owner), json!("8")).await.unwrap();

        rooms.clear_room(&room_id()).await.unwrap();

        let room = rooms.get_room(&room_id()).await.unwrap().unwrap();
        assert!(room.players.is_empty());
        assert_eq!(
            store.read(&estimate_path(owner)).await.unwrap(),
            Some(json!("8"))
        );
    }

    #[tokio::test]
    async fn test_get_missing_room() {
        let (rooms, _) = service();
        assert_eq!(rooms.get_room(&room_id()).await.unwrap(), None);
    }
}
