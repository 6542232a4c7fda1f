//! Player directory operations.

use super::models::{Player, PlayerId, PlayersById, estimate_path, player_path};
use crate::{
    estimate::EstimateOption,
    store::{Store, StoreResult},
};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

/// Reads and writes player documents.
#[derive(Clone)]
pub struct PlayerService {
    store: Arc<dyn Store>,
}

impl PlayerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create or overwrite the player record
    ///
    /// The estimate is always reset to null, so renaming a player also
    /// withdraws their vote.
    ///
    /// # Arguments
    ///
    /// * `id` - Player ID
    /// * `name` - Display name, stored as given
    ///
    /// # Returns
    ///
    /// * `StoreResult<Player>` - The record that was written
    pub async fn save_player(&self, id: PlayerId, name: &str) -> StoreResult<Player> {
        let player = Player::new(id, name);
        self.store
            .write(&player_path(id), serde_json::to_value(&player)?)
            .await?;

        debug!("Saved player {} as {:?}", id, player.name);
        Ok(player)
    }

    /// Overwrite the player's estimate; `None` clears it.
    ///
    /// Writes even when no player record exists yet.
    pub async fn set_estimate(
        &self,
        id: PlayerId,
        estimate: Option<EstimateOption>,
    ) -> StoreResult<()> {
        let value = estimate
            .map(|e| Value::String(e.as_str().to_string()))
            .unwrap_or(Value::Null);
        self.store.write(&estimate_path(id), value).await?;

        debug!("Player {} estimate set to {:?}", id, estimate);
        Ok(())
    }

    /// The player's record, `None` when absent or not an object.
    pub async fn get_player(&self, id: PlayerId) -> StoreResult<Option<Player>> {
        let Some(value) = self.store.read(&player_path(id)).await? else {
            return Ok(None);
        };
        let player = Player::from_record(id, &value);
        if player.is_none() {
            warn!("Ignoring malformed player record {}", id);
        }
        Ok(player)
    }

    /// Fetch every listed player that has a record.
    ///
    /// Missing ids are left out; malformed records are skipped with a warning.
    pub async fn get_players(&self, ids: &[PlayerId]) -> StoreResult<PlayersById> {
        let mut players = PlayersById::with_capacity(ids.len());
        for &id in ids {
            if players.contains_key(&id) {
                continue;
            }
            if let Some(player) = self.get_player(id).await? {
                players.insert(id, player);
            }
        }
        Ok(players)
    }
}
