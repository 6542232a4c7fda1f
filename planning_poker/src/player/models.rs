//! Player data models.

use crate::store::{StorePath, path::PLAYERS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Player ID type
pub type PlayerId = Uuid;

/// Player lookup used by the view projections
pub type PlayersById = HashMap<PlayerId, Player>;

/// Player document stored at `players/{id}`
///
/// `estimate` is kept as the raw card string: records written by other
/// clients are not validated on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub estimate: Option<String>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            estimate: None,
        }
    }

    /// Read a stored record leniently.
    ///
    /// The id comes from the record's key, so a record holding only a vote
    /// (cast before the player was saved) still reads. A missing or
    /// non-string `name` reads as empty, a non-string `estimate` as none.
    /// Anything but an object is not a player record.
    pub fn from_record(id: PlayerId, record: &Value) -> Option<Self> {
        let fields = record.as_object()?;
        Some(Self {
            id,
            name: fields
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            estimate: fields
                .get("estimate")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// `players/{id}`
pub fn player_path(id: PlayerId) -> StorePath {
    StorePath::root().child(PLAYERS).child(id.to_string())
}

/// `players/{id}/estimate`
pub fn estimate_path(id: PlayerId) -> StorePath {
    player_path(id).child("estimate")
}
