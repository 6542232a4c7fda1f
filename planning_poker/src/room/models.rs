//! Room data models.

use crate::{
    player::PlayerId,
    store::{StorePath, path::ROOMS},
};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

/// Smallest generated room id.
pub const MIN_GENERATED_ROOM_ID: u32 = 100_000;
/// Largest generated room id.
pub const MAX_GENERATED_ROOM_ID: u32 = 999_999;

/// Room identifier, used verbatim as a store path segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid room id: {0:?}")]
pub struct InvalidRoomId(pub String);

impl RoomId {
    /// Random six digit id. Collisions with existing rooms are not checked.
    pub fn generate() -> Self {
        let n = rand::rng().random_range(MIN_GENERATED_ROOM_ID..=MAX_GENERATED_ROOM_ID);
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomId {
    type Err = InvalidRoomId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        if id.is_empty() || id.contains('/') {
            return Err(InvalidRoomId(s.to_string()));
        }
        Ok(Self(id.to_string()))
    }
}

/// Room document stored at `rooms/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Roster in join order
    #[serde(default, deserialize_with = "deserialize_roster")]
    pub players: Vec<PlayerId>,
    #[serde(default)]
    pub reveal_estimates: bool,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub created_at: i64,
}

impl Room {
    pub fn new(owner: PlayerId, created_at: i64) -> Self {
        Self {
            players: vec![owner],
            reveal_estimates: false,
            created_at,
        }
    }
}

/// Player ids of a stored roster.
///
/// Accepts an array or an index-keyed object and skips entries that are not
/// UUID strings.
pub fn parse_roster(value: Option<&Value>) -> Vec<PlayerId> {
    raw_roster(value)
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|s| Uuid::parse_str(s).ok())
        .collect()
}

/// Non-null roster entries as stored, in order.
pub(crate) fn raw_roster(value: Option<&Value>) -> Vec<Value> {
    let entries: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => {
            let mut indexed: Vec<(u64, &Value)> = map
                .iter()
                .filter_map(|(k, v)| k.parse().ok().map(|i| (i, v)))
                .collect();
            indexed.sort_by_key(|(i, _)| *i);
            indexed.into_iter().map(|(_, v)| v).collect()
        }
        _ => Vec::new(),
    };

    entries.into_iter().filter(|v| !v.is_null()).cloned().collect()
}

fn deserialize_roster<'de, D>(deserializer: D) -> Result<Vec<PlayerId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(parse_roster(value.as_ref()))
}

/// `rooms/{id}`
pub fn room_path(id: &RoomId) -> StorePath {
    StorePath::root().child(ROOMS).child(id.as_str())
}

/// `rooms/{id}/players`
pub fn roster_path(id: &RoomId) -> StorePath {
    room_path(id).child("players")
}

/// `rooms/{id}/revealEstimates`
pub fn reveal_path(id: &RoomId) -> StorePath {
    room_path(id).child("revealEstimates")
}
