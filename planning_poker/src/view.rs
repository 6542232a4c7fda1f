//! Projections from stored room and player records to what a table shows.

use crate::{
    estimate::EstimateOption,
    player::{PlayerId, PlayersById},
    room::{Room, RoomId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A rostered player joined with their record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEstimate {
    pub id: PlayerId,
    pub name: String,
    pub estimate: Option<String>,
}

/// Resolve a roster against the player records, in roster order.
///
/// Ids with no record are dropped. Each entry carries the roster id.
pub fn map_room_players(roster: &[PlayerId], players: &PlayersById) -> Vec<PlayerEstimate> {
    roster
        .iter()
        .filter_map(|id| {
            players.get(id).map(|player| PlayerEstimate {
                id: *id,
                name: player.name.clone(),
                estimate: player.estimate.clone(),
            })
        })
        .collect()
}

/// Number of players holding each of `options`.
///
/// Every option is present, starting at zero. Missing estimates and strings
/// outside `options` are not counted.
pub fn count_estimates(
    players: &[PlayerEstimate],
    options: &[EstimateOption],
) -> BTreeMap<EstimateOption, usize> {
    let mut counts: BTreeMap<EstimateOption, usize> =
        options.iter().map(|&option| (option, 0)).collect();

    // Exact card faces only; near matches such as " 5" are not that card.
    let known = players
        .iter()
        .filter_map(|p| p.estimate.as_deref())
        .filter_map(|e| options.iter().copied().find(|o| o.as_str() == e));
    for option in known {
        if let Some(count) = counts.get_mut(&option) {
            *count += 1;
        }
    }

    counts
}

/// Whether the revealed table reached consensus.
///
/// Needs at least two players, all with an estimate, all the same.
pub fn should_celebrate(players: &[PlayerEstimate], revealed: bool) -> bool {
    if !revealed || players.len() < 2 {
        return false;
    }

    let mut distinct = HashSet::new();
    for player in players {
        match player.estimate.as_deref() {
            Some(estimate) => {
                distinct.insert(estimate);
            }
            None => return false,
        }
    }
    distinct.len() == 1
}

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub id: PlayerId,
    pub name: String,
    pub has_estimate: bool,
    /// Only filled in once the room is revealed.
    pub estimate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateCount {
    pub estimate: EstimateOption,
    pub count: usize,
}

/// Everything a client needs to draw a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_id: RoomId,
    pub revealed: bool,
    pub created_at: i64,
    pub seats: Vec<SeatView>,
    /// Catalog-ordered tally, empty until revealed.
    pub counts: Vec<EstimateCount>,
    pub celebrate: bool,
}

impl RoomView {
    pub fn project(room_id: RoomId, room: &Room, players: &PlayersById) -> Self {
        let seated = map_room_players(&room.players, players);
        let revealed = room.reveal_estimates;

        let counts = if revealed {
            count_estimates(&seated, &EstimateOption::ALL)
                .into_iter()
                .map(|(estimate, count)| EstimateCount { estimate, count })
                .collect()
        } else {
            Vec::new()
        };
        let celebrate = should_celebrate(&seated, revealed);

        let seats = seated
            .into_iter()
            .map(|p| SeatView {
                id: p.id,
                name: p.name,
                has_estimate: p.estimate.is_some(),
                estimate: if revealed { p.estimate } else { None },
            })
            .collect();

        Self {
            room_id,
            revealed,
            created_at: room.created_at,
            seats,
            counts,
            celebrate,
        }
    }

    /// Number of seated players who have voted.
    pub fn votes_cast(&self) -> usize {
        self.seats.iter().filter(|s| s.has_estimate).count()
    }
}

/// Message pushed to room watchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomUpdate {
    /// Current state of the room
    Room(RoomView),
    /// The room has no record (never created, or removed)
    Missing {
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
}
