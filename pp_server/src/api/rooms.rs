//! Room API handlers.
//!
//! Every endpoint except room creation answers `404 Not Found` for a room id
//! with no record, so stray writes never bring a room into existence.
//!
//! # Examples
//!
//! Open a room:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/rooms \
//!   -H "Content-Type: application/json" -d '{"ownerId": "'$ID'"}'
//! ```
//!
//! Reveal the cards:
//! ```bash
//! curl -X PUT http://localhost:6969/api/v1/rooms/123456/reveal \
//!   -H "Content-Type: application/json" -d '{"reveal": true}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use planning_poker::{PlayerId, Room, RoomId, RoomView, StoreResult};
use serde::{Deserialize, Serialize};

use super::{
    AppState,
    error::{ApiError, parse_player_id},
    request_id::RequestId,
};
use crate::metrics;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub owner_id: PlayerId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: RoomId,
    pub room: Room,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RosterChangeResponse {
    /// Whether the roster changed
    pub changed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevealRequest {
    pub reveal: bool,
}

/// Load a room and project it together with its players.
pub async fn load_room_view(
    state: &AppState,
    room_id: &RoomId,
) -> StoreResult<Option<(Room, RoomView)>> {
    let Some(room) = state.rooms.get_room(room_id).await? else {
        return Ok(None);
    };
    let players = state.players.get_players(&room.players).await?;
    let view = RoomView::project(room_id.clone(), &room, &players);
    Ok(Some((room, view)))
}

async fn require_room(state: &AppState, room_id: &str) -> Result<RoomId, ApiError> {
    let room_id: RoomId = room_id.parse()?;
    match state.rooms.get_room(&room_id).await? {
        Some(_) => Ok(room_id),
        None => Err(ApiError::RoomNotFound(room_id)),
    }
}

/// Create a room under a freshly generated id with the owner seated.
///
/// # Response
///
/// Returns `201 Created`:
/// ```json
/// {
///   "roomId": "482913",
///   "room": {"players": ["..."], "revealEstimates": false, "createdAt": 1700000000000}
/// }
/// ```
pub async fn create_room(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    let room_id = RoomId::generate();
    let room = state.rooms.create_room(&room_id, request.owner_id).await?;

    metrics::rooms_created_total();
    tracing::info!(
        request_id = %request_id.as_str(),
        room_id = %room_id,
        owner = %request.owner_id,
        "Room created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse { room_id, room }),
    ))
}

/// Get the projected room view.
///
/// Estimates stay masked until the room is revealed.
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomView>, ApiError> {
    let room_id: RoomId = room_id.parse()?;

    match load_room_view(&state, &room_id).await? {
        Some((_, view)) => Ok(Json(view)),
        None => Err(ApiError::RoomNotFound(room_id)),
    }
}

/// Add a player to the roster; joining twice is a no-op.
pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<RosterChangeResponse>, ApiError> {
    let room_id = require_room(&state, &room_id).await?;
    let changed = state.rooms.add_player(&room_id, request.player_id).await?;

    if changed {
        metrics::room_joins_total();
    }
    Ok(Json(RosterChangeResponse { changed }))
}

/// Remove a player from the roster.
pub async fn leave_room(
    State(state): State<AppState>,
    Path((room_id, player_id)): Path<(String, String)>,
) -> Result<Json<RosterChangeResponse>, ApiError> {
    let room_id = require_room(&state, &room_id).await?;
    let player_id = parse_player_id(&player_id)?;
    let changed = state.rooms.remove_player(&room_id, player_id).await?;

    Ok(Json(RosterChangeResponse { changed }))
}

/// Remove the whole roster; player estimates are left alone.
pub async fn clear_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let room_id = require_room(&state, &room_id).await?;
    state.rooms.clear_room(&room_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Show or hide everyone's cards.
pub async fn set_reveal(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<RevealRequest>,
) -> Result<StatusCode, ApiError> {
    let room_id = require_room(&state, &room_id).await?;
    state.rooms.set_reveal(&room_id, request.reveal).await?;
    metrics::reveals_total(request.reveal);

    Ok(StatusCode::NO_CONTENT)
}

/// Clear every seated player's vote and hide the cards.
pub async fn reset_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let room_id = require_room(&state, &room_id).await?;
    state.rooms.reset_estimates(&room_id).await?;
    metrics::resets_total();

    Ok(StatusCode::NO_CONTENT)
}
