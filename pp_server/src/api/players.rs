//! Player API handlers.
//!
//! # Examples
//!
//! Save yourself under a display name (this also withdraws your vote):
//! ```bash
//! curl -X PUT http://localhost:6969/api/v1/players/$ID \
//!   -H "Content-Type: application/json" -d '{"name": "Ada"}'
//! ```
//!
//! Vote, or withdraw with `null`:
//! ```bash
//! curl -X PUT http://localhost:6969/api/v1/players/$ID/estimate \
//!   -H "Content-Type: application/json" -d '{"estimate": "5"}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use planning_poker::{EstimateOption, Player};
use serde::{Deserialize, Serialize};

use super::{
    AppState,
    error::{ApiError, parse_player_id},
};
use crate::metrics;

/// Longest accepted display name, in characters
pub const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Serialize, Deserialize)]
pub struct SavePlayerRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetEstimateRequest {
    /// Card face, or `null` to withdraw
    pub estimate: Option<String>,
}

/// Create or overwrite a player record.
///
/// The name is trimmed and must not be empty. The stored estimate is always
/// reset to null.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid player id or name
pub async fn save_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(request): Json<SavePlayerRequest>,
) -> Result<Json<Player>, ApiError> {
    let player_id = parse_player_id(&player_id)?;
    let name = request.name.trim();

    if name.is_empty() {
        return Err(ApiError::InvalidInput("Name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::InvalidInput(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }

    let player = state.players.save_player(player_id, name).await?;
    Ok(Json(player))
}

/// Get a player record.
///
/// # Errors
///
/// - `404 Not Found`: No record for this id
pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<Player>, ApiError> {
    let player_id = parse_player_id(&player_id)?;

    state
        .players
        .get_player(player_id)
        .await?
        .map(Json)
        .ok_or(ApiError::PlayerNotFound(player_id))
}

/// Set or clear a player's estimate.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid player id or a card outside the catalog
pub async fn set_estimate(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(request): Json<SetEstimateRequest>,
) -> Result<StatusCode, ApiError> {
    let player_id = parse_player_id(&player_id)?;
    let estimate = request
        .estimate
        .as_deref()
        .map(str::parse::<EstimateOption>)
        .transpose()?;

    state.players.set_estimate(player_id, estimate).await?;
    metrics::votes_total(estimate.is_none());

    Ok(StatusCode::NO_CONTENT)
}
