//! HTTP API client for the planning poker server.

use anyhow::{Context, Result};
use planning_poker::{EstimateOption, Player, PlayerId, RoomId, RoomView};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// API client for communicating with a planning poker server
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SavePlayerRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SetEstimateRequest {
    estimate: Option<EstimateOption>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest {
    owner_id: PlayerId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomResponse {
    room_id: RoomId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinRoomRequest {
    player_id: PlayerId,
}

#[derive(Debug, Deserialize)]
struct RosterChangeResponse {
    changed: bool,
}

#[derive(Debug, Serialize)]
struct RevealRequest {
    reveal: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Card catalog as served by the server
    pub async fn list_estimates(&self) -> Result<Vec<EstimateOption>> {
        let response = self
            .client
            .get(self.url("/api/v1/estimates"))
            .send()
            .await
            .context("Failed to send estimates request")?;

        parse_json(response, "List estimates").await
    }

    /// Save a player record, withdrawing any vote they had
    pub async fn save_player(&self, id: PlayerId, name: &str) -> Result<Player> {
        let response = self
            .client
            .put(self.url(&format!("/api/v1/players/{}", id)))
            .json(&SavePlayerRequest { name })
            .send()
            .await
            .context("Failed to send save player request")?;

        parse_json(response, "Save player").await
    }

    /// Get a player record, `None` when the server has none
    pub async fn get_player(&self, id: PlayerId) -> Result<Option<Player>> {
        let response = self
            .client
            .get(self.url(&format!("/api/v1/players/{}", id)))
            .send()
            .await
            .context("Failed to send get player request")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_json(response, "Get player").await.map(Some)
    }

    /// Vote, or withdraw with `None`
    pub async fn set_estimate(&self, id: PlayerId, estimate: Option<EstimateOption>) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("/api/v1/players/{}/estimate", id)))
            .json(&SetEstimateRequest { estimate })
            .send()
            .await
            .context("Failed to send estimate request")?;

        expect_success(response, "Set estimate").await
    }

    /// Open a room owned by `owner`, returning the generated id
    pub async fn create_room(&self, owner: PlayerId) -> Result<RoomId> {
        let response = self
            .client
            .post(self.url("/api/v1/rooms"))
            .json(&CreateRoomRequest { owner_id: owner })
            .send()
            .await
            .context("Failed to send create room request")?;

        let created: CreateRoomResponse = parse_json(response, "Create room").await?;
        Ok(created.room_id)
    }

    /// Current view of a room, `None` when the room does not exist
    pub async fn get_room(&self, room_id: &RoomId) -> Result<Option<RoomView>> {
        let response = self
            .client
            .get(self.url(&format!("/api/v1/rooms/{}", room_id)))
            .send()
            .await
            .context("Failed to send get room request")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_json(response, "Get room").await.map(Some)
    }

    /// Sit down in a room. Returns whether the roster changed.
    pub async fn join_room(&self, room_id: &RoomId, player: PlayerId) -> Result<bool> {
        let response = self
            .client
            .post(self.url(&format!("/api/v1/rooms/{}/players", room_id)))
            .json(&JoinRoomRequest { player_id: player })
            .send()
            .await
            .context("Failed to send join request")?;

        let change: RosterChangeResponse = parse_json(response, "Join room").await?;
        Ok(change.changed)
    }

    /// Leave a room. Returns whether the roster changed.
    pub async fn leave_room(&self, room_id: &RoomId, player: PlayerId) -> Result<bool> {
        let response = self
            .client
            .delete(self.url(&format!("/api/v1/rooms/{}/players/{}", room_id, player)))
            .send()
            .await
            .context("Failed to send leave request")?;

        let change: RosterChangeResponse = parse_json(response, "Leave room").await?;
        Ok(change.changed)
    }

    /// Empty the roster of a room
    pub async fn clear_room(&self, room_id: &RoomId) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/v1/rooms/{}/players", room_id)))
            .send()
            .await
            .context("Failed to send clear request")?;

        expect_success(response, "Clear room").await
    }

    /// Show or hide the cards
    pub async fn set_reveal(&self, room_id: &RoomId, reveal: bool) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("/api/v1/rooms/{}/reveal", room_id)))
            .json(&RevealRequest { reveal })
            .send()
            .await
            .context("Failed to send reveal request")?;

        expect_success(response, "Reveal").await
    }

    /// Withdraw every seated vote and hide the cards
    pub async fn reset_room(&self, room_id: &RoomId) -> Result<()> {
        let response = self
            .client
            .post(self.url(&format!("/api/v1/rooms/{}/reset", room_id)))
            .send()
            .await
            .context("Failed to send reset request")?;

        expect_success(response, "Reset room").await
    }

    /// WebSocket URL watching a room
    pub fn websocket_url(&self, room_id: &RoomId) -> String {
        let ws_url = self
            .base_url
            .replacen("http://", "ws://", 1)
            .replacen("https://", "wss://", 1);
        format!("{}/ws/rooms/{}", ws_url, room_id)
    }
}

/// Turn a non-success response into an error carrying the server's message
async fn check_status(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("Failed to read error response: {}", e));
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    anyhow::bail!("{} failed ({}): {}", action, status, message)
}

async fn expect_success(response: Response, action: &str) -> Result<()> {
    check_status(response, action).await?;
    Ok(())
}

async fn parse_json<T: DeserializeOwned>(response: Response, action: &str) -> Result<T> {
    check_status(response, action)
        .await?
        .json()
        .await
        .with_context(|| format!("Failed to parse {} response", action.to_lowercase()))
}
