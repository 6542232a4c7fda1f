//! API error type and its JSON response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use planning_poker::{InvalidRoomId, PlayerId, RoomId, StoreError, UnknownEstimate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::RoomNotFound(_) | ApiError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::InvalidPath { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to API clients
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Store(e) => e.client_message(),
            other => other.to_string(),
        }
    }
}

impl From<InvalidRoomId> for ApiError {
    fn from(e: InvalidRoomId) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

impl From<UnknownEstimate> for ApiError {
    fn from(e: UnknownEstimate) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.client_message(),
            }),
        )
            .into_response()
    }
}

/// Parse a player id path segment
pub fn parse_player_id(raw: &str) -> Result<PlayerId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::InvalidInput(format!("Invalid player id: {:?}", raw)))
}
