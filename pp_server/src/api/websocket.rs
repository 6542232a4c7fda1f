//! WebSocket handler for live room views.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/rooms/{room_id}`
//! 2. Server subscribes to the store change feed, then sends the current view
//! 3. Whenever a write touches the room or one of its rostered players, the
//!    room is projected again and sent if it changed
//! 4. The connection ends when the client closes it
//!
//! The socket is read-only for clients: changes go through the HTTP API.
//!
//! # Server Messages
//!
//! ```json
//! {"type": "room", "roomId": "123456", "revealed": false, "seats": [...], ...}
//! {"type": "missing", "roomId": "123456"}
//! ```

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use log::{error, info, warn};
use planning_poker::{
    PlayerId, RoomId, RoomUpdate, StoreEvent,
    player::player_path,
    room::room_path,
};
use tokio::sync::broadcast::error::RecvError;

use super::{AppState, error::ApiError, rooms::load_room_view};
use crate::metrics;

/// Upgrade HTTP connection to WebSocket for watching a room.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed room id
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let room_id: RoomId = room_id.parse()?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, room_id, state)))
}

/// What to do with one item from the change feed.
#[derive(Debug, PartialEq, Eq)]
enum FeedAction {
    /// Project the room again.
    Refresh,
    /// The change cannot affect this room.
    Skip,
    /// The feed is gone.
    Stop,
}

/// Tracks what the watcher last saw, to decide which store events matter.
struct Watch {
    room_id: RoomId,
    roster: Vec<PlayerId>,
    last_sent: Option<RoomUpdate>,
}

impl Watch {
    fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            roster: Vec::new(),
            last_sent: None,
        }
    }

    /// Whether `event` can change what this watcher sees.
    fn is_relevant(&self, event: &StoreEvent) -> bool {
        event.touches(&room_path(&self.room_id))
            || self
                .roster
                .iter()
                .any(|id| event.touches(&player_path(*id)))
    }

    /// Decide how to react to a change feed item.
    ///
    /// A lagged receiver lost events it cannot inspect, so it always refreshes.
    fn on_feed(&self, item: Result<StoreEvent, RecvError>) -> FeedAction {
        match item {
            Ok(event) if self.is_relevant(&event) => FeedAction::Refresh,
            Ok(_) => FeedAction::Skip,
            Err(RecvError::Lagged(skipped)) => {
                warn!(
                    "Room {} watcher lagged by {} changes, resynchronizing",
                    self.room_id, skipped
                );
                FeedAction::Refresh
            }
            Err(RecvError::Closed) => FeedAction::Stop,
        }
    }

    /// Project the room; `None` when nothing changed since the last send.
    async fn refresh(&mut self, state: &AppState) -> Result<Option<String>, ApiError> {
        let update = match load_room_view(state, &self.room_id).await? {
            Some((room, view)) => {
                self.roster = room.players;
                RoomUpdate::Room(view)
            }
            None => {
                self.roster.clear();
                RoomUpdate::Missing {
                    room_id: self.room_id.clone(),
                }
            }
        };

        if self.last_sent.as_ref() == Some(&update) {
            return Ok(None);
        }

        let json = serde_json::to_string(&update)
            .map_err(|e| ApiError::Store(planning_poker::StoreError::Serialization(e)))?;
        self.last_sent = Some(update);
        Ok(Some(json))
    }
}

/// Send the current view when it changed. Returns false once the socket is gone.
async fn push(
    sender: &mut SplitSink<WebSocket, Message>,
    watch: &mut Watch,
    state: &AppState,
) -> bool {
    match watch.refresh(state).await {
        Ok(Some(json)) => {
            if sender.send(Message::Text(json.into())).await.is_err() {
                return false;
            }
            metrics::websocket_messages_sent();
            true
        }
        Ok(None) => true,
        Err(e) => {
            // Keep the connection; the next change retries the projection.
            error!("Failed to project room {}: {}", watch.room_id, e);
            true
        }
    }
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, room_id: RoomId, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the first projection so no write slips in between.
    let mut changes = state.store.subscribe();
    let mut watch = Watch::new(room_id);

    info!("WebSocket connected: room={}", watch.room_id);
    metrics::websocket_connected();

    if push(&mut sender, &mut watch, &state).await {
        loop {
            tokio::select! {
                item = changes.recv() => {
                    match watch.on_feed(item) {
                        FeedAction::Refresh => {}
                        FeedAction::Skip => continue,
                        FeedAction::Stop => break,
                    }

                    if !push(&mut sender, &mut watch, &state).await {
                        break;
                    }
                }
                msg = receiver.next() => {
                    match msg {
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            warn!("WebSocket error on room {}: {}", watch.room_id, e);
                            break;
                        }
                        // Pings are answered by axum; anything else is ignored.
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    }

    metrics::websocket_disconnected();
    info!("WebSocket disconnected: room={}", watch.room_id);
}
