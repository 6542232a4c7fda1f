//! HTTP/WebSocket API for the planning poker server.
//!
//! # Modules
//!
//! - [`players`]: Player records and votes
//! - [`rooms`]: Room lifecycle, roster, reveal and reset
//! - [`websocket`]: Live room views pushed on every relevant change
//! - [`request_id`]: Request correlation ids
//! - [`error`]: Error to HTTP response mapping
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                                  - Store reachability
//! GET    /api/v1/estimates                        - Card catalog
//! PUT    /api/v1/players/{player_id}              - Save player (resets their vote)
//! GET    /api/v1/players/{player_id}              - Get player
//! PUT    /api/v1/players/{player_id}/estimate     - Vote or withdraw
//! POST   /api/v1/rooms                            - Create room with a fresh id
//! GET    /api/v1/rooms/{room_id}                  - Room view
//! POST   /api/v1/rooms/{room_id}/players          - Join
//! DELETE /api/v1/rooms/{room_id}/players          - Clear roster
//! DELETE /api/v1/rooms/{room_id}/players/{id}     - Leave
//! PUT    /api/v1/rooms/{room_id}/reveal           - Show or hide cards
//! POST   /api/v1/rooms/{room_id}/reset            - Clear votes and hide cards
//! GET    /ws/rooms/{room_id}                      - Watch a room
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively; browser clients are expected on other origins.

pub mod error;
pub mod players;
pub mod request_id;
pub mod rooms;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
};
use planning_poker::{EstimateOption, PlayerService, RoomService, Store};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned per request; every field is a cheap handle on the same store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub rooms: RoomService,
    pub players: PlayerService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            rooms: RoomService::new(store.clone()),
            players: PlayerService::new(store.clone()),
            store,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use pp_server::api::{create_router, AppState};
/// # use planning_poker::MemoryStore;
/// # use std::sync::Arc;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let app = create_router(AppState::new(Arc::new(MemoryStore::new())));
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ws/rooms/{room_id}", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router() -> Router<AppState> {
    let player_routes = Router::new()
        .route(
            "/players/{player_id}",
            get(players::get_player).put(players::save_player),
        )
        .route("/players/{player_id}/estimate", put(players::set_estimate));

    let room_routes = Router::new()
        .route("/rooms", post(rooms::create_room))
        .route("/rooms/{room_id}", get(rooms::get_room))
        .route(
            "/rooms/{room_id}/players",
            post(rooms::join_room).delete(rooms::clear_room),
        )
        .route(
            "/rooms/{room_id}/players/{player_id}",
            delete(rooms::leave_room),
        )
        .route("/rooms/{room_id}/reveal", put(rooms::set_reveal))
        .route("/rooms/{room_id}/reset", post(rooms::reset_room));

    Router::new()
        .route("/estimates", get(list_estimates))
        .merge(player_routes)
        .merge(room_routes)
}

/// The card catalog in display order.
async fn list_estimates() -> Json<Vec<EstimateOption>> {
    Json(EstimateOption::ALL.to_vec())
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"0.1.0","store":true,"timestamp":"2026-01-01T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            false
        }
    };

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
