//! # Planning Poker
//!
//! Rooms, players and estimate cards for a real-time planning poker table.
//!
//! Players join a room, privately pick a card from a fixed catalog, and every
//! card is revealed at once. All state lives in a key-path addressed document
//! store; the directory services in this crate are thin operations over it,
//! and the view module turns stored records into what a table displays.
//!
//! ## Core Modules
//!
//! - [`estimate`]: The card catalog
//! - [`identity`]: Stable per-client player id and display name
//! - [`store`]: Document store trait with in-memory and PostgreSQL backends
//! - [`player`]: Player directory (names and votes)
//! - [`room`]: Room directory (rosters, reveal, reset)
//! - [`view`]: Projections for display
//!
//! ## Example
//!
//! ```
//! use planning_poker::{
//!     EstimateOption, MemoryStore, PlayerService, RoomId, RoomService, RoomView,
//! };
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let rooms = RoomService::new(store.clone());
//! let players = PlayerService::new(store);
//!
//! let owner = Uuid::new_v4();
//! let room_id = RoomId::generate();
//! players.save_player(owner, "Ada").await?;
//! rooms.create_room(&room_id, owner).await?;
//! players.set_estimate(owner, Some(EstimateOption::Five)).await?;
//!
//! let room = rooms.get_room(&room_id).await?.unwrap();
//! let lookup = players.get_players(&room.players).await?;
//! let view = RoomView::project(room_id, &room, &lookup);
//! assert!(view.seats[0].has_estimate);
//! # Ok(())
//! # }
//! ```

/// Estimate card catalog.
pub mod estimate;
pub use estimate::{EstimateOption, UnknownEstimate};

/// Database connection pooling and configuration.
pub mod db;

/// Local identity persistence.
pub mod identity;
pub use identity::{Identity, IdentityError, IdentityProvider, IdentityResult};

/// Player directory.
pub mod player;
pub use player::{Player, PlayerId, PlayerService, PlayersById};

/// Room directory.
pub mod room;
pub use room::{InvalidRoomId, Room, RoomId, RoomService};

/// Key-path document store.
pub mod store;
pub use store::{MemoryStore, PgStore, Store, StoreError, StoreEvent, StorePath, StoreResult};

/// Display projections.
pub mod view;
pub use view::{
    EstimateCount, PlayerEstimate, RoomUpdate, RoomView, SeatView, count_estimates, map_room_players,
    should_celebrate,
};
