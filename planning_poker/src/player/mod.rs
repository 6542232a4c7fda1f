//! Player directory: one document per player, keyed by player id.

pub mod models;
pub mod service;

pub use models::{Player, PlayerId, PlayersById, estimate_path, player_path};
pub use service::PlayerService;
