//! Room directory: rosters, the reveal flag and estimate resets.

pub mod models;
pub mod service;

pub use models::{
    InvalidRoomId, Room, RoomId, parse_roster, reveal_path, room_path, roster_path,
};
pub use service::RoomService;
