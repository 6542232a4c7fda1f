//! Internal modules for the planning poker client.
//!
//! This library provides command parsing, the HTTP API client, the room
//! watcher and the session that ties them to the local identity.

pub mod api_client;
pub mod commands;
pub mod session;
pub mod websocket_client;
