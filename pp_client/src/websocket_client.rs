//! WebSocket client for live room views.

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use planning_poker::{RoomUpdate, RoomView};
use std::fmt::Write;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Follows one room until the server hangs up or the user interrupts
pub struct RoomWatcher {
    ws_url: String,
}

impl RoomWatcher {
    pub fn new(ws_url: String) -> Self {
        Self { ws_url }
    }

    /// Connect and hand every update to `on_update` until the stream ends.
    ///
    /// Returns once the server closes the socket or Ctrl-C is pressed.
    pub async fn watch<F>(self, mut on_update: F) -> Result<()>
    where
        F: FnMut(&RoomUpdate),
    {
        let (ws_stream, _) = connect_async(&self.ws_url)
            .await
            .context("Failed to connect to WebSocket")?;
        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<RoomUpdate>(text.as_str()) {
                            Ok(update) => on_update(&update),
                            Err(e) => eprintln!("Failed to parse room update: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return Err(e).context("WebSocket error");
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    break;
                }
            }
        }

        let _ = write.close().await;
        Ok(())
    }
}

/// Text rendering of a room update
pub fn render_update(update: &RoomUpdate) -> String {
    match update {
        RoomUpdate::Room(view) => render_room(view),
        RoomUpdate::Missing { room_id } => format!("Room {} does not exist\n", room_id),
    }
}

/// Text rendering of a room for the terminal
pub fn render_room(view: &RoomView) -> String {
    let mut out = String::new();
    let rule = "═".repeat(48);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "ROOM {}  [{}]  {}/{} voted",
        view.room_id,
        if view.revealed { "revealed" } else { "hidden" },
        view.votes_cast(),
        view.seats.len()
    );
    let _ = writeln!(out, "{}", "─".repeat(48));

    if view.seats.is_empty() {
        let _ = writeln!(out, "No players in the room");
    }
    for seat in &view.seats {
        let card = match (&seat.estimate, seat.has_estimate) {
            (Some(estimate), _) => estimate.as_str(),
            (None, true) => "✓",
            (None, false) => "…",
        };
        let _ = writeln!(out, "  {:<32} {:>5}", seat.name, card);
    }

    let tally: Vec<String> = view
        .counts
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| format!("{}×{}", c.estimate, c.count))
        .collect();
    if !tally.is_empty() {
        let _ = writeln!(out, "{}", "─".repeat(48));
        let _ = writeln!(out, "Votes: {}", tally.join("  "));
    }
    if view.celebrate {
        let _ = writeln!(out, "Consensus!");
    }

    let _ = writeln!(out, "{}", rule);
    out
}
