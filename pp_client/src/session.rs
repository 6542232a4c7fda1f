//! Runs parsed commands against a server on behalf of the local identity.

use crate::{
    api_client::ApiClient,
    commands::Command,
    websocket_client::{render_room, render_update},
};
use anyhow::{Context, Result};
use planning_poker::{IdentityProvider, Player, PlayerId, RoomId, RoomUpdate};

pub struct Session {
    api: ApiClient,
    identity: IdentityProvider,
    default_name: String,
}

impl Session {
    /// `default_name` is used when the identity has no name yet.
    pub fn new(api: ApiClient, identity: IdentityProvider, default_name: impl Into<String>) -> Self {
        Self {
            api,
            identity,
            default_name: default_name.into(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Local player id, generated on first use.
    pub fn player_id(&self) -> PlayerId {
        self.identity.get_or_create_id()
    }

    /// Local display name, falling back to the default.
    pub fn display_name(&self) -> String {
        let name = self.identity.name();
        if name.is_empty() {
            self.default_name.clone()
        } else {
            name
        }
    }

    /// Makes sure the server knows the local player, saving them if not.
    async fn ensure_player(&self) -> Result<Player> {
        let id = self.player_id();
        match self.api.get_player(id).await? {
            Some(player) => Ok(player),
            None => self.api.save_player(id, &self.display_name()).await,
        }
    }

    async fn room_report(&self, room_id: &RoomId) -> Result<String> {
        let update = match self.api.get_room(room_id).await? {
            Some(view) => RoomUpdate::Room(view),
            None => RoomUpdate::Missing {
                room_id: room_id.clone(),
            },
        };
        Ok(render_update(&update))
    }

    /// Execute one command and return what should be printed.
    ///
    /// `watch` only yields one snapshot here; following the room live is up
    /// to the caller, through [`ApiClient::websocket_url`].
    pub async fn execute(&self, command: Command) -> Result<String> {
        match command {
            Command::WhoAmI => Ok(format!("{} ({})\n", self.display_name(), self.player_id())),
            Command::Cards => {
                let cards = self.api.list_estimates().await?;
                Ok(format!(
                    "{}\n",
                    cards.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(" ")
                ))
            }
            Command::Name(name) => {
                let name = self
                    .identity
                    .set_name(&name)
                    .context("Failed to store display name")?;
                if name.is_empty() {
                    anyhow::bail!("Name must not be empty");
                }
                let player = self.api.save_player(self.player_id(), &name).await?;
                Ok(format!("You are now {}\n", player.name))
            }
            Command::Rejoin { id, name } => {
                self.identity
                    .set_player_and_name(id, &name)
                    .context("Failed to store identity")?;
                let name = self.identity.name();
                let player = match self.api.get_player(id).await? {
                    Some(player) if player.name == name => player,
                    // A different name is a rename, which also withdraws the vote
                    _ => self.api.save_player(id, &name).await?,
                };
                Ok(format!("Rejoined as {} ({})\n", player.name, player.id))
            }
            Command::Create => {
                let player = self.ensure_player().await?;
                let room_id = self.api.create_room(player.id).await?;
                Ok(format!(
                    "Created room {}\n{}",
                    room_id,
                    self.room_report(&room_id).await?
                ))
            }
            Command::Join(room_id) => {
                let player = self.ensure_player().await?;
                let changed = self.api.join_room(&room_id, player.id).await?;
                let headline = if changed {
                    format!("Joined room {}", room_id)
                } else {
                    format!("Already in room {}", room_id)
                };
                Ok(format!("{}\n{}", headline, self.room_report(&room_id).await?))
            }
            Command::Leave(room_id) => {
                let changed = self.api.leave_room(&room_id, self.player_id()).await?;
                Ok(if changed {
                    format!("Left room {}\n", room_id)
                } else {
                    format!("You were not in room {}\n", room_id)
                })
            }
            Command::Vote { room_id, estimate } => {
                let player = self.ensure_player().await?;
                self.api.set_estimate(player.id, estimate).await?;
                self.room_report(&room_id).await
            }
            Command::Reveal(room_id) => {
                self.api.set_reveal(&room_id, true).await?;
                self.room_report(&room_id).await
            }
            Command::Hide(room_id) => {
                self.api.set_reveal(&room_id, false).await?;
                self.room_report(&room_id).await
            }
            Command::Reset(room_id) => {
                self.api.reset_room(&room_id).await?;
                self.room_report(&room_id).await
            }
            Command::Clear(room_id) => {
                self.api.clear_room(&room_id).await?;
                self.room_report(&room_id).await
            }
            Command::Show(room_id) => self.room_report(&room_id).await,
            Command::Watch(room_id) => {
                match self.api.get_room(&room_id).await? {
                    Some(view) => Ok(render_room(&view)),
                    None => anyhow::bail!("Room {} does not exist", room_id),
                }
            }
        }
    }
}
