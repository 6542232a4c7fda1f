//! Command-line client for a planning poker server.
//!
//! Keeps the local player identity in a JSON file and runs one command per
//! invocation; `watch` follows a room live until interrupted.

use anyhow::{Context, Result};
use pico_args::Arguments;
use planning_poker::identity::{FileStorage, IdentityProvider};
use std::{path::PathBuf, sync::Arc};

use pp_client::{
    api_client::ApiClient,
    commands::{Command, parse_command},
    session::Session,
    websocket_client::{RoomWatcher, render_update},
};

const HELP: &str = "\
Play planning poker against a server

USAGE:
  pp_client [OPTIONS] COMMAND

OPTIONS:
  --server URL          Server URL  [default: http://localhost:6969]
  --identity FILE       Identity file  [default: ~/.planning_poker/identity.json]

COMMANDS:
  whoami                Show your player id and name
  name NAME             Change your display name (withdraws your vote)
  rejoin ID NAME        Continue as an earlier player
  cards                 List the estimate cards
  create                Open a new room and sit down
  join ROOM             Sit down in a room
  leave ROOM            Leave a room
  vote ROOM CARD|none   Lay down or withdraw a card
  reveal ROOM           Show everyone's cards
  hide ROOM             Hide the cards again
  reset ROOM            Withdraw all votes and hide the cards
  clear ROOM            Remove everyone from the room
  show ROOM             Print the room once
  watch ROOM            Follow the room live (Ctrl-C to stop)

FLAGS:
  -h, --help            Print help information
";

struct Args {
    server_url: String,
    identity_file: PathBuf,
    command: String,
}

fn default_identity_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".planning_poker")
        .join("identity.json")
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let server_url = pargs
        .opt_value_from_str("--server")?
        .unwrap_or_else(|| "http://localhost:6969".to_string());
    let identity_file = pargs
        .opt_value_from_str("--identity")?
        .unwrap_or_else(default_identity_file);
    let command = pargs
        .finish()
        .into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");

    run(Args {
        server_url,
        identity_file,
        command,
    })
    .await
}

async fn run(args: Args) -> Result<()> {
    let command = parse_command(&args.command)?;

    let storage = FileStorage::open(&args.identity_file).with_context(|| {
        format!(
            "Failed to open identity file {}",
            args.identity_file.display()
        )
    })?;
    let identity = IdentityProvider::new(Arc::new(storage));
    let session = Session::new(ApiClient::new(args.server_url), identity, whoami::username());

    match command {
        Command::Watch(room_id) => {
            let watcher = RoomWatcher::new(session.api().websocket_url(&room_id));
            watcher
                .watch(|update| {
                    // Clear screen and move cursor to top
                    print!("\x1B[2J\x1B[1;1H");
                    print!("{}", render_update(update));
                })
                .await?;
            println!("\nStopped watching room {}.", room_id);
        }
        command => print!("{}", session.execute(command).await?),
    }

    Ok(())
}
