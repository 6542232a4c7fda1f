use planning_poker::{EstimateOption, PlayerId, RoomId};
use std::fmt;
use uuid::Uuid;

/// A single client invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the local identity.
    WhoAmI,
    /// Change the display name (withdraws the current vote).
    Name(String),
    /// Take over an earlier player id and name.
    Rejoin { id: PlayerId, name: String },
    /// Open a room with a fresh id and sit down in it.
    Create,
    Join(RoomId),
    Leave(RoomId),
    /// Lay down a card, or withdraw with `None`.
    Vote {
        room_id: RoomId,
        estimate: Option<EstimateOption>,
    },
    Reveal(RoomId),
    Hide(RoomId),
    Reset(RoomId),
    Clear(RoomId),
    Show(RoomId),
    Watch(RoomId),
    /// List the card catalog.
    Cards,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing to run.
    Empty,
    /// A required argument was left out.
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    InvalidRoomId(String),
    InvalidPlayerId(String),
    /// Card not in the catalog.
    UnknownCard(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "No command given. Run with --help to see available commands"),
            Self::MissingArgument { command, argument } => {
                write!(f, "'{}' requires {} (e.g., '{} {}')", command, argument, command, argument)
            }
            Self::InvalidRoomId(value) => write!(f, "Invalid room id '{}'", value),
            Self::InvalidPlayerId(value) => {
                write!(f, "Invalid player id '{}'. Must be a UUID", value)
            }
            Self::UnknownCard(value) => write!(
                f,
                "Unknown card '{}'. Pick one of {} or 'none'",
                value,
                catalog()
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Run with --help to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

fn catalog() -> String {
    EstimateOption::ALL
        .iter()
        .map(EstimateOption::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a command line into a [`Command`].
///
/// Names may contain spaces: everything after the command (or after the
/// player id for `rejoin`) is taken as the name.
///
/// # Examples
///
/// ```
/// use planning_poker::EstimateOption;
/// use pp_client::commands::{Command, parse_command};
///
/// assert_eq!(parse_command("cards"), Ok(Command::Cards));
/// assert_eq!(parse_command("name Ada Lovelace"), Ok(Command::Name("Ada Lovelace".to_string())));
/// assert!(matches!(
///     parse_command("vote 123456 8"),
///     Ok(Command::Vote { estimate: Some(EstimateOption::Eight), .. })
/// ));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };

    match head {
        "" => Err(ParseError::Empty),
        "whoami" => Ok(Command::WhoAmI),
        "cards" => Ok(Command::Cards),
        "create" => Ok(Command::Create),
        "name" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument {
                    command: "name",
                    argument: "NAME",
                });
            }
            Ok(Command::Name(rest.to_string()))
        }
        "rejoin" => parse_rejoin_command(rest),
        "vote" => parse_vote_command(rest),
        "join" => room_argument("join", rest).map(Command::Join),
        "leave" => room_argument("leave", rest).map(Command::Leave),
        "reveal" => room_argument("reveal", rest).map(Command::Reveal),
        "hide" => room_argument("hide", rest).map(Command::Hide),
        "reset" => room_argument("reset", rest).map(Command::Reset),
        "clear" => room_argument("clear", rest).map(Command::Clear),
        "show" => room_argument("show", rest).map(Command::Show),
        "watch" => room_argument("watch", rest).map(Command::Watch),
        other => Err(ParseError::UnrecognizedCommand(other.to_string())),
    }
}

fn room_argument(command: &'static str, value: &str) -> Result<RoomId, ParseError> {
    let value = value.split_whitespace().next().ok_or(ParseError::MissingArgument {
        command,
        argument: "ROOM",
    })?;
    value
        .parse()
        .map_err(|_| ParseError::InvalidRoomId(value.to_string()))
}

/// Parse a rejoin command: "rejoin ID NAME"
fn parse_rejoin_command(rest: &str) -> Result<Command, ParseError> {
    let (raw_id, name) = match rest.split_once(char::is_whitespace) {
        Some((id, name)) => (id, name.trim()),
        None => (rest, ""),
    };
    if raw_id.is_empty() {
        return Err(ParseError::MissingArgument {
            command: "rejoin",
            argument: "ID NAME",
        });
    }

    let id = Uuid::parse_str(raw_id).map_err(|_| ParseError::InvalidPlayerId(raw_id.to_string()))?;
    if name.is_empty() {
        return Err(ParseError::MissingArgument {
            command: "rejoin",
            argument: "ID NAME",
        });
    }

    Ok(Command::Rejoin {
        id,
        name: name.to_string(),
    })
}

/// Parse a vote command: "vote ROOM CARD" or "vote ROOM none"
fn parse_vote_command(rest: &str) -> Result<Command, ParseError> {
    let mut parts = rest.split_whitespace();
    let room_id = room_argument("vote", parts.next().unwrap_or_default())?;
    let card = parts.next().ok_or(ParseError::MissingArgument {
        command: "vote",
        argument: "CARD",
    })?;

    let estimate = match card {
        "none" => None,
        card => Some(
            card.parse::<EstimateOption>()
                .map_err(|_| ParseError::UnknownCard(card.to_string()))?,
        ),
    };

    Ok(Command::Vote { room_id, estimate })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        id.parse().unwrap()
    }

    // === Single-word command tests ===

    #[test]
    fn test_parse_single_word_commands() {
        assert_eq!(parse_command("whoami"), Ok(Command::WhoAmI));
        assert_eq!(parse_command("cards"), Ok(Command::Cards));
        assert_eq!(parse_command("create"), Ok(Command::Create));
    }

    #[test]
    fn test_parse_room_commands() {
        assert_eq!(parse_command("join 123456"), Ok(Command::Join(room("123456"))));
        assert_eq!(parse_command("leave 123456"), Ok(Command::Leave(room("123456"))));
        assert_eq!(parse_command("reveal 1"), Ok(Command::Reveal(room("1"))));
        assert_eq!(parse_command("hide 1"), Ok(Command::Hide(room("1"))));
        assert_eq!(parse_command("reset 1"), Ok(Command::Reset(room("1"))));
        assert_eq!(parse_command("clear 1"), Ok(Command::Clear(room("1"))));
        assert_eq!(parse_command("show 1"), Ok(Command::Show(room("1"))));
        assert_eq!(parse_command("watch 1"), Ok(Command::Watch(room("1"))));
    }

    // === Whitespace handling ===

    #[test]
    fn test_parse_with_surrounding_whitespace() {
        assert_eq!(parse_command("  join   42  "), Ok(Command::Join(room("42"))));
        assert_eq!(parse_command("cards\n"), Ok(Command::Cards));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_command(""), Err(ParseError::Empty));
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
    }

    // === Names ===

    #[test]
    fn test_parse_name_keeps_spaces() {
        assert_eq!(
            parse_command("name   Ada  Lovelace "),
            Ok(Command::Name("Ada  Lovelace".to_string()))
        );
        assert!(matches!(
            parse_command("name"),
            Err(ParseError::MissingArgument { command: "name", .. })
        ));
    }

    #[test]
    fn test_parse_rejoin() {
        let id = Uuid::new_v4();

        assert_eq!(
            parse_command(&format!("rejoin {} Grace Hopper", id)),
            Ok(Command::Rejoin {
                id,
                name: "Grace Hopper".to_string()
            })
        );
        assert_eq!(
            parse_command("rejoin user-1 Grace"),
            Err(ParseError::InvalidPlayerId("user-1".to_string()))
        );
        assert!(matches!(
            parse_command(&format!("rejoin {}", id)),
            Err(ParseError::MissingArgument { command: "rejoin", .. })
        ));
    }

    // === Votes ===

    #[test]
    fn test_parse_vote() {
        assert_eq!(
            parse_command("vote 123456 0.5"),
            Ok(Command::Vote {
                room_id: room("123456"),
                estimate: Some(EstimateOption::Half)
            })
        );
        assert_eq!(
            parse_command("vote 123456 ☕"),
            Ok(Command::Vote {
                room_id: room("123456"),
                estimate: Some(EstimateOption::Break)
            })
        );
    }

    #[test]
    fn test_parse_vote_none_withdraws() {
        assert_eq!(
            parse_command("vote 123456 none"),
            Ok(Command::Vote {
                room_id: room("123456"),
                estimate: None
            })
        );
    }

    #[test]
    fn test_parse_vote_errors() {
        assert_eq!(
            parse_command("vote 123456 7"),
            Err(ParseError::UnknownCard("7".to_string()))
        );
        assert!(matches!(
            parse_command("vote 123456"),
            Err(ParseError::MissingArgument { argument: "CARD", .. })
        ));
        assert!(matches!(
            parse_command("vote"),
            Err(ParseError::MissingArgument { argument: "ROOM", .. })
        ));
    }

    // === Errors ===

    #[test]
    fn test_missing_room() {
        assert_eq!(
            parse_command("join"),
            Err(ParseError::MissingArgument {
                command: "join",
                argument: "ROOM"
            })
        );
    }

    #[test]
    fn test_invalid_room_id() {
        assert_eq!(
            parse_command("show a/b"),
            Err(ParseError::InvalidRoomId("a/b".to_string()))
        );
    }

    #[test]
    fn test_unrecognized_command() {
        assert_eq!(
            parse_command("fold"),
            Err(ParseError::UnrecognizedCommand("fold".to_string()))
        );
    }

    #[test]
    fn test_error_messages_are_helpful() {
        let unknown = ParseError::UnknownCard("7".to_string()).to_string();
        assert!(unknown.contains("'7'"));
        assert!(unknown.contains("13"));
        assert!(unknown.contains("none"));

        let missing = ParseError::MissingArgument {
            command: "join",
            argument: "ROOM",
        }
        .to_string();
        assert_eq!(missing, "'join' requires ROOM (e.g., 'join ROOM')");
    }
}
