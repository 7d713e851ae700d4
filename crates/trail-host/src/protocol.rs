//! JSON-lines protocol between a front-end and the host.

use serde::{Deserialize, Serialize};
use trail_core::{GameCommand, GameError, GameEvent, GameSnapshot};

/// Messages sent from a front-end to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Request {
    /// Apply a game command
    Command(GameCommand),

    /// Ask for the current snapshot
    Snapshot,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from the host to a front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Response {
    /// Command applied
    Events { events: Vec<GameEvent> },

    /// Command refused, state unchanged
    Rejected { error: GameError, message: String },

    /// Current state
    Snapshot { state: Box<GameSnapshot> },

    /// Pong response
    Pong,

    /// Request could not be parsed
    Error { message: String },
}

impl Response {
    pub fn rejected(error: GameError) -> Self {
        Response::Rejected {
            message: error.to_string(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trail_core::GameConfig;

    #[test]
    fn test_request_wire_format() {
        let request: Request = serde_json::from_str(
            r#"{"type":"Command","payload":{"command":"roll_dice"}}"#,
        )
        .expect("valid request");
        assert_eq!(request, Request::Command(GameCommand::RollDice));

        let start = Request::Command(GameCommand::StartGame(GameConfig::default()));
        let json = serde_json::to_string(&start).expect("serialize");
        assert!(json.starts_with(r#"{"type":"Command","payload":{"command":"start_game""#));

        let ping: Request = serde_json::from_str(r#"{"type":"Ping"}"#).expect("valid ping");
        assert_eq!(ping, Request::Ping);
    }

    #[test]
    fn test_rejection_carries_message() {
        let json = serde_json::to_string(&Response::rejected(GameError::Busy)).expect("serialize");
        assert_eq!(
            json,
            r#"{"type":"Rejected","payload":{"error":"Busy","message":"Still resolving the previous move"}}"#
        );
    }
}
