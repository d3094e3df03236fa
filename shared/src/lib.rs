use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOARD_COUNT: usize = 9;
pub const CELLS_PER_BOARD: usize = 9;
pub const CENTER_BOARD_INDEX: usize = 4;

/// Marker assigned to a player for the lifetime of their connection.
/// The first admitted player is X, the second O; X always moves first.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// The opposing symbol.
    pub fn other(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::X => write!(f, "X"),
            Symbol::O => write!(f, "O"),
        }
    }
}

/// One of the nine inner 3x3 boards, cells in row-major order.
pub type SubBoard = [Option<Symbol>; CELLS_PER_BOARD];

/// Serialized form of the full game state, broadcast to clients in
/// `start` and `update` messages.
///
/// `next_board_index` carries the sub-board the rules direct the next
/// move toward; `None` means any open sub-board is allowed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub global_board: [SubBoard; BOARD_COUNT],
    pub current_player: Symbol,
    pub next_board_index: Option<usize>,
    pub individual_board_winners: [Option<Symbol>; BOARD_COUNT],
    pub game_started: bool,
}

/// Messages a client may send, tagged by the `type` field.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Move {
        row: usize,
        col: usize,
        player: Symbol,
        board_index: usize,
    },
    Restart,
}

/// Messages the server sends, tagged by the `type` field.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Sent once per connection on admission.
    Symbol { message: String },
    /// Sent to a lone player while the roster is short one opponent.
    Waiting { message: String },
    /// Sent to both players on match start and on restart.
    #[serde(rename_all = "camelCase")]
    Start {
        game_state: GameSnapshot,
        message: String,
    },
    /// Sent to both players after a valid non-terminal move.
    #[serde(rename_all = "camelCase")]
    Update { game_state: GameSnapshot },
    /// Sent to both players when a move completes a global line.
    #[serde(rename_all = "camelCase")]
    GameOver {
        message: String,
        global_winner: Symbol,
        individual_board_winners: [Option<Symbol>; BOARD_COUNT],
    },
    /// Sent to the offending player only.
    Error { message: String },
}

impl GameSnapshot {
    /// Initial layout: empty boards, X to move, the opening move
    /// constrained to the center sub-board.
    pub fn initial(game_started: bool) -> Self {
        Self {
            global_board: [[None; CELLS_PER_BOARD]; BOARD_COUNT],
            current_player: Symbol::X,
            next_board_index: Some(CENTER_BOARD_INDEX),
            individual_board_winners: [None; BOARD_COUNT],
            game_started,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_symbol_other() {
        assert_eq!(Symbol::X.other(), Symbol::O);
        assert_eq!(Symbol::O.other(), Symbol::X);
    }

    #[test]
    fn test_symbol_wire_form() {
        assert_eq!(serde_json::to_string(&Symbol::X).unwrap(), "\"X\"");
        assert_eq!(serde_json::to_string(&Symbol::O).unwrap(), "\"O\"");

        let parsed: Symbol = serde_json::from_str("\"O\"").unwrap();
        assert_eq!(parsed, Symbol::O);
    }

    #[test]
    fn test_move_message_parsing() {
        let text = r#"{"type":"move","row":0,"col":2,"player":"X","boardIndex":4}"#;
        let parsed: ClientMessage = serde_json::from_str(text).unwrap();

        assert_eq!(
            parsed,
            ClientMessage::Move {
                row: 0,
                col: 2,
                player: Symbol::X,
                board_index: 4,
            }
        );
    }

    #[test]
    fn test_restart_message_parsing() {
        let parsed: ClientMessage = serde_json::from_str(r#"{"type":"restart"}"#).unwrap();
        assert_eq!(parsed, ClientMessage::Restart);
    }

    #[test]
    fn test_malformed_message_rejected() {
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"dance"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"move","row":0}"#).is_err());
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let snapshot = GameSnapshot::initial(true);
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["currentPlayer"], json!("X"));
        assert_eq!(value["nextBoardIndex"], json!(4));
        assert_eq!(value["gameStarted"], json!(true));
        assert_eq!(value["globalBoard"].as_array().unwrap().len(), 9);
        assert_eq!(value["globalBoard"][0].as_array().unwrap().len(), 9);
        assert_eq!(value["globalBoard"][0][0], Value::Null);
        assert_eq!(
            value["individualBoardWinners"],
            json!([null, null, null, null, null, null, null, null, null])
        );
    }

    #[test]
    fn test_unconstrained_next_board_serializes_as_null() {
        let mut snapshot = GameSnapshot::initial(true);
        snapshot.next_board_index = None;

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["nextBoardIndex"], Value::Null);
    }

    #[test]
    fn test_server_message_tags() {
        let cases = vec![
            (
                ServerMessage::Symbol {
                    message: "m".to_string(),
                },
                "symbol",
            ),
            (
                ServerMessage::Waiting {
                    message: "m".to_string(),
                },
                "waiting",
            ),
            (
                ServerMessage::Start {
                    game_state: GameSnapshot::initial(true),
                    message: "m".to_string(),
                },
                "start",
            ),
            (
                ServerMessage::Update {
                    game_state: GameSnapshot::initial(true),
                },
                "update",
            ),
            (
                ServerMessage::GameOver {
                    message: "m".to_string(),
                    global_winner: Symbol::O,
                    individual_board_winners: [None; BOARD_COUNT],
                },
                "gameOver",
            ),
            (
                ServerMessage::Error {
                    message: "m".to_string(),
                },
                "error",
            ),
        ];

        for (message, expected_tag) in cases {
            let value = serde_json::to_value(&message).unwrap();
            assert_eq!(value["type"], json!(expected_tag));
        }
    }

    #[test]
    fn test_game_over_wire_shape() {
        let mut winners = [None; BOARD_COUNT];
        winners[0] = Some(Symbol::O);
        winners[4] = Some(Symbol::O);
        winners[8] = Some(Symbol::O);

        let message = ServerMessage::GameOver {
            message: "Player O has won the game!".to_string(),
            global_winner: Symbol::O,
            individual_board_winners: winners,
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["globalWinner"], json!("O"));
        assert_eq!(
            value["individualBoardWinners"],
            json!(["O", null, null, null, "O", null, null, null, "O"])
        );
    }

    #[test]
    fn test_start_message_embeds_snapshot() {
        let message = ServerMessage::Start {
            game_state: GameSnapshot::initial(true),
            message: "The match has started. Your symbol is X".to_string(),
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["gameState"]["nextBoardIndex"], json!(4));
        assert_eq!(value["gameState"]["gameStarted"], json!(true));
    }
}
