use std::fmt;

use chess::BoardSnapshot;
use engine::EngineInfo;
use serde::Serialize;

/// Events broadcast from the controller actor to all subscribers.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum GameEvent {
    /// Full board snapshot after any mutation.
    BoardChanged(BoardSnapshot),
    /// Raw best-move line as the engine sent it.
    BestMove(String),
    /// Search progress parsed from the engine's `info` lines.
    Thinking(EngineInfo),
    GameOver(GameOver),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameOver {
    pub reason: GameOverReason,
    pub snapshot: BoardSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameOverReason {
    /// The engine has no move in this position.
    NoLegalMove,
    DrawThreshold { halfmove_clock: u32 },
    MoveLimit { fullmove_number: u32 },
    /// The engine's move could not be applied to the local board.
    Desync { detail: String },
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOverReason::NoLegalMove => write!(f, "engine has no legal move"),
            GameOverReason::DrawThreshold { halfmove_clock } => {
                write!(f, "draw: {halfmove_clock} half-moves without pawn move or capture")
            }
            GameOverReason::MoveLimit { fullmove_number } => {
                write!(f, "move limit reached at move {fullmove_number}")
            }
            GameOverReason::Desync { detail } => write!(f, "board out of sync with engine: {detail}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_serializes_with_kind_tag() {
        let reason = GameOverReason::DrawThreshold { halfmove_clock: 100 };
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["kind"], "draw_threshold");
        assert_eq!(json["halfmove_clock"], 100);

        let json = serde_json::to_value(GameOverReason::NoLegalMove).unwrap();
        assert_eq!(json["kind"], "no_legal_move");
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            GameOverReason::MoveLimit { fullmove_number: 41 }.to_string(),
            "move limit reached at move 41"
        );
        assert_eq!(GameOverReason::NoLegalMove.to_string(), "engine has no legal move");
    }
}
