//! Protocol vocabulary and the command value sent through a session.

use chess::{StartPosition, UciMove};

use crate::uci::UciError;

/// The words of the engine protocol. Frozen once a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolTokens {
    pub ready_probe: String,
    pub ready_ok: String,
    pub identify: String,
    pub identify_ok: String,
    pub id_name: String,
    pub new_game: String,
    pub position: String,
    pub start_pos: String,
    pub fen: String,
    pub moves: String,
    pub search: String,
    pub best_move: String,
    pub no_move: String,
    pub diagnostic: String,
    pub set_option: String,
    pub quit: String,
}

impl ProtocolTokens {
    /// Standard UCI vocabulary.
    pub fn uci() -> Self {
        Self {
            ready_probe: "isready".into(),
            ready_ok: "readyok".into(),
            identify: "uci".into(),
            identify_ok: "uciok".into(),
            id_name: "id name".into(),
            new_game: "ucinewgame".into(),
            position: "position".into(),
            start_pos: "startpos".into(),
            fen: "fen".into(),
            moves: "moves".into(),
            search: "go movetime".into(),
            best_move: "bestmove".into(),
            no_move: "(none)".into(),
            diagnostic: "d".into(),
            set_option: "setoption name".into(),
            quit: "quit".into(),
        }
    }

    /// `position startpos|fen <fen> [moves ...]`, synchronise-only.
    pub fn position_command(&self, start: &StartPosition, moves: &[String]) -> EngineCommand {
        let mut text = match start {
            StartPosition::Standard => format!("{} {}", self.position, self.start_pos),
            StartPosition::Fen(fen) => format!("{} {} {}", self.position, self.fen, fen),
        };
        if !moves.is_empty() {
            text.push(' ');
            text.push_str(&self.moves);
            for mv in moves {
                text.push(' ');
                text.push_str(mv);
            }
        }
        EngineCommand::sync(text)
    }

    pub fn search_command(&self, movetime_ms: u64) -> EngineCommand {
        EngineCommand::new(format!("{} {}", self.search, movetime_ms), &self.best_move)
    }

    pub fn new_game_command(&self) -> EngineCommand {
        EngineCommand::sync(self.new_game.clone())
    }

    pub fn diagnostic_command(&self) -> EngineCommand {
        EngineCommand::sync(self.diagnostic.clone())
    }

    pub fn set_option_command(&self, name: &str, value: &str) -> EngineCommand {
        EngineCommand::sync(format!("{} {} value {}", self.set_option, name, value))
    }

    /// Extract the move from a best-move line. `Ok(None)` means the engine
    /// has no move to play.
    pub fn parse_best_move(&self, line: &str) -> Result<Option<UciMove>, UciError> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(self.best_move.as_str()) {
            return Err(UciError::MalformedMessage(line.to_string()));
        }
        match tokens.next() {
            None => Err(UciError::MalformedMessage(line.to_string())),
            Some(payload) if payload == self.no_move => Ok(None),
            Some(payload) => payload
                .parse()
                .map(Some)
                .map_err(|_| UciError::InvalidMove(payload.to_string())),
        }
    }
}

impl Default for ProtocolTokens {
    fn default() -> Self {
        Self::uci()
    }
}

/// A line to write plus the prefix of the line that answers it.
///
/// An empty prefix means the command has no reply of its own; the session
/// follows it with a readiness probe and waits for that instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub text: String,
    pub expected_prefix: String,
}

impl EngineCommand {
    pub fn new(text: impl Into<String>, expected_prefix: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expected_prefix: expected_prefix.into(),
        }
    }

    pub fn sync(text: impl Into<String>) -> Self {
        Self::new(text, String::new())
    }

    pub fn is_sync_only(&self) -> bool {
        self.expected_prefix.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_command() {
        let tokens = ProtocolTokens::uci();
        let cmd = tokens.position_command(&StartPosition::Standard, &[]);
        assert_eq!(cmd.text, "position startpos");
        assert!(cmd.is_sync_only());

        let moves = vec!["e2e4".to_string(), "e7e5".to_string()];
        let cmd = tokens.position_command(&StartPosition::Standard, &moves);
        assert_eq!(cmd.text, "position startpos moves e2e4 e7e5");

        let fen = "8/8/8/8/8/8/8/K6k w - - 0 1".to_string();
        let cmd = tokens.position_command(&StartPosition::Fen(fen), &moves[..1]);
        assert_eq!(cmd.text, "position fen 8/8/8/8/8/8/8/K6k w - - 0 1 moves e2e4");
    }

    #[test]
    fn test_search_and_option_commands() {
        let tokens = ProtocolTokens::default();
        let cmd = tokens.search_command(250);
        assert_eq!(cmd.text, "go movetime 250");
        assert_eq!(cmd.expected_prefix, "bestmove");
        assert!(!cmd.is_sync_only());

        let cmd = tokens.set_option_command("Skill Level", "5");
        assert_eq!(cmd.text, "setoption name Skill Level value 5");
        assert!(cmd.is_sync_only());
        assert_eq!(tokens.diagnostic_command().text, "d");
        assert_eq!(tokens.new_game_command().text, "ucinewgame");
    }

    #[test]
    fn test_parse_best_move() {
        let tokens = ProtocolTokens::uci();
        let mv = tokens.parse_best_move("bestmove e2e4 ponder e7e5").unwrap().unwrap();
        assert_eq!(mv.to_string(), "e2e4");

        let mv = tokens.parse_best_move("bestmove a7a8q").unwrap().unwrap();
        assert_eq!(mv.promotion, Some(chess::PieceKind::Queen));

        assert_eq!(tokens.parse_best_move("bestmove (none)").unwrap(), None);
        assert!(matches!(
            tokens.parse_best_move("bestmove zz99"),
            Err(UciError::InvalidMove(_))
        ));
        assert!(tokens.parse_best_move("bestmove").is_err());
        assert!(tokens.parse_best_move("info depth 1").is_err());
    }
}
