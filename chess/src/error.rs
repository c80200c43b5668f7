use crate::fen::FenError;
use crate::square::Square;

/// Errors raised by the board model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    /// A file or rank outside a..h / 1..8.
    #[error("square out of range: {0}")]
    OutOfRange(String),
    #[error("malformed notation: {0}")]
    MalformedNotation(#[from] FenError),
    /// The local board and the move source disagree about where pieces are.
    #[error("no piece at {0}")]
    NoPieceAtSquare(Square),
    #[error("invalid move text: {0}")]
    InvalidMove(String),
}
