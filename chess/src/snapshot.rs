use serde::Serialize;

use crate::board::StartPosition;
use crate::castling::CastleSide;
use crate::piece::Piece;
use crate::square::Square;
use crate::types::PieceColor;

/// Complete, immutable copy of a board for views and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub fen: String,
    pub white: Vec<Piece>,
    pub black: Vec<Piece>,
    pub history: Vec<String>,
    pub active_player: PieceColor,
    pub castling: Vec<CastlingFlag>,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub last_move_capture: bool,
    pub start_position: StartPosition,
}

/// One castling right still held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CastlingFlag {
    pub color: PieceColor,
    pub side: CastleSide,
}

impl BoardSnapshot {
    pub fn last_move(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    pub fn can_castle(&self, color: PieceColor, side: CastleSide) -> bool {
        self.castling
            .iter()
            .any(|flag| flag.color == color && flag.side == side)
    }
}
