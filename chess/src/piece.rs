use serde::Serialize;

use crate::square::Square;
use crate::types::{PieceColor, PieceKind};

/// A piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    pub color: PieceColor,
    pub kind: PieceKind,
    pub square: Square,
    /// True once the piece has left its original square.
    pub deployed: bool,
}

impl Piece {
    pub fn new(color: PieceColor, kind: PieceKind, square: Square) -> Self {
        Self {
            color,
            kind,
            square,
            deployed: false,
        }
    }

    pub fn fen_char(&self) -> char {
        self.kind.fen_char(self.color)
    }
}
