//! Canonical piece and color types for the board model.

use serde::Serialize;

/// Class of a chess piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Side a piece belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    White,
    Black,
}

impl PieceKind {
    pub fn to_char_upper(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    pub fn to_char_lower(self) -> char {
        self.to_char_upper().to_ascii_lowercase()
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }

    /// Parse the lowercase promotion letter carried by long algebraic moves.
    /// Only the four classes a pawn may become are accepted.
    pub fn from_promotion_char(c: char) -> Option<Self> {
        match c {
            'q' => Some(Self::Queen),
            'r' => Some(Self::Rook),
            'b' => Some(Self::Bishop),
            'n' => Some(Self::Knight),
            _ => None,
        }
    }

    /// FEN letter for this class in the given color (uppercase = White).
    pub fn fen_char(self, color: PieceColor) -> char {
        match color {
            PieceColor::White => self.to_char_upper(),
            PieceColor::Black => self.to_char_lower(),
        }
    }
}

impl PieceColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Color of a FEN piece letter.
    pub fn of_fen_char(c: char) -> Self {
        if c.is_ascii_uppercase() {
            Self::White
        } else {
            Self::Black
        }
    }

    /// Active-player field letter.
    pub fn fen_char(self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    /// Rank holding this side's King and Rooks at the start.
    pub fn back_rank(self) -> u8 {
        match self {
            Self::White => 1,
            Self::Black => 8,
        }
    }

    /// Rank holding this side's pawns at the start.
    pub fn pawn_rank(self) -> u8 {
        match self {
            Self::White => 2,
            Self::Black => 7,
        }
    }

    /// Rank direction pawns of this side advance in.
    pub fn forward(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char_upper())
    }
}

impl std::fmt::Display for PieceColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_chars() {
        assert_eq!(PieceKind::Knight.fen_char(PieceColor::White), 'N');
        assert_eq!(PieceKind::Knight.fen_char(PieceColor::Black), 'n');
        assert_eq!(PieceKind::from_char('K'), Some(PieceKind::King));
        assert_eq!(PieceKind::from_char('x'), None);
        assert_eq!(PieceColor::of_fen_char('q'), PieceColor::Black);
    }

    #[test]
    fn test_promotion_chars_exclude_king_and_pawn() {
        assert_eq!(PieceKind::from_promotion_char('q'), Some(PieceKind::Queen));
        assert_eq!(PieceKind::from_promotion_char('k'), None);
        assert_eq!(PieceKind::from_promotion_char('p'), None);
        assert_eq!(PieceKind::from_promotion_char('Q'), None);
    }
}
