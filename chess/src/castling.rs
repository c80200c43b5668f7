//! Per-side castling rights.

use serde::Serialize;

use crate::types::PieceColor;

/// Wing a side may castle towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    fn bit(self) -> u8 {
        match self {
            Self::KingSide => 0b01,
            Self::QueenSide => 0b10,
        }
    }

    /// File of the Rook that castles on this wing.
    pub fn rook_file(self) -> u8 {
        match self {
            Self::KingSide => 8,
            Self::QueenSide => 1,
        }
    }

    /// File the Rook lands on after castling.
    pub fn castled_rook_file(self) -> u8 {
        match self {
            Self::KingSide => 6,
            Self::QueenSide => 4,
        }
    }

    pub fn from_rook_file(file: u8) -> Option<Self> {
        match file {
            8 => Some(Self::KingSide),
            1 => Some(Self::QueenSide),
            _ => None,
        }
    }

    /// FEN letter for this wing in the given color.
    pub fn fen_char(self, color: PieceColor) -> char {
        let c = match self {
            Self::KingSide => 'K',
            Self::QueenSide => 'Q',
        };
        match color {
            PieceColor::White => c,
            PieceColor::Black => c.to_ascii_lowercase(),
        }
    }
}

/// Bitset over {KingSide, QueenSide} for one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: Self = Self(0);
    pub const BOTH: Self = Self(0b11);

    pub fn has(self, side: CastleSide) -> bool {
        self.0 & side.bit() != 0
    }

    pub fn insert(&mut self, side: CastleSide) {
        self.0 |= side.bit();
    }

    pub fn remove(&mut self, side: CastleSide) {
        self.0 &= !side.bit();
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut rights = CastlingRights::NONE;
        assert!(rights.is_empty());
        rights.insert(CastleSide::QueenSide);
        assert!(rights.has(CastleSide::QueenSide));
        assert!(!rights.has(CastleSide::KingSide));
        rights.insert(CastleSide::KingSide);
        assert_eq!(rights, CastlingRights::BOTH);
        rights.remove(CastleSide::QueenSide);
        assert!(rights.has(CastleSide::KingSide));
        rights.clear();
        assert!(rights.is_empty());
    }
}
