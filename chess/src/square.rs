use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ChessError;

/// A board square. Files a..h are encoded 1..8, ranks are 1..8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Result<Self, ChessError> {
        if !(1..=8).contains(&file) || !(1..=8).contains(&rank) {
            return Err(ChessError::OutOfRange(format!("file {file}, rank {rank}")));
        }
        Ok(Self { file, rank })
    }

    /// Both coordinates must already be in 1..=8.
    pub(crate) const fn from_coords(file: u8, rank: u8) -> Self {
        debug_assert!(file >= 1 && file <= 8 && rank >= 1 && rank <= 8);
        Self { file, rank }
    }

    /// Build a square from a file letter (`a`..`h`) and a rank number.
    pub fn from_file_char(file: char, rank: u8) -> Result<Self, ChessError> {
        let index = match file {
            'a'..='h' => file as u8 - b'a' + 1,
            _ => return Err(ChessError::OutOfRange(format!("file '{file}'"))),
        };
        Self::new(index, rank)
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file - 1) as char
    }

    /// The square `df` files and `dr` ranks away, if it is on the board.
    pub(crate) fn offset(self, df: i8, dr: i8) -> Option<Self> {
        let file = self.file as i8 + df;
        let rank = self.rank as i8 + dr;
        Self::new(u8::try_from(file).ok()?, u8::try_from(rank).ok()?).ok()
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => {
                let rank = rank
                    .to_digit(10)
                    .ok_or_else(|| ChessError::OutOfRange(s.to_string()))?;
                Self::from_file_char(file, rank as u8)
            }
            _ => Err(ChessError::OutOfRange(s.to_string())),
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank)
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let sq: Square = "e4".parse().unwrap();
        assert_eq!(sq.file(), 5);
        assert_eq!(sq.rank(), 4);
        assert_eq!(sq.to_string(), "e4");
        assert_eq!("a1".parse::<Square>().unwrap(), Square::new(1, 1).unwrap());
        assert_eq!("h8".parse::<Square>().unwrap(), Square::new(8, 8).unwrap());
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(Square::new(0, 1), Err(ChessError::OutOfRange(_))));
        assert!(matches!(Square::new(1, 9), Err(ChessError::OutOfRange(_))));
        assert!(matches!(
            Square::from_file_char('i', 1),
            Err(ChessError::OutOfRange(_))
        ));
        assert!("e9".parse::<Square>().is_err());
        assert!("e0".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
        assert!("e44".parse::<Square>().is_err());
        assert!("E4".parse::<Square>().is_err());
    }

    #[test]
    fn test_offset_stays_on_board() {
        let e2: Square = "e2".parse().unwrap();
        assert_eq!(e2.offset(0, 2).unwrap().to_string(), "e4");
        assert_eq!(e2.offset(-1, -1).unwrap().to_string(), "d1");
        assert!(e2.offset(0, -2).is_none());
        assert!(e2.offset(4, 0).is_none());
    }
}
