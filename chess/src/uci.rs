//! Long algebraic move text as exchanged with UCI engines (`e2e4`, `e7e8q`).

use std::fmt;
use std::str::FromStr;

use crate::error::ChessError;
use crate::square::Square;
use crate::types::PieceKind;

/// A move in long algebraic form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl UciMove {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, kind: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(kind),
        }
    }
}

/// Parse UCI move format (e2e4, e7e8q)
pub fn parse_uci_move(s: &str) -> Result<UciMove, ChessError> {
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return Err(ChessError::InvalidMove(s.to_string()));
    }

    let from: Square = s[0..2]
        .parse()
        .map_err(|_| ChessError::InvalidMove(s.to_string()))?;
    let to: Square = s[2..4]
        .parse()
        .map_err(|_| ChessError::InvalidMove(s.to_string()))?;

    let promotion = match s[4..].chars().next() {
        Some(c) => Some(
            PieceKind::from_promotion_char(c)
                .ok_or_else(|| ChessError::InvalidMove(s.to_string()))?,
        ),
        None => None,
    };

    Ok(UciMove {
        from,
        to,
        promotion,
    })
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q")
pub fn format_uci_move(mv: &UciMove) -> String {
    let mut s = format!("{}{}", mv.from, mv.to);
    if let Some(promo) = mv.promotion {
        s.push(promo.to_char_lower());
    }
    s
}

impl FromStr for UciMove {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_uci_move(s)
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_uci_move(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uci_move() {
        let mv = UciMove::new("e2".parse().unwrap(), "e4".parse().unwrap());
        assert_eq!(format_uci_move(&mv), "e2e4");
    }

    #[test]
    fn test_format_uci_move_with_promotion() {
        let mv = UciMove::with_promotion(
            "e7".parse().unwrap(),
            "e8".parse().unwrap(),
            PieceKind::Queen,
        );
        assert_eq!(format_uci_move(&mv), "e7e8q");
    }

    #[test]
    fn test_parse_uci_move() {
        let mv = parse_uci_move("g1f3").unwrap();
        assert_eq!(mv.from.to_string(), "g1");
        assert_eq!(mv.to.to_string(), "f3");
        assert_eq!(mv.promotion, None);

        let mv: UciMove = "a2a1n".parse().unwrap();
        assert_eq!(mv.promotion, Some(PieceKind::Knight));
        assert_eq!(mv.to_string(), "a2a1n");
    }

    #[test]
    fn test_parse_rejects_bad_text() {
        for text in ["", "e2", "e2e", "e2e4qq", "z2e4", "e2e9", "e7e8k", "e7e8Q", "(none)"] {
            assert!(
                matches!(parse_uci_move(text), Err(ChessError::InvalidMove(_))),
                "{text} should be rejected"
            );
        }
    }
}
