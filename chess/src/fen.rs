//! Positional notation (FEN) codec.
//!
//! `decode` turns the six-field text into piece placements plus metadata;
//! `encode` is its inverse for a live [`BoardState`].

use smallvec::SmallVec;

use crate::board::BoardState;
use crate::castling::{CastleSide, CastlingRights};
use crate::piece::Piece;
use crate::square::Square;
use crate::types::{PieceColor, PieceKind};

/// The standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Pieces of one side, in insertion order.
pub type PieceList = SmallVec<[Piece; 16]>;

/// Everything a FEN string describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPosition {
    pub white: PieceList,
    pub black: PieceList,
    pub active_player: PieceColor,
    pub white_castling: CastlingRights,
    pub black_castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("expected 6 fields, found {0}")]
    WrongFieldCount(usize),
    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),
    #[error("placement runs off the board on rank {rank}")]
    PlacementOverflow { rank: u8 },
    #[error("placement describes more than 8 ranks")]
    TooManyRanks,
    #[error("more than 16 pieces for {0}")]
    TooManyPieces(PieceColor),
    #[error("more than one king for {0}")]
    ExtraKing(PieceColor),
    #[error("invalid active player: \"{0}\"")]
    InvalidActivePlayer(String),
    #[error("invalid castling character '{0}'")]
    InvalidCastling(char),
    #[error("invalid en passant square: \"{0}\"")]
    InvalidEnPassant(String),
    #[error("invalid {field}: \"{found}\"")]
    InvalidCounter { field: &'static str, found: String },
}

/// Parse a FEN string.
pub fn decode(text: &str) -> Result<DecodedPosition, FenError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(FenError::WrongFieldCount(fields.len()));
    }

    let (white, black) = decode_placement(fields[0])?;

    let active_player = match fields[1] {
        "w" => PieceColor::White,
        "b" => PieceColor::Black,
        other => return Err(FenError::InvalidActivePlayer(other.to_string())),
    };

    let (white_castling, black_castling) = decode_castling(fields[2])?;

    let en_passant = match fields[3] {
        "-" => None,
        text => Some(
            text.parse::<Square>()
                .map_err(|_| FenError::InvalidEnPassant(text.to_string()))?,
        ),
    };

    Ok(DecodedPosition {
        white,
        black,
        active_player,
        white_castling,
        black_castling,
        en_passant,
        halfmove_clock: decode_counter(fields[4], "halfmove clock")?,
        fullmove_number: decode_counter(fields[5], "fullmove number")?,
    })
}

/// Scan the placement field from rank 8 down to rank 1.
///
/// Letters place pieces, digits skip empty squares, `/` moves down a rank and
/// any other character ends the scan. Short ranks are left empty.
fn decode_placement(field: &str) -> Result<(PieceList, PieceList), FenError> {
    let mut white = PieceList::new();
    let mut black = PieceList::new();
    let mut file: u8 = 1;
    let mut rank: u8 = 8;

    for c in field.chars() {
        if c == '/' {
            rank = rank
                .checked_sub(1)
                .filter(|r| *r >= 1)
                .ok_or(FenError::TooManyRanks)?;
            file = 1;
        } else if let Some(skip) = c.to_digit(10) {
            file += skip as u8;
            // file 9 is "just past h", which is where a full rank ends
            if file > 9 {
                return Err(FenError::PlacementOverflow { rank });
            }
        } else if c.is_ascii_alphabetic() {
            let kind = PieceKind::from_char(c).ok_or(FenError::InvalidPiece(c))?;
            let square =
                Square::new(file, rank).map_err(|_| FenError::PlacementOverflow { rank })?;
            let color = PieceColor::of_fen_char(c);

            let side = match color {
                PieceColor::White => &mut white,
                PieceColor::Black => &mut black,
            };
            if side.len() == 16 {
                return Err(FenError::TooManyPieces(color));
            }
            if kind == PieceKind::King && side.iter().any(|p| p.kind == PieceKind::King) {
                return Err(FenError::ExtraKing(color));
            }

            let mut piece = Piece::new(color, kind, square);
            // A pawn off its home rank must have moved to get there.
            piece.deployed = kind == PieceKind::Pawn && rank != color.pawn_rank();
            side.push(piece);
            file += 1;
        } else {
            break;
        }
    }

    Ok((white, black))
}

fn decode_castling(field: &str) -> Result<(CastlingRights, CastlingRights), FenError> {
    let mut white = CastlingRights::NONE;
    let mut black = CastlingRights::NONE;
    for c in field.chars() {
        match c {
            'K' => white.insert(CastleSide::KingSide),
            'Q' => white.insert(CastleSide::QueenSide),
            'k' => black.insert(CastleSide::KingSide),
            'q' => black.insert(CastleSide::QueenSide),
            '-' => {}
            other => return Err(FenError::InvalidCastling(other)),
        }
    }
    Ok((white, black))
}

fn decode_counter(field: &str, name: &'static str) -> Result<u32, FenError> {
    field.parse().map_err(|_| FenError::InvalidCounter {
        field: name,
        found: field.to_string(),
    })
}

/// Serialize a board to FEN.
pub fn encode(board: &BoardState) -> String {
    let mut grid = [[None::<char>; 8]; 8];
    for piece in board
        .pieces(PieceColor::White)
        .iter()
        .chain(board.pieces(PieceColor::Black))
    {
        let (file, rank) = (piece.square.file() as usize, piece.square.rank() as usize);
        grid[rank - 1][file - 1] = Some(piece.fen_char());
    }

    let mut out = String::with_capacity(90);
    for rank in (0..8).rev() {
        let mut empty = 0u8;
        for cell in grid[rank] {
            match cell {
                Some(c) => {
                    if empty > 0 {
                        out.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    out.push(c);
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push((b'0' + empty) as char);
        }
        if rank > 0 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(board.active_player().fen_char());
    out.push(' ');
    out.push_str(&encode_castling(
        board.castling_rights(PieceColor::White),
        board.castling_rights(PieceColor::Black),
    ));
    out.push(' ');
    match board.en_passant() {
        Some(square) => out.push_str(&square.to_string()),
        None => out.push('-'),
    }
    out.push_str(&format!(
        " {} {}",
        board.halfmove_clock(),
        board.fullmove_number()
    ));
    out
}

fn encode_castling(white: CastlingRights, black: CastlingRights) -> String {
    let mut out = String::new();
    for (color, rights) in [(PieceColor::White, white), (PieceColor::Black, black)] {
        for side in [CastleSide::KingSide, CastleSide::QueenSide] {
            if rights.has(side) {
                out.push(side.fen_char(color));
            }
        }
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}
