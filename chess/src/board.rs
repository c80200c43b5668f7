use serde::Serialize;

use crate::castling::{CastleSide, CastlingRights};
use crate::error::ChessError;
use crate::fen::{self, DecodedPosition, PieceList};
use crate::piece::Piece;
use crate::snapshot::{BoardSnapshot, CastlingFlag};
use crate::square::Square;
use crate::types::{PieceColor, PieceKind};
use crate::uci::{format_uci_move, UciMove};

/// Where the current game started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "fen", rename_all = "lowercase")]
pub enum StartPosition {
    Standard,
    Fen(String),
}

/// Live model of a position plus the moves that led to it.
///
/// Moves are not checked for legality; whoever supplies them (normally the
/// engine) is trusted. Only the bookkeeping is kept exact: captures, castling
/// rights, the en-passant target and the move counters.
#[derive(Debug, Clone)]
pub struct BoardState {
    white: PieceList,
    black: PieceList,
    history: Vec<String>,
    active_player: PieceColor,
    white_castling: CastlingRights,
    black_castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    last_move_capture: bool,
    start_position: StartPosition,
}

/// Result of applying one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// Long algebraic notation as recorded in history.
    pub notation: String,
    /// The moved piece, after the move.
    pub piece: Piece,
    pub captured: Option<Piece>,
    /// Set when a King's two-file move also carried the Rook across.
    pub castled: Option<CastleSide>,
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl BoardState {
    /// Create a board in the standard starting position
    pub fn new() -> Self {
        Self::from_decoded(standard_position(), StartPosition::Standard)
    }

    /// Create a board from a FEN string
    pub fn from_fen(text: &str) -> Result<Self, ChessError> {
        let position = fen::decode(text)?;
        let mut board = Self::from_decoded(position, StartPosition::Standard);
        // the engine is sent the canonical form, never the raw input
        board.start_position = StartPosition::Fen(fen::encode(&board));
        Ok(board)
    }

    fn from_decoded(position: DecodedPosition, start_position: StartPosition) -> Self {
        Self {
            white: position.white,
            black: position.black,
            history: Vec::new(),
            active_player: position.active_player,
            white_castling: position.white_castling,
            black_castling: position.black_castling,
            en_passant: position.en_passant,
            halfmove_clock: position.halfmove_clock,
            fullmove_number: position.fullmove_number,
            last_move_capture: false,
            start_position,
        }
    }

    /// Replace everything with the standard starting position.
    pub fn new_game(&mut self) {
        *self = Self::new();
    }

    /// Replace everything with a decoded FEN position.
    ///
    /// On error the current state is left as it was.
    pub fn new_position(&mut self, text: &str) -> Result<(), ChessError> {
        *self = Self::from_fen(text)?;
        Ok(())
    }

    /// Move the piece on `from` to `to`, capturing whatever enemy piece is there.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<AppliedMove, ChessError> {
        self.relocate(from, to, None)
    }

    /// Same as [`apply_move`](Self::apply_move), turning the moved piece into `kind`.
    pub fn promote_piece(
        &mut self,
        from: Square,
        to: Square,
        kind: PieceKind,
    ) -> Result<AppliedMove, ChessError> {
        self.relocate(from, to, Some(kind))
    }

    /// Apply a parsed engine move, promoting when it carries a fifth character.
    pub fn apply_uci(&mut self, mv: &UciMove) -> Result<AppliedMove, ChessError> {
        match mv.promotion {
            Some(kind) => self.promote_piece(mv.from, mv.to, kind),
            None => self.apply_move(mv.from, mv.to),
        }
    }

    fn relocate(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<AppliedMove, ChessError> {
        let (color, index) = self
            .locate(from)
            .ok_or(ChessError::NoPieceAtSquare(from))?;
        let mover = self.side(color)[index];
        let enemy = color.opposite();

        let mut captured = self.take_piece(enemy, to);
        if captured.is_none()
            && mover.kind == PieceKind::Pawn
            && from.file() != to.file()
            && self.en_passant == Some(to)
        {
            if let Some(passed) = to.offset(0, -color.forward()) {
                captured = self.take_piece(enemy, passed);
            }
        }

        let castled = self.carry_castling_rook(&mover, from, to);

        let piece = {
            let piece = &mut self.side_mut(color)[index];
            piece.square = to;
            piece.deployed = true;
            if let Some(kind) = promotion {
                piece.kind = kind;
            }
            *piece
        };

        self.revoke_rights_for_move(&mover, from);
        if let Some(victim) = captured {
            self.revoke_rights_for_capture(&victim);
        }

        self.en_passant = if mover.kind == PieceKind::Pawn
            && from.file() == to.file()
            && from.rank().abs_diff(to.rank()) == 2
        {
            from.offset(0, color.forward())
        } else {
            None
        };

        if mover.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if color == PieceColor::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.active_player = enemy;
        self.last_move_capture = captured.is_some();

        let notation = format_uci_move(&UciMove {
            from,
            to,
            promotion,
        });
        self.history.push(notation.clone());

        Ok(AppliedMove {
            notation,
            piece,
            captured,
            castled,
        })
    }

    /// A King stepping two files along its home rank castles; bring the Rook along.
    fn carry_castling_rook(
        &mut self,
        king: &Piece,
        from: Square,
        to: Square,
    ) -> Option<CastleSide> {
        let rank = king.color.back_rank();
        if king.kind != PieceKind::King
            || from.file() != 5
            || from.rank() != rank
            || to.rank() != rank
            || from.file().abs_diff(to.file()) != 2
        {
            return None;
        }

        let side = if to.file() > from.file() {
            CastleSide::KingSide
        } else {
            CastleSide::QueenSide
        };
        let rook_from = Square::from_coords(side.rook_file(), rank);
        let rook = self
            .side_mut(king.color)
            .iter_mut()
            .find(|p| p.square == rook_from && p.kind == PieceKind::Rook)?;
        rook.square = Square::from_coords(side.castled_rook_file(), rank);
        rook.deployed = true;
        Some(side)
    }

    fn revoke_rights_for_move(&mut self, mover: &Piece, from: Square) {
        match mover.kind {
            PieceKind::King => self.rights_mut(mover.color).clear(),
            PieceKind::Rook if !mover.deployed && from.rank() == mover.color.back_rank() => {
                if let Some(side) = CastleSide::from_rook_file(from.file()) {
                    self.rights_mut(mover.color).remove(side);
                }
            }
            _ => {}
        }
    }

    fn revoke_rights_for_capture(&mut self, victim: &Piece) {
        if victim.kind == PieceKind::Rook && victim.square.rank() == victim.color.back_rank() {
            if let Some(side) = CastleSide::from_rook_file(victim.square.file()) {
                self.rights_mut(victim.color).remove(side);
            }
        }
    }

    fn locate(&self, square: Square) -> Option<(PieceColor, usize)> {
        [PieceColor::White, PieceColor::Black]
            .into_iter()
            .find_map(|color| {
                self.side(color)
                    .iter()
                    .position(|p| p.square == square)
                    .map(|index| (color, index))
            })
    }

    fn take_piece(&mut self, color: PieceColor, square: Square) -> Option<Piece> {
        let index = self.side(color).iter().position(|p| p.square == square)?;
        Some(self.side_mut(color).remove(index))
    }

    fn side(&self, color: PieceColor) -> &PieceList {
        match color {
            PieceColor::White => &self.white,
            PieceColor::Black => &self.black,
        }
    }

    fn side_mut(&mut self, color: PieceColor) -> &mut PieceList {
        match color {
            PieceColor::White => &mut self.white,
            PieceColor::Black => &mut self.black,
        }
    }

    fn rights_mut(&mut self, color: PieceColor) -> &mut CastlingRights {
        match color {
            PieceColor::White => &mut self.white_castling,
            PieceColor::Black => &mut self.black_castling,
        }
    }

    /// Pieces of one side in insertion order.
    pub fn pieces(&self, color: PieceColor) -> &[Piece] {
        self.side(color)
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.white
            .iter()
            .chain(self.black.iter())
            .find(|p| p.square == square)
    }

    pub fn king(&self, color: PieceColor) -> Option<&Piece> {
        self.side(color).iter().find(|p| p.kind == PieceKind::King)
    }

    /// Moves played since the start position, in long algebraic notation.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn active_player(&self) -> PieceColor {
        self.active_player
    }

    pub fn castling_rights(&self, color: PieceColor) -> CastlingRights {
        match color {
            PieceColor::White => self.white_castling,
            PieceColor::Black => self.black_castling,
        }
    }

    pub fn can_castle(&self, color: PieceColor, side: CastleSide) -> bool {
        self.castling_rights(color).has(side)
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn last_move_was_capture(&self) -> bool {
        self.last_move_capture
    }

    pub fn start_position(&self) -> &StartPosition {
        &self.start_position
    }

    /// Export position to FEN string
    pub fn to_fen(&self) -> String {
        fen::encode(self)
    }

    /// Build a full snapshot of the current state.
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut castling = Vec::new();
        for color in [PieceColor::White, PieceColor::Black] {
            for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                if self.can_castle(color, side) {
                    castling.push(CastlingFlag { color, side });
                }
            }
        }

        BoardSnapshot {
            fen: self.to_fen(),
            white: self.white.to_vec(),
            black: self.black.to_vec(),
            history: self.history.clone(),
            active_player: self.active_player,
            castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            last_move_capture: self.last_move_capture,
            start_position: self.start_position.clone(),
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

/// The standard arrangement, inserted in the same order decoding
/// [`fen::STARTING_FEN`] would produce.
fn standard_position() -> DecodedPosition {
    let mut white = PieceList::new();
    let mut black = PieceList::new();

    for (file, kind) in (1u8..).zip(BACK_RANK) {
        black.push(Piece::new(PieceColor::Black, kind, Square::from_coords(file, 8)));
    }
    for file in 1..=8 {
        black.push(Piece::new(
            PieceColor::Black,
            PieceKind::Pawn,
            Square::from_coords(file, 7),
        ));
        white.push(Piece::new(
            PieceColor::White,
            PieceKind::Pawn,
            Square::from_coords(file, 2),
        ));
    }
    for (file, kind) in (1u8..).zip(BACK_RANK) {
        white.push(Piece::new(PieceColor::White, kind, Square::from_coords(file, 1)));
    }

    DecodedPosition {
        white,
        black,
        active_player: PieceColor::White,
        white_castling: CastlingRights::BOTH,
        black_castling: CastlingRights::BOTH,
        en_passant: None,
        halfmove_clock: 0,
        fullmove_number: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::STARTING_FEN;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn play(board: &mut BoardState, moves: &[&str]) {
        for text in moves {
            let mv: UciMove = text.parse().unwrap();
            board.apply_uci(&mv).unwrap();
        }
    }

    #[test]
    fn test_new_matches_starting_fen() {
        let built = BoardState::new();
        let decoded = BoardState::from_fen(STARTING_FEN).unwrap();
        assert_eq!(built.to_fen(), STARTING_FEN);
        assert_eq!(built.pieces(PieceColor::White), decoded.pieces(PieceColor::White));
        assert_eq!(built.pieces(PieceColor::Black), decoded.pieces(PieceColor::Black));
        assert_eq!(built.start_position(), &StartPosition::Standard);
    }

    #[test]
    fn test_e4_e5_scenario() {
        let mut board = BoardState::new();
        play(&mut board, &["e2e4"]);
        assert_eq!(board.fullmove_number(), 1);
        assert_eq!(board.en_passant(), Some(sq("e3")));
        assert_eq!(board.active_player(), PieceColor::Black);

        play(&mut board, &["e7e5"]);
        let e5 = board.piece_at(sq("e5")).unwrap();
        assert_eq!((e5.color, e5.kind), (PieceColor::Black, PieceKind::Pawn));
        assert!(board.piece_at(sq("e2")).is_none());
        let e4 = board.piece_at(sq("e4")).unwrap();
        assert_eq!((e4.color, e4.kind), (PieceColor::White, PieceKind::Pawn));
        assert!(e4.deployed);
        assert_eq!(board.fullmove_number(), 2);
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.history(), ["e2e4", "e7e5"]);
        assert_eq!(
            board.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
        );
    }

    #[test]
    fn test_halfmove_clock() {
        let mut board = BoardState::new();
        play(&mut board, &["g1f3", "g8f6", "b1c3"]);
        assert_eq!(board.halfmove_clock(), 3);
        play(&mut board, &["d7d5"]);
        assert_eq!(board.halfmove_clock(), 0);
        play(&mut board, &["f3e5", "b8c6"]);
        assert_eq!(board.halfmove_clock(), 2);
        // knight takes knight
        play(&mut board, &["e5c6"]);
        assert_eq!(board.halfmove_clock(), 0);
        assert!(board.last_move_was_capture());
        assert_eq!(board.pieces(PieceColor::Black).len(), 15);
    }

    #[test]
    fn test_no_piece_at_square() {
        let mut board = BoardState::new();
        let before = board.to_fen();
        assert_eq!(
            board.apply_move(sq("e4"), sq("e5")),
            Err(ChessError::NoPieceAtSquare(sq("e4")))
        );
        assert_eq!(board.to_fen(), before);
        assert!(board.history().is_empty());
    }

    #[test]
    fn test_king_move_revokes_both_rights() {
        let mut board = BoardState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        board.apply_move(sq("e1"), sq("e2")).unwrap();
        assert!(!board.can_castle(PieceColor::White, CastleSide::KingSide));
        assert!(!board.can_castle(PieceColor::White, CastleSide::QueenSide));
        assert!(board.can_castle(PieceColor::Black, CastleSide::KingSide));
        assert!(board.can_castle(PieceColor::Black, CastleSide::QueenSide));
    }

    #[test]
    fn test_rook_move_revokes_its_wing() {
        let mut board = BoardState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        board.apply_move(sq("h1"), sq("h4")).unwrap();
        assert!(!board.can_castle(PieceColor::White, CastleSide::KingSide));
        assert!(board.can_castle(PieceColor::White, CastleSide::QueenSide));
        assert_eq!(board.to_fen(), "r3k2r/8/8/8/7R/8/8/R3K3 b Qkq - 1 1");
    }

    #[test]
    fn test_capturing_home_rook_revokes_owner_right() {
        let mut board = BoardState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        board.apply_move(sq("a1"), sq("a8")).unwrap();
        assert!(!board.can_castle(PieceColor::Black, CastleSide::QueenSide));
        assert!(board.can_castle(PieceColor::Black, CastleSide::KingSide));
        assert!(!board.can_castle(PieceColor::White, CastleSide::QueenSide));
        assert!(board.last_move_was_capture());
        assert_eq!(board.halfmove_clock(), 0);
    }

    #[test]
    fn test_castling_carries_rook() {
        let mut board = BoardState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 3 10").unwrap();
        let applied = board.apply_move(sq("e1"), sq("g1")).unwrap();
        assert_eq!(applied.castled, Some(CastleSide::KingSide));
        assert_eq!(board.piece_at(sq("f1")).unwrap().kind, PieceKind::Rook);
        assert!(board.piece_at(sq("h1")).is_none());

        let applied = board.apply_move(sq("e8"), sq("c8")).unwrap();
        assert_eq!(applied.castled, Some(CastleSide::QueenSide));
        assert_eq!(board.piece_at(sq("d8")).unwrap().kind, PieceKind::Rook);
        assert_eq!(board.to_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 5 11");
    }

    #[test]
    fn test_en_passant_capture_removes_passed_pawn() {
        let mut board = BoardState::new();
        play(&mut board, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(board.en_passant(), Some(sq("d6")));
        let applied = board.apply_move(sq("e5"), sq("d6")).unwrap();
        assert_eq!(applied.captured.unwrap().square, sq("d5"));
        assert!(board.piece_at(sq("d5")).is_none());
        assert_eq!(board.en_passant(), None);
        assert!(board.last_move_was_capture());
    }

    #[test]
    fn test_promotion_keeps_identity_and_records_fifth_char() {
        let mut board = BoardState::from_fen("8/P6k/8/8/8/8/8/K7 w - - 7 40").unwrap();
        let before = board.pieces(PieceColor::White).len();
        let applied = board
            .promote_piece(sq("a7"), sq("a8"), PieceKind::Queen)
            .unwrap();
        assert_eq!(applied.piece.kind, PieceKind::Queen);
        assert_eq!(applied.piece.color, PieceColor::White);
        assert_eq!(board.pieces(PieceColor::White).len(), before);
        // same slot in the insertion-ordered collection
        assert_eq!(board.pieces(PieceColor::White)[0].square, sq("a8"));
        assert_eq!(board.history(), ["a7a8q"]);
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.to_fen(), "Q7/7k/8/8/8/8/8/K7 b - - 0 40");
    }

    #[test]
    fn test_apply_uci_dispatches_promotion() {
        let mut board = BoardState::from_fen("k7/8/8/8/8/8/p7/7K b - - 0 1").unwrap();
        board.apply_uci(&"a2a1n".parse().unwrap()).unwrap();
        assert_eq!(board.piece_at(sq("a1")).unwrap().kind, PieceKind::Knight);
        assert_eq!(board.fullmove_number(), 2);
    }

    #[test]
    fn test_new_position_failure_leaves_state() {
        let mut board = BoardState::new();
        play(&mut board, &["d2d4"]);
        let before = board.to_fen();
        assert!(matches!(
            board.new_position("not a fen"),
            Err(ChessError::MalformedNotation(_))
        ));
        assert_eq!(board.to_fen(), before);
        assert_eq!(board.history(), ["d2d4"]);

        board.new_position("8/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert!(board.pieces(PieceColor::White).is_empty());
        assert!(board.history().is_empty());
        assert!(board.king(PieceColor::White).is_none());

        board.new_game();
        assert_eq!(board.to_fen(), STARTING_FEN);
    }

    #[test]
    fn test_fen_start_position_is_canonical() {
        let board = BoardState::from_fen("k/8/8/8/8/8/8/K  w - - 0 1").unwrap();
        assert_eq!(
            board.start_position(),
            &StartPosition::Fen("k7/8/8/8/8/8/8/K7 w - - 0 1".to_string())
        );

        let board = BoardState::from_fen("8/8/8/8/8/8/8/K6k w - -\n0 1").unwrap();
        let StartPosition::Fen(text) = board.start_position() else {
            panic!("expected a FEN start position");
        };
        assert!(!text.contains('\n'));
        assert_eq!(text, "8/8/8/8/8/8/8/K6k w - - 0 1");
    }

    #[test]
    fn test_counters_saturate() {
        let mut board =
            BoardState::from_fen("k7/8/8/8/8/8/8/K7 b - - 4294967295 4294967295").unwrap();
        board.apply_move(sq("a8"), sq("b8")).unwrap();
        assert_eq!(board.halfmove_clock(), u32::MAX);
        assert_eq!(board.fullmove_number(), u32::MAX);
    }

    #[test]
    fn test_snapshot_reflects_board() {
        let mut board = BoardState::new();
        play(&mut board, &["e2e4"]);
        let snap = board.snapshot();
        assert_eq!(snap.fen, board.to_fen());
        assert_eq!(snap.last_move(), Some("e2e4"));
        assert_eq!(snap.active_player, PieceColor::Black);
        assert!(snap.can_castle(PieceColor::White, CastleSide::KingSide));
        assert_eq!(snap.castling.len(), 4);
        assert_eq!(snap.white.len(), 16);
    }
}
