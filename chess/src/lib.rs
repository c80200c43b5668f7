//! Board model and positional notation codec.
//!
//! [`BoardState`] keeps the local view of a game in step with an external
//! engine; [`fen`] converts it to and from FEN text.

pub mod board;
pub mod castling;
pub mod error;
pub mod fen;
pub mod piece;
pub mod snapshot;
pub mod square;
pub mod types;
pub mod uci;

pub use board::{AppliedMove, BoardState, StartPosition};
pub use castling::{CastleSide, CastlingRights};
pub use error::ChessError;
pub use fen::{DecodedPosition, FenError, STARTING_FEN};
pub use piece::Piece;
pub use snapshot::{BoardSnapshot, CastlingFlag};
pub use square::Square;
pub use types::{PieceColor, PieceKind};
pub use uci::{format_uci_move, parse_uci_move, UciMove};
