use std::collections::BTreeSet;

use chess::{BoardState, PieceColor, STARTING_FEN};
use cozy_chess::{Board, File, Move, Piece, Square};
use proptest::prelude::*;

fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

/// cozy-chess encodes castling as king-takes-rook; engines send the king's two-file step.
fn uci_text(board: &Board, mv: Move) -> String {
    let to = if board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move())
    {
        let file = if mv.to.file() as usize > mv.from.file() as usize {
            File::G
        } else {
            File::C
        };
        Square::new(file, mv.from.rank())
    } else {
        mv.to
    };

    let mut text = format!("{}{}", mv.from, to);
    if let Some(promo) = mv.promotion {
        text.push(match promo {
            Piece::Queen => 'q',
            Piece::Rook => 'r',
            Piece::Bishop => 'b',
            Piece::Knight => 'n',
            _ => unreachable!(),
        });
    }
    text
}

fn piece_set(board: &BoardState) -> BTreeSet<(bool, char, String)> {
    [PieceColor::White, PieceColor::Black]
        .into_iter()
        .flat_map(|color| board.pieces(color).iter())
        .map(|p| (p.color == PieceColor::White, p.fen_char(), p.square.to_string()))
        .collect()
}

fn fields(fen: &str, indices: &[usize]) -> Vec<String> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    indices.iter().map(|i| parts[*i].to_string()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn decode_encode_round_trip_after_random_play(
        choices in proptest::collection::vec(any::<u16>(), 0..120)
    ) {
        let mut reference = Board::default();
        let mut board = BoardState::new();

        for choice in choices {
            let legal = legal_moves(&reference);
            if legal.is_empty() {
                break;
            }
            let mv = legal[choice as usize % legal.len()];
            let text = uci_text(&reference, mv);
            reference.play_unchecked(mv);
            board.apply_uci(&text.parse().unwrap()).unwrap();

            let encoded = board.to_fen();
            let decoded = BoardState::from_fen(&encoded).unwrap();

            prop_assert_eq!(decoded.to_fen(), encoded.clone());
            prop_assert_eq!(piece_set(&decoded), piece_set(&board));
            prop_assert_eq!(decoded.active_player(), board.active_player());
            for color in [PieceColor::White, PieceColor::Black] {
                prop_assert_eq!(decoded.castling_rights(color), board.castling_rights(color));
            }
            prop_assert_eq!(decoded.en_passant(), board.en_passant());
            prop_assert_eq!(decoded.halfmove_clock(), board.halfmove_clock());
            prop_assert_eq!(decoded.fullmove_number(), board.fullmove_number());

            // placement, side to move and counters agree with an independent implementation
            let reference_fen = reference.to_string();
            prop_assert_eq!(
                fields(&encoded, &[0, 1, 4, 5]),
                fields(&reference_fen, &[0, 1, 4, 5])
            );
        }
    }
}

#[test]
fn encoded_start_position_parses_in_cozy_chess() {
    let fen = BoardState::new().to_fen();
    assert_eq!(fen, STARTING_FEN);
    let reference: Board = fen.parse().unwrap();
    assert_eq!(reference.to_string(), Board::default().to_string());
}

#[test]
fn snapshot_serializes_to_json() {
    let mut board = BoardState::new();
    board
        .apply_move("e2".parse().unwrap(), "e4".parse().unwrap())
        .unwrap();
    let json = serde_json::to_value(board.snapshot()).unwrap();
    assert_eq!(json["active_player"], "black");
    assert_eq!(json["history"][0], "e2e4");
    assert_eq!(json["en_passant"], "e3");
    assert_eq!(json["start_position"]["kind"], "standard");
    assert_eq!(json["white"].as_array().unwrap().len(), 16);
}
