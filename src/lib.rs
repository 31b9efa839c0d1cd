pub mod board;
pub mod error;
pub mod evaluation;
pub mod fen;
pub mod movegen;
pub mod notation;
pub mod search;
pub mod uci;

pub use board::{Board, Color, Piece, Square};
pub use error::{ChessError, ChessResult};
pub use evaluation::Evaluator;
pub use movegen::{GameState, Move, MoveGenerator};
pub use notation::{apply_move_notation, parse_move};
pub use search::{Search, SearchResult};

/// Builds the starting position, or the position described by `fen`.
pub fn new_board(fen: Option<&str>) -> ChessResult<Board> {
    match fen {
        Some(fen) => Board::from_fen(fen),
        None => Ok(Board::new()),
    }
}

/// Searches `depth` plies from `board` with a fresh [`Search`].
pub fn search(board: &mut Board, depth: u32) -> ChessResult<SearchResult> {
    Search::new().search(board, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn perft(fen: &str, depth: u32) -> u64 {
        let mut board = new_board(Some(fen)).unwrap();
        MoveGenerator::new().perft(&mut board, depth)
    }

    #[test]
    fn test_new_board() {
        assert_eq!(new_board(None).unwrap(), Board::new());
        assert!(matches!(
            new_board(Some("not a position")),
            Err(ChessError::Parse { .. })
        ));
    }

    #[test]
    fn test_perft_kiwipete() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        assert_eq!(perft(fen, 1), 48);
        assert_eq!(perft(fen, 2), 2039);
    }

    #[test]
    fn test_perft_rook_endgame() {
        let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
        assert_eq!(perft(fen, 1), 14);
        assert_eq!(perft(fen, 2), 191);
        assert_eq!(perft(fen, 3), 2812);
    }

    #[test]
    fn test_perft_promotions_and_castling() {
        let fen = "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1";
        assert_eq!(perft(fen, 1), 6);
        assert_eq!(perft(fen, 2), 264);

        let fen = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
        assert_eq!(perft(fen, 1), 44);
        assert_eq!(perft(fen, 2), 1486);
    }

    #[test]
    fn test_random_playouts_unwind_exactly() {
        let generator = MoveGenerator::new();
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..20 {
            let mut board = Board::new();
            let mut snapshots = vec![board.clone()];

            for _ in 0..80 {
                let moves = generator.legal_moves(&mut board);
                // Every legal move must apply and undo without a trace
                for &mv in &moves {
                    let before = board.clone();
                    board.apply_move(mv).unwrap();
                    assert!(!generator.is_king_in_check(&board, before.side_to_move));
                    board.undo_move().unwrap();
                    assert_eq!(board, before);
                }
                match moves.choose(&mut rng) {
                    Some(&mv) => board.apply_move(mv).unwrap(),
                    None => break,
                }
                snapshots.push(board.clone());
            }

            while let Some(expected) = snapshots.pop() {
                assert_eq!(board, expected);
                if board.undo_move().is_err() {
                    break;
                }
            }
            assert_eq!(board, Board::new());
        }
    }

    #[test]
    fn test_only_kings_is_a_draw_at_any_depth() {
        let mut board = new_board(Some("8/8/4k3/8/8/2K5/8/8 w - - 0 1")).unwrap();
        assert_eq!(Evaluator::new().evaluate(&mut board), 0);
        for depth in 1..=3 {
            let result = search(&mut board, depth).unwrap();
            assert_eq!(result.score, 0);
            assert!(result.best_move.is_some());
        }
    }

    #[test]
    fn test_play_out_a_short_game() {
        // Fool's mate, then nothing is left to search
        let mut board = Board::new();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            apply_move_notation(&mut board, text).unwrap();
        }
        let generator = MoveGenerator::new();
        assert_eq!(generator.get_game_state(&mut board), GameState::Checkmate(Color::Black));

        let result = search(&mut board, 2).unwrap();
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, -evaluation::CHECKMATE_SCORE);
    }
}
