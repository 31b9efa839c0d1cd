use log::{debug, trace};

use crate::board::{Board, Color};
use crate::error::{ChessError, ChessResult};
use crate::evaluation::Evaluator;
use crate::movegen::{Move, MoveGenerator};

/// Bound wider than any evaluation, mate scores included.
pub const INFINITY: i32 = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// `None` exactly when the root position has no legal moves
    pub best_move: Option<Move>,
    /// Score from White's side, as the evaluator reports it
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
}

/// Fixed-depth minimax with alpha-beta pruning. White maximizes.
#[derive(Debug, Clone, Default)]
pub struct Search {
    evaluator: Evaluator,
    move_generator: MoveGenerator,
    nodes_searched: u64,
}

impl Search {
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::new(),
            move_generator: MoveGenerator::new(),
            nodes_searched: 0,
        }
    }

    /// Searches `depth` plies and returns the best move for the side to move.
    ///
    /// The board is mutated during the search and restored before returning,
    /// also when an error aborts the search. Among equally scored moves the
    /// first one in generation order is reported.
    pub fn search(&mut self, board: &mut Board, depth: u32) -> ChessResult<SearchResult> {
        if depth == 0 {
            return Err(ChessError::ZeroDepth);
        }
        self.nodes_searched = 1;

        let moves = self.move_generator.legal_moves(board);
        if moves.is_empty() {
            let state = self.move_generator.classify(board, &moves);
            let score = self.evaluator.evaluate_state(board, state);
            debug!("no legal moves ({:?}), score {}", state, score);
            return Ok(SearchResult {
                best_move: None,
                score,
                depth,
                nodes: self.nodes_searched,
            });
        }

        let maximizing = board.side_to_move == Color::White;
        let mut best_move = None;
        let mut best_score = if maximizing { -INFINITY } else { INFINITY };
        let mut alpha = -INFINITY;
        let mut beta = INFINITY;

        for mv in moves {
            board.apply_move(mv)?;
            let score = self.minimax(board, depth - 1, alpha, beta, !maximizing);
            board.undo_move()?;
            let score = score?;
            trace!("root move {} scored {}", mv, score);

            // Strict comparison keeps the earliest of equally scored moves. A later
            // child searched with the narrowed window can only tie, never overtake.
            let improved = if maximizing { score > best_score } else { score < best_score };
            if improved {
                best_score = score;
                best_move = Some(mv);
            }
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }

        debug!(
            "depth {} best {} score {} nodes {}",
            depth,
            best_move.map_or_else(|| "(none)".to_string(), |mv| mv.to_string()),
            best_score,
            self.nodes_searched
        );

        Ok(SearchResult {
            best_move,
            score: best_score,
            depth,
            nodes: self.nodes_searched,
        })
    }

    fn minimax(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> ChessResult<i32> {
        self.nodes_searched += 1;

        let moves = self.move_generator.legal_moves(board);
        let state = self.move_generator.classify(board, &moves);
        if depth == 0 || state.is_over() {
            return Ok(self.evaluator.evaluate_state(board, state));
        }

        let mut best_score = if maximizing { -INFINITY } else { INFINITY };
        for mv in moves {
            board.apply_move(mv)?;
            let score = self.minimax(board, depth - 1, alpha, beta, !maximizing);
            board.undo_move()?;
            let score = score?;

            if maximizing {
                best_score = best_score.max(score);
                alpha = alpha.max(score);
            } else {
                best_score = best_score.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        Ok(best_score)
    }

    pub fn get_nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}
