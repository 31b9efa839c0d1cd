use crate::board::{Board, Color, Piece, Square};
use crate::movegen::{GameState, MoveGenerator};

/// Score of a mated position, from the winner's side.
pub const CHECKMATE_SCORE: i32 = 9999;

// Pawn, Knight, Bishop, Rook, Queen, King
const PIECE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 20000];

// Piece-square tables from White's side. Row order is rank 1 first, so
// index = square for White. Black reads the table with its ranks flipped.
const PAWN_TABLE: [i32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0,
    5, 10, 10, -20, -20, 10, 10, 5,
    5, -5, -10, 0, 0, -10, -5, 5,
    0, 0, 0, 20, 20, 0, 0, 0,
    5, 5, 10, 25, 25, 10, 5, 5,
    10, 10, 20, 30, 30, 20, 10, 10,
    50, 50, 50, 50, 50, 50, 50, 50,
    0, 0, 0, 0, 0, 0, 0, 0,
];

// Shared by both colors
const KNIGHT_TABLE: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20, 0, 0, 0, 0, -20, -40,
    -30, 0, 10, 15, 15, 10, 0, -30,
    -30, 5, 15, 20, 20, 15, 5, -30,
    -30, 0, 15, 20, 20, 15, 0, -30,
    -30, 5, 10, 15, 15, 10, 5, -30,
    -40, -20, 0, 5, 5, 0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

const BISHOP_TABLE: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10, 5, 0, 0, 0, 0, 5, -10,
    -10, 10, 10, 10, 10, 10, 10, -10,
    -10, 0, 10, 10, 10, 10, 0, -10,
    -10, 5, 5, 10, 10, 5, 5, -10,
    -10, 0, 5, 10, 10, 5, 0, -10,
    -10, 0, 0, 0, 0, 0, 0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

const ROOK_TABLE: [i32; 64] = [
    0, 0, 0, 5, 5, 0, 0, 0,
    -5, 0, 0, 0, 0, 0, 0, -5,
    -5, 0, 0, 0, 0, 0, 0, -5,
    -5, 0, 0, 0, 0, 0, 0, -5,
    -5, 0, 0, 0, 0, 0, 0, -5,
    -5, 0, 0, 0, 0, 0, 0, -5,
    5, 10, 10, 10, 10, 10, 10, 5,
    0, 0, 0, 0, 0, 0, 0, 0,
];

// Shared by both colors
const QUEEN_TABLE: [i32; 64] = [
    -20, -10, -10, -5, -5, -10, -10, -20,
    -10, 0, 0, 0, 0, 0, 0, -10,
    -10, 0, 5, 5, 5, 5, 0, -10,
    -5, 0, 5, 5, 5, 5, 0, -5,
    0, 0, 5, 5, 5, 5, 0, -5,
    -10, 5, 5, 5, 5, 5, 0, -10,
    -10, 0, 5, 0, 0, 0, 0, -10,
    -20, -10, -10, -5, -5, -10, -10, -20,
];

const KING_TABLE: [i32; 64] = [
    20, 30, 10, 0, 0, 10, 30, 20,
    20, 20, 0, 0, 0, 0, 20, 20,
    -10, -20, -20, -20, -20, -20, -20, -10,
    20, -30, -30, -40, -40, -30, -30, -20,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
];

pub fn material_value(piece: Piece) -> i32 {
    PIECE_VALUES[piece.index()]
}

pub fn positional_value(piece: Piece, color: Color, square: Square) -> i32 {
    let table = match piece {
        Piece::Pawn => &PAWN_TABLE,
        Piece::Knight => &KNIGHT_TABLE,
        Piece::Bishop => &BISHOP_TABLE,
        Piece::Rook => &ROOK_TABLE,
        Piece::Queen => &QUEEN_TABLE,
        Piece::King => &KING_TABLE,
    };
    let index = match (piece, color) {
        (Piece::Knight | Piece::Queen, _) | (_, Color::White) => square,
        (_, Color::Black) => square ^ 56,
    };
    table[index as usize]
}

/// Static evaluation in centipawns, positive when White is better.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    move_generator: MoveGenerator,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            move_generator: MoveGenerator::new(),
        }
    }

    pub fn evaluate(&self, board: &mut Board) -> i32 {
        let state = self.move_generator.get_game_state(board);
        self.evaluate_state(board, state)
    }

    /// Evaluates a board whose game state the caller already knows.
    pub fn evaluate_state(&self, board: &Board, state: GameState) -> i32 {
        match state {
            GameState::Checkmate(Color::White) => CHECKMATE_SCORE,
            GameState::Checkmate(Color::Black) => -CHECKMATE_SCORE,
            GameState::Stalemate
            | GameState::InsufficientMaterial
            | GameState::FivefoldRepetition => 0,
            GameState::Ongoing | GameState::SeventyFiveMoveRule => {
                self.material_and_position(board)
            }
        }
    }

    fn material_and_position(&self, board: &Board) -> i32 {
        let mut score = 0;
        for color in [Color::White, Color::Black] {
            let sign = match color {
                Color::White => 1,
                Color::Black => -1,
            };
            for piece in Piece::ALL {
                let mut bitboard = board.pieces(color)[piece.index()];
                while bitboard != 0 {
                    let square = bitboard.trailing_zeros() as Square;
                    bitboard &= bitboard - 1;
                    let value = material_value(piece) + positional_value(piece, color, square);
                    score += sign * value;
                }
            }
        }
        score
    }
}
