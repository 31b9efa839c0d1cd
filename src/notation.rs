//! Compact move notation: origin square, destination square and an
//! optional promotion letter, e.g. `e2e4`, `e7e8q`, `e1g1`.

use std::fmt;

use crate::board::{file_of, rank_of, Board, Piece, Square};
use crate::error::{ChessError, ChessResult};
use crate::movegen::{Move, MoveGenerator};

pub fn square_name(square: Square) -> String {
    let file = (b'a' + file_of(square)) as char;
    let rank = (b'1' + rank_of(square)) as char;
    format!("{}{}", file, rank)
}

pub fn parse_square(text: &str) -> Option<Square> {
    match text.as_bytes() {
        [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Some((rank - b'1') * 8 + (file - b'a')),
        _ => None,
    }
}

fn promotion_letter(piece: Piece) -> Option<char> {
    match piece {
        Piece::Queen => Some('q'),
        Piece::Rook => Some('r'),
        Piece::Bishop => Some('b'),
        Piece::Knight => Some('n'),
        _ => None,
    }
}

fn promotion_piece(letter: char) -> Option<Piece> {
    match letter.to_ascii_lowercase() {
        'q' => Some(Piece::Queen),
        'r' => Some(Piece::Rook),
        'b' => Some(Piece::Bishop),
        'n' => Some(Piece::Knight),
        _ => None,
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))?;
        if let Some(letter) = self.promotion.and_then(promotion_letter) {
            write!(f, "{}", letter)?;
        }
        Ok(())
    }
}

/// Finds the legal move that `text` names in the current position.
///
/// Matching against the generated moves fills in the capture, castling,
/// en passant and double-push details the text does not carry.
pub fn parse_move(board: &mut Board, text: &str) -> ChessResult<Move> {
    let illegal = || ChessError::IllegalMove(text.to_string());

    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(illegal());
    }
    let from = parse_square(&text[0..2]).ok_or_else(illegal)?;
    let to = parse_square(&text[2..4]).ok_or_else(illegal)?;
    let promotion = match text[4..].chars().next() {
        Some(letter) => Some(promotion_piece(letter).ok_or_else(illegal)?),
        None => None,
    };

    MoveGenerator::new()
        .legal_moves(board)
        .into_iter()
        .find(|mv| mv.from == from && mv.to == to && mv.promotion == promotion)
        .ok_or_else(illegal)
}

/// Parses `text` against the legal moves and plays it.
pub fn apply_move_notation(board: &mut Board, text: &str) -> ChessResult<Move> {
    let mv = parse_move(board, text)?;
    board.apply_move(mv)?;
    Ok(mv)
}
