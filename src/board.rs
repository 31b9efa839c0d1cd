use std::fmt;

use crate::error::{ChessError, ChessResult};
use crate::movegen::Move;

/// Square index, a1 = 0, b1 = 1, ..., h8 = 63.
pub type Square = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Promotion choices, in generation order.
    pub const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    /// Index into the per-color bitboard arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Upper case for White, lower case for Black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<(Piece, Color)> {
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some((piece, color))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

pub const WHITE_KINGSIDE: u8 = 0b0001;
pub const WHITE_QUEENSIDE: u8 = 0b0010;
pub const BLACK_KINGSIDE: u8 = 0b0100;
pub const BLACK_QUEENSIDE: u8 = 0b1000;
pub const ALL_CASTLING: u8 = 0b1111;

/// Geometry of one of the four castling moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Castle {
    pub right: u8,
    pub color: Color,
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
    /// Squares between king and rook that must be empty
    pub between: u64,
    /// Square the king passes over
    pub transit: Square,
}

pub const CASTLES: [Castle; 4] = [
    Castle {
        right: WHITE_KINGSIDE,
        color: Color::White,
        king_from: 4,
        king_to: 6,
        rook_from: 7,
        rook_to: 5,
        between: (1 << 5) | (1 << 6),
        transit: 5,
    },
    Castle {
        right: WHITE_QUEENSIDE,
        color: Color::White,
        king_from: 4,
        king_to: 2,
        rook_from: 0,
        rook_to: 3,
        between: (1 << 1) | (1 << 2) | (1 << 3),
        transit: 3,
    },
    Castle {
        right: BLACK_KINGSIDE,
        color: Color::Black,
        king_from: 60,
        king_to: 62,
        rook_from: 63,
        rook_to: 61,
        between: (1 << 61) | (1 << 62),
        transit: 61,
    },
    Castle {
        right: BLACK_QUEENSIDE,
        color: Color::Black,
        king_from: 60,
        king_to: 58,
        rook_from: 56,
        rook_to: 59,
        between: (1 << 57) | (1 << 58) | (1 << 59),
        transit: 59,
    },
];

/// Looks up the castle whose king lands on `king_to`.
pub fn castle_for(king_to: Square) -> Option<&'static Castle> {
    CASTLES.iter().find(|castle| castle.king_to == king_to)
}

/// Castling rights lost when a piece leaves or lands on `square`.
fn rights_touched_by(square: Square) -> u8 {
    match square {
        0 => WHITE_QUEENSIDE,
        4 => WHITE_KINGSIDE | WHITE_QUEENSIDE,
        7 => WHITE_KINGSIDE,
        56 => BLACK_QUEENSIDE,
        60 => BLACK_KINGSIDE | BLACK_QUEENSIDE,
        63 => BLACK_KINGSIDE,
        _ => 0,
    }
}

pub fn square_mask(square: Square) -> u64 {
    1u64 << square
}

pub fn rank_of(square: Square) -> u8 {
    square / 8
}

pub fn file_of(square: Square) -> u8 {
    square % 8
}

/// Square of the pawn taken by an en passant capture landing on `to`.
pub fn en_passant_victim(to: Square, mover: Color) -> Square {
    match mover {
        Color::White => to - 8,
        Color::Black => to + 8,
    }
}

/// Everything that decides whether two positions repeat: placement, side to
/// move, castling rights and en passant square. Counters are left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    white_pieces: [u64; 6],
    black_pieces: [u64; 6],
    side_to_move: Color,
    castling_rights: u8,
    en_passant_square: Option<Square>,
}

/// State a move overwrites that the move itself does not carry.
#[derive(Debug, Clone, PartialEq)]
struct Undo {
    mv: Move,
    key: PositionKey,
    castling_rights: u8,
    en_passant_square: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub white_pieces: [u64; 6],  // Pawn, Knight, Bishop, Rook, Queen, King
    pub black_pieces: [u64; 6],  // Pawn, Knight, Bishop, Rook, Queen, King
    pub side_to_move: Color,
    pub castling_rights: u8,  // 4 bits: qkQK, see WHITE_KINGSIDE etc.
    pub en_passant_square: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    history: Vec<Undo>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting position.
    pub fn new() -> Self {
        Self {
            white_pieces: [
                0x000000000000FF00,  // Pawns
                0x0000000000000042,  // Knights
                0x0000000000000024,  // Bishops
                0x0000000000000081,  // Rooks
                0x0000000000000008,  // Queen
                0x0000000000000010,  // King
            ],
            black_pieces: [
                0x00FF000000000000,  // Pawns
                0x4200000000000000,  // Knights
                0x2400000000000000,  // Bishops
                0x8100000000000000,  // Rooks
                0x0800000000000000,  // Queen
                0x1000000000000000,  // King
            ],
            side_to_move: Color::White,
            castling_rights: ALL_CASTLING,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    /// A board with no pieces, White to move and no castling rights.
    pub fn empty() -> Self {
        Self {
            white_pieces: [0; 6],
            black_pieces: [0; 6],
            side_to_move: Color::White,
            castling_rights: 0,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    pub fn pieces(&self, color: Color) -> &[u64; 6] {
        match color {
            Color::White => &self.white_pieces,
            Color::Black => &self.black_pieces,
        }
    }

    fn pieces_mut(&mut self, color: Color) -> &mut [u64; 6] {
        match color {
            Color::White => &mut self.white_pieces,
            Color::Black => &mut self.black_pieces,
        }
    }

    pub fn occupancy(&self, color: Color) -> u64 {
        self.pieces(color).iter().fold(0, |acc, bb| acc | bb)
    }

    pub fn occupied(&self) -> u64 {
        self.occupancy(Color::White) | self.occupancy(Color::Black)
    }

    pub fn get_piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        let mask = square_mask(square);
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                if self.pieces(color)[piece.index()] & mask != 0 {
                    return Some((piece, color));
                }
            }
        }
        None
    }

    /// Places a piece, replacing whatever stood on the square.
    pub fn put_piece(&mut self, square: Square, piece: Piece, color: Color) {
        self.remove_piece(square);
        self.pieces_mut(color)[piece.index()] |= square_mask(square);
    }

    pub fn remove_piece(&mut self, square: Square) -> Option<(Piece, Color)> {
        let found = self.get_piece_at(square)?;
        self.pieces_mut(found.1)[found.0.index()] &= !square_mask(square);
        Some(found)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        let kings = self.pieces(color)[Piece::King.index()];
        (kings != 0).then(|| kings.trailing_zeros() as Square)
    }

    /// Number of moves that can currently be undone.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|undo| undo.mv)
    }

    pub fn position_key(&self) -> PositionKey {
        PositionKey {
            white_pieces: self.white_pieces,
            black_pieces: self.black_pieces,
            side_to_move: self.side_to_move,
            castling_rights: self.castling_rights,
            en_passant_square: self.en_passant_square,
        }
    }

    /// How many times the current position has occurred, this time included.
    ///
    /// Only positions since the last capture or pawn move can repeat, so the
    /// walk back through the history stops after `halfmove_clock` plies.
    pub fn repetition_count(&self) -> usize {
        let current = self.position_key();
        let reversible = (self.halfmove_clock as usize).min(self.history.len());

        1 + self
            .history
            .iter()
            .rev()
            .take(reversible)
            .skip(1)
            .step_by(2)
            .filter(|undo| undo.key == current)
            .count()
    }

    /// Plays `mv`, after checking it fits the current placement.
    ///
    /// Nothing is modified when an error is returned.
    pub fn apply_move(&mut self, mv: Move) -> ChessResult<()> {
        self.validate_move(&mv)?;
        self.make_move(mv);
        Ok(())
    }

    /// Takes back the most recent move and returns it.
    pub fn undo_move(&mut self) -> ChessResult<Move> {
        self.unmake_move().ok_or(ChessError::EmptyHistory)
    }

    /// Checks that `mv` is consistent with the pieces on the board.
    ///
    /// This is not a legality test: a consistent move may still leave the
    /// mover's king in check or ignore the piece's movement pattern.
    pub fn validate_move(&self, mv: &Move) -> ChessResult<()> {
        let invalid = |reason: &'static str| {
            Err(ChessError::InvalidMove {
                mv: mv.to_string(),
                reason,
            })
        };

        let us = self.side_to_move;
        let them = us.opposite();

        if mv.from > 63 || mv.to > 63 || mv.from == mv.to {
            return invalid("squares out of range");
        }

        match self.get_piece_at(mv.from) {
            None => return invalid("no piece on origin square"),
            Some((piece, color)) if piece != mv.piece || color != us => {
                return invalid("origin square holds a different piece")
            }
            Some(_) => {}
        }

        let target = self.get_piece_at(mv.to);
        if mv.is_en_passant {
            if mv.piece != Piece::Pawn
                || self.en_passant_square != Some(mv.to)
                || target.is_some()
                || mv.captured_piece != Some(Piece::Pawn)
            {
                return invalid("en passant does not match the board");
            }
            if self.get_piece_at(en_passant_victim(mv.to, us)) != Some((Piece::Pawn, them)) {
                return invalid("no pawn to capture en passant");
            }
        } else {
            match target {
                Some((_, color)) if color == us => {
                    return invalid("destination occupied by own piece")
                }
                Some((Piece::King, _)) => return invalid("king cannot be captured"),
                Some((piece, _)) if mv.captured_piece != Some(piece) => {
                    return invalid("captured piece does not match destination")
                }
                None if mv.captured_piece.is_some() => return invalid("nothing to capture"),
                _ => {}
            }
        }

        let last_rank = match us {
            Color::White => 7,
            Color::Black => 0,
        };
        match mv.promotion {
            Some(Piece::Pawn) | Some(Piece::King) => return invalid("bad promotion piece"),
            Some(_) if mv.piece != Piece::Pawn || rank_of(mv.to) != last_rank => {
                return invalid("promotion off the last rank")
            }
            None if mv.piece == Piece::Pawn && rank_of(mv.to) == last_rank => {
                return invalid("pawn on the last rank must promote")
            }
            _ => {}
        }

        if mv.is_double_push {
            let forward: i16 = match us {
                Color::White => 16,
                Color::Black => -16,
            };
            if mv.piece != Piece::Pawn || mv.to as i16 - mv.from as i16 != forward {
                return invalid("not a two-square pawn push");
            }
        }

        if mv.is_castling {
            let castle = match castle_for(mv.to) {
                Some(castle) => castle,
                None => return invalid("not a castling destination"),
            };
            if mv.piece != Piece::King || castle.color != us || castle.king_from != mv.from {
                return invalid("castling king not on its home square");
            }
            if self.castling_rights & castle.right == 0 {
                return invalid("castling right already lost");
            }
            if self.get_piece_at(castle.rook_from) != Some((Piece::Rook, us)) {
                return invalid("no rook to castle with");
            }
            if self.occupied() & castle.between != 0 {
                return invalid("castling path is blocked");
            }
        }

        Ok(())
    }

    /// Plays a move without validation. Callers guarantee consistency.
    pub(crate) fn make_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = us.opposite();
        let from_mask = square_mask(mv.from);
        let to_mask = square_mask(mv.to);

        self.history.push(Undo {
            mv,
            key: self.position_key(),
            castling_rights: self.castling_rights,
            en_passant_square: self.en_passant_square,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });

        if let Some(captured) = mv.captured_piece {
            let captured_square = if mv.is_en_passant {
                en_passant_victim(mv.to, us)
            } else {
                mv.to
            };
            self.pieces_mut(them)[captured.index()] &= !square_mask(captured_square);
        }

        let ours = self.pieces_mut(us);
        ours[mv.piece.index()] &= !from_mask;
        ours[mv.promotion.unwrap_or(mv.piece).index()] |= to_mask;

        if mv.is_castling {
            if let Some(castle) = castle_for(mv.to) {
                ours[Piece::Rook.index()] ^=
                    square_mask(castle.rook_from) | square_mask(castle.rook_to);
            }
        }

        self.castling_rights &= !(rights_touched_by(mv.from) | rights_touched_by(mv.to));

        self.en_passant_square = if mv.is_double_push {
            Some((mv.from + mv.to) / 2)
        } else {
            None
        };

        if mv.piece == Piece::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.side_to_move = them;
    }

    /// Reverses the last `make_move`, or returns `None` if there is none.
    pub(crate) fn unmake_move(&mut self) -> Option<Move> {
        let undo = self.history.pop()?;
        let mv = undo.mv;
        let us = self.side_to_move.opposite();
        let them = self.side_to_move;

        let ours = self.pieces_mut(us);
        ours[mv.promotion.unwrap_or(mv.piece).index()] &= !square_mask(mv.to);
        ours[mv.piece.index()] |= square_mask(mv.from);

        if mv.is_castling {
            if let Some(castle) = castle_for(mv.to) {
                ours[Piece::Rook.index()] ^=
                    square_mask(castle.rook_from) | square_mask(castle.rook_to);
            }
        }

        if let Some(captured) = mv.captured_piece {
            let captured_square = if mv.is_en_passant {
                en_passant_victim(mv.to, us)
            } else {
                mv.to
            };
            self.pieces_mut(them)[captured.index()] |= square_mask(captured_square);
        }

        self.side_to_move = us;
        self.castling_rights = undo.castling_rights;
        self.en_passant_square = undo.en_passant_square;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;

        Some(mv)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let symbol = match self.get_piece_at(rank * 8 + file) {
                    Some((piece, color)) => piece.to_char(color),
                    None => '.',
                };
                write!(f, "{}", symbol)?;
                if file < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}
