//! Forsyth-Edwards Notation for [`Board`].

use crate::board::{
    rank_of, Board, Color, Piece, BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE, WHITE_QUEENSIDE,
};
use crate::error::{ChessError, ChessResult};
use crate::notation::{parse_square, square_name};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const CASTLING_LETTERS: [(char, u8); 4] = [
    ('K', WHITE_KINGSIDE),
    ('Q', WHITE_QUEENSIDE),
    ('k', BLACK_KINGSIDE),
    ('q', BLACK_QUEENSIDE),
];

impl Board {
    /// Parses a FEN string. The two move counters may be omitted.
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        let fail = |reason: &str| ChessError::parse(fen, reason);

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(fail("expected 4 to 6 fields"));
        }

        let mut board = Board::empty();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(fail("piece placement must have 8 ranks"));
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(fail("bad empty-square count"));
                    }
                    file += skip as u8;
                } else {
                    let (piece, color) =
                        Piece::from_char(c).ok_or_else(|| fail("unknown piece letter"))?;
                    if file >= 8 {
                        return Err(fail("rank has more than 8 squares"));
                    }
                    if piece == Piece::Pawn && (rank == 0 || rank == 7) {
                        return Err(fail("pawn on the first or last rank"));
                    }
                    board.put_piece(rank * 8 + file, piece, color);
                    file += 1;
                }
                if file > 8 {
                    return Err(fail("rank has more than 8 squares"));
                }
            }
            if file != 8 {
                return Err(fail("rank does not cover 8 squares"));
            }
        }

        for color in [Color::White, Color::Black] {
            if board.pieces(color)[Piece::King.index()].count_ones() != 1 {
                return Err(fail("each side needs exactly one king"));
            }
        }

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(fail("side to move must be `w` or `b`")),
        };

        if fields[2] != "-" {
            for c in fields[2].chars() {
                let (_, right) = CASTLING_LETTERS
                    .iter()
                    .find(|(letter, _)| *letter == c)
                    .ok_or_else(|| fail("bad castling field"))?;
                board.castling_rights |= right;
            }
        }

        if fields[3] != "-" {
            let square = parse_square(fields[3]).ok_or_else(|| fail("bad en passant square"))?;
            let expected_rank = match board.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if rank_of(square) != expected_rank {
                return Err(fail("en passant square on the wrong rank"));
            }
            board.en_passant_square = Some(square);
        }

        if let Some(text) = fields.get(4) {
            board.halfmove_clock = text.parse().map_err(|_| fail("bad half-move clock"))?;
        }
        if let Some(text) = fields.get(5) {
            board.fullmove_number = text.parse().map_err(|_| fail("bad full-move number"))?;
        }

        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.get_piece_at(rank * 8 + file) {
                    Some((piece, color)) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.to_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let castling: String = CASTLING_LETTERS
            .iter()
            .filter(|(_, right)| self.castling_rights & right != 0)
            .map(|(letter, _)| *letter)
            .collect();
        let castling = if castling.is_empty() { "-".to_string() } else { castling };

        let en_passant = self
            .en_passant_square
            .map_or_else(|| "-".to_string(), square_name);

        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, en_passant, self.halfmove_clock, self.fullmove_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ALL_CASTLING;

    #[test]
    fn test_starting_fen_matches_new_board() {
        let board = Board::from_fen(STARTING_FEN).unwrap();
        assert_eq!(board, Board::new());
        assert_eq!(Board::new().to_fen(), STARTING_FEN);
    }

    #[test]
    fn test_fen_fields_are_read() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R b Kq e3 3 17";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.side_to_move, Color::Black);
        assert_eq!(board.castling_rights, WHITE_KINGSIDE | BLACK_QUEENSIDE);
        assert_eq!(board.en_passant_square, Some(20));
        assert_eq!(board.halfmove_clock, 3);
        assert_eq!(board.fullmove_number, 17);
        assert_eq!(board.get_piece_at(52), Some((Piece::Queen, Color::Black)));
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn test_counters_default_when_missing() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert_eq!(board.halfmove_clock, 0);
        assert_eq!(board.fullmove_number, 1);
        assert_eq!(board.castling_rights & ALL_CASTLING, 0);
    }

    #[test]
    fn test_malformed_fen_is_rejected() {
        let bad = [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e4 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",
            "rnbq1bnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQ - 0 1",
            "Pnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        ];
        for fen in bad {
            assert!(
                matches!(Board::from_fen(fen), Err(ChessError::Parse { .. })),
                "accepted {:?}",
                fen
            );
        }
    }
}
