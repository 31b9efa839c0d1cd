use crate::board::{
    castle_for, en_passant_victim, file_of, rank_of, square_mask, Board, Color, Piece, Square,
    CASTLES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured_piece: Option<Piece>,
    pub promotion: Option<Piece>,
    pub is_en_passant: bool,
    pub is_castling: bool,
    pub is_double_push: bool,
}

impl Move {
    pub fn new(from: Square, to: Square, piece: Piece) -> Self {
        Self {
            from,
            to,
            piece,
            captured_piece: None,
            promotion: None,
            is_en_passant: false,
            is_castling: false,
            is_double_push: false,
        }
    }

    pub fn new_capture(from: Square, to: Square, piece: Piece, captured_piece: Piece) -> Self {
        Self {
            captured_piece: Some(captured_piece),
            ..Self::new(from, to, piece)
        }
    }

    pub fn new_double_push(from: Square, to: Square) -> Self {
        Self {
            is_double_push: true,
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    pub fn new_en_passant(from: Square, to: Square) -> Self {
        Self {
            captured_piece: Some(Piece::Pawn),
            is_en_passant: true,
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    pub fn new_castling(from: Square, to: Square) -> Self {
        Self {
            is_castling: true,
            ..Self::new(from, to, Piece::King)
        }
    }

    pub fn new_promotion(
        from: Square,
        to: Square,
        captured_piece: Option<Piece>,
        promotion: Piece,
    ) -> Self {
        Self {
            captured_piece,
            promotion: Some(promotion),
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

const DARK_SQUARES: u64 = 0xAA55AA55AA55AA55;
const LIGHT_SQUARES: u64 = !DARK_SQUARES;

/// Seventy-five moves by each side without a capture or pawn move.
const SEVENTY_FIVE_MOVE_PLIES: u16 = 150;

const FIVEFOLD_REPETITION: usize = 5;

/// Steps `square` by a rank and file delta, `None` when it leaves the board.
fn offset(square: Square, dr: i8, df: i8) -> Option<Square> {
    let rank = rank_of(square) as i8 + dr;
    let file = file_of(square) as i8 + df;
    if (0..8).contains(&rank) && (0..8).contains(&file) {
        Some((rank * 8 + file) as Square)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn is_square_under_attack(
        &self,
        board: &Board,
        square: Square,
        attacker_color: Color,
    ) -> bool {
        let attackers = board.pieces(attacker_color);
        let occupied = board.occupied();
        let holds = |bitboard: u64, sq: Square| bitboard & square_mask(sq) != 0;

        // An attacking pawn sits one rank behind the square, seen from its own side
        let pawn_rank = match attacker_color {
            Color::White => -1,
            Color::Black => 1,
        };
        for df in [-1, 1] {
            if let Some(sq) = offset(square, pawn_rank, df) {
                if holds(attackers[Piece::Pawn.index()], sq) {
                    return true;
                }
            }
        }

        for &(dr, df) in &KNIGHT_OFFSETS {
            if let Some(sq) = offset(square, dr, df) {
                if holds(attackers[Piece::Knight.index()], sq) {
                    return true;
                }
            }
        }

        for &(dr, df) in &KING_OFFSETS {
            if let Some(sq) = offset(square, dr, df) {
                if holds(attackers[Piece::King.index()], sq) {
                    return true;
                }
            }
        }

        let queens = attackers[Piece::Queen.index()];
        let rays = [
            (&DIAGONALS, attackers[Piece::Bishop.index()] | queens),
            (&ORTHOGONALS, attackers[Piece::Rook.index()] | queens),
        ];
        for (directions, sliders) in rays {
            for &(dr, df) in directions {
                let mut current = square;
                while let Some(sq) = offset(current, dr, df) {
                    if holds(sliders, sq) {
                        return true;
                    }
                    // Any other piece blocks the ray
                    if holds(occupied, sq) {
                        break;
                    }
                    current = sq;
                }
            }
        }

        false
    }

    pub fn is_king_in_check(&self, board: &Board, color: Color) -> bool {
        match board.king_square(color) {
            Some(king_square) => self.is_square_under_attack(board, king_square, color.opposite()),
            None => false,  // No king found (shouldn't happen in a valid position)
        }
    }

    /// Moves that follow each piece's movement pattern, ignoring self-check.
    pub fn pseudo_legal_moves(&self, board: &Board) -> Vec<Move> {
        let us = board.side_to_move;
        let own = board.occupancy(us);
        let mut moves = Vec::with_capacity(64);

        for from in 0..64u8 {
            if own & square_mask(from) == 0 {
                continue;
            }
            let piece = match board.get_piece_at(from) {
                Some((piece, _)) => piece,
                None => continue,
            };
            match piece {
                Piece::Pawn => self.add_pawn_moves(board, from, &mut moves),
                Piece::Knight => {
                    self.add_step_moves(board, from, piece, &KNIGHT_OFFSETS, &mut moves)
                }
                Piece::Bishop => self.add_slider_moves(board, from, piece, &DIAGONALS, &mut moves),
                Piece::Rook => self.add_slider_moves(board, from, piece, &ORTHOGONALS, &mut moves),
                Piece::Queen => {
                    self.add_slider_moves(board, from, piece, &KING_OFFSETS, &mut moves)
                }
                Piece::King => {
                    self.add_step_moves(board, from, piece, &KING_OFFSETS, &mut moves);
                    self.add_castling_moves(board, from, &mut moves);
                }
            }
        }

        moves
    }

    /// Pseudo-legal moves that do not leave the mover's king attacked.
    pub fn legal_moves(&self, board: &mut Board) -> Vec<Move> {
        let us = board.side_to_move;
        let in_check = self.is_king_in_check(board, us);

        self.pseudo_legal_moves(board)
            .into_iter()
            .filter(|mv| {
                if mv.is_castling {
                    if in_check {
                        return false;
                    }
                    let transit_attacked = match castle_for(mv.to) {
                        Some(castle) => {
                            self.is_square_under_attack(board, castle.transit, us.opposite())
                        }
                        None => true,
                    };
                    if transit_attacked {
                        return false;
                    }
                }
                board.make_move(*mv);
                let safe = !self.is_king_in_check(board, us);
                board.unmake_move();
                safe
            })
            .collect()
    }

    /// What a capture onto `to` would take, or `Err(())` if the square is blocked.
    fn target(&self, board: &Board, to: Square) -> Result<Option<Piece>, ()> {
        match board.get_piece_at(to) {
            None => Ok(None),
            Some((_, color)) if color == board.side_to_move => Err(()),
            Some((Piece::King, _)) => Err(()),
            Some((piece, _)) => Ok(Some(piece)),
        }
    }

    fn add_step_moves(
        &self,
        board: &Board,
        from: Square,
        piece: Piece,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(dr, df) in offsets {
            if let Some(to) = offset(from, dr, df) {
                if let Ok(captured) = self.target(board, to) {
                    moves.push(Move {
                        captured_piece: captured,
                        ..Move::new(from, to, piece)
                    });
                }
            }
        }
    }

    fn add_slider_moves(
        &self,
        board: &Board,
        from: Square,
        piece: Piece,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(dr, df) in directions {
            let mut current = from;
            while let Some(to) = offset(current, dr, df) {
                match self.target(board, to) {
                    Ok(None) => moves.push(Move::new(from, to, piece)),
                    Ok(Some(captured)) => {
                        moves.push(Move::new_capture(from, to, piece, captured));
                        break;
                    }
                    Err(()) => break,
                }
                current = to;
            }
        }
    }

    fn add_pawn_moves(&self, board: &Board, from: Square, moves: &mut Vec<Move>) {
        let us = board.side_to_move;
        let occupied = board.occupied();
        let (forward, start_rank) = match us {
            Color::White => (1, 1),
            Color::Black => (-1, 6),
        };

        if let Some(one) = offset(from, forward, 0) {
            if occupied & square_mask(one) == 0 {
                self.add_pawn_move(from, one, None, moves);
                if rank_of(from) == start_rank {
                    if let Some(two) = offset(one, forward, 0) {
                        if occupied & square_mask(two) == 0 {
                            moves.push(Move::new_double_push(from, two));
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            let to = match offset(from, forward, df) {
                Some(to) => to,
                None => continue,
            };
            match self.target(board, to) {
                Ok(Some(captured)) => self.add_pawn_move(from, to, Some(captured), moves),
                Ok(None) if board.en_passant_square == Some(to) => {
                    let victim = board.get_piece_at(en_passant_victim(to, us));
                    if victim == Some((Piece::Pawn, us.opposite())) {
                        moves.push(Move::new_en_passant(from, to));
                    }
                }
                _ => {}
            }
        }
    }

    fn add_pawn_move(
        &self,
        from: Square,
        to: Square,
        captured: Option<Piece>,
        moves: &mut Vec<Move>,
    ) {
        let rank = rank_of(to);
        if rank == 0 || rank == 7 {
            for promotion in Piece::PROMOTIONS {
                moves.push(Move::new_promotion(from, to, captured, promotion));
            }
        } else {
            moves.push(Move {
                captured_piece: captured,
                ..Move::new(from, to, Piece::Pawn)
            });
        }
    }

    fn add_castling_moves(&self, board: &Board, from: Square, moves: &mut Vec<Move>) {
        let us = board.side_to_move;
        let occupied = board.occupied();
        let rooks = board.pieces(us)[Piece::Rook.index()];

        for castle in CASTLES.iter().filter(|castle| castle.color == us) {
            if castle.king_from == from
                && board.castling_rights & castle.right != 0
                && rooks & square_mask(castle.rook_from) != 0
                && occupied & castle.between == 0
            {
                moves.push(Move::new_castling(from, castle.king_to));
            }
        }
    }

    pub fn is_checkmate(&self, board: &mut Board) -> bool {
        self.is_king_in_check(board, board.side_to_move) && self.legal_moves(board).is_empty()
    }

    pub fn is_stalemate(&self, board: &mut Board) -> bool {
        !self.is_king_in_check(board, board.side_to_move) && self.legal_moves(board).is_empty()
    }

    /// Neither side can possibly deliver mate with what is left.
    pub fn is_insufficient_material(&self, board: &Board) -> bool {
        let white = board.pieces(Color::White);
        let black = board.pieces(Color::Black);
        let heavy = |pieces: &[u64; 6]| {
            pieces[Piece::Pawn.index()] | pieces[Piece::Rook.index()] | pieces[Piece::Queen.index()]
        };
        if heavy(white) | heavy(black) != 0 {
            return false;
        }

        let minors = |pieces: &[u64; 6]| {
            (pieces[Piece::Knight.index()] | pieces[Piece::Bishop.index()]).count_ones()
        };
        if minors(white) <= 1 && minors(black) <= 1 {
            return true;
        }

        // Only bishops, all on one square colour
        let knights = white[Piece::Knight.index()] | black[Piece::Knight.index()];
        let bishops = white[Piece::Bishop.index()] | black[Piece::Bishop.index()];
        knights == 0 && (bishops & LIGHT_SQUARES == 0 || bishops & DARK_SQUARES == 0)
    }

    /// Classifies a position whose legal moves are already known.
    pub fn classify(&self, board: &Board, legal_moves: &[Move]) -> GameState {
        if legal_moves.is_empty() {
            return if self.is_king_in_check(board, board.side_to_move) {
                GameState::Checkmate(board.side_to_move.opposite())
            } else {
                GameState::Stalemate
            };
        }

        if self.is_insufficient_material(board) {
            return GameState::InsufficientMaterial;
        }

        if board.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES {
            return GameState::SeventyFiveMoveRule;
        }

        if board.repetition_count() >= FIVEFOLD_REPETITION {
            return GameState::FivefoldRepetition;
        }

        GameState::Ongoing
    }

    pub fn get_game_state(&self, board: &mut Board) -> GameState {
        let moves = self.legal_moves(board);
        self.classify(board, &moves)
    }

    /// Counts leaf nodes of the legal move tree `depth` plies deep.
    pub fn perft(&self, board: &mut Board, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = self.legal_moves(board);
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for mv in moves {
            board.make_move(mv);
            nodes += self.perft(board, depth - 1);
            board.unmake_move();
        }

        nodes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Ongoing,
    /// Holds the winning color
    Checkmate(Color),
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoveRule,
    /// Same position for the fifth time since the last irreversible move
    FivefoldRepetition,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        *self != GameState::Ongoing
    }
}
