//! Move legality.
//!
//! `Board::is_legal_move` runs the checks in a fixed order and stops at the first
//! failure: a piece of the side to move on the source, no own piece on the
//! destination, piece geometry (with castling and sliding obstruction), pawn
//! occupation rules (including en passant), and finally the self-check exclusion.

use tracing::debug;

use crate::board::Board;
use crate::patch::BoardPatch;
use crate::types::*;

/// Every square strictly between `from` and `to` is empty. Only meaningful for
/// squares on a shared row, column or diagonal.
pub fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let d_row = (to.row() as i8 - from.row() as i8).signum();
    let d_col = (to.col() as i8 - from.col() as i8).signum();
    let mut current = from.offset(d_row, d_col);
    while let Some(sq) = current {
        if sq == to {
            return true;
        }
        if board.piece_at(sq).is_some() {
            return false;
        }
        current = sq.offset(d_row, d_col);
    }
    false
}

/// Does `piece` standing on `from` attack `to`?
///
/// Pure geometry plus sliding obstruction. Whatever stands on `to` is never
/// looked at, so a king on `to` does not block the line that attacks it. Pawns
/// attack their two forward diagonals only, and castling is never an attack.
pub fn attacks_square(board: &Board, piece: Piece, from: Square, to: Square) -> bool {
    let d_row = to.row() as i8 - from.row() as i8;
    let d_col = to.col() as i8 - from.col() as i8;
    let (abs_row, abs_col) = (d_row.abs(), d_col.abs());

    match piece.piece_type {
        PieceType::Pawn => d_row == piece.color.pawn_direction() && abs_col == 1,
        PieceType::Knight => (abs_row, abs_col) == (2, 1) || (abs_row, abs_col) == (1, 2),
        PieceType::Bishop => abs_row == abs_col && abs_row > 0 && path_clear(board, from, to),
        PieceType::Rook => (abs_row == 0) != (abs_col == 0) && path_clear(board, from, to),
        PieceType::Queen => {
            let straight = (abs_row == 0) != (abs_col == 0);
            let diagonal = abs_row == abs_col && abs_row > 0;
            (straight || diagonal) && path_clear(board, from, to)
        }
        PieceType::King => abs_row.max(abs_col) == 1,
    }
}

/// The castling a king move stands for, judged by shape alone: two files along its own row
pub fn castle_side(piece: Piece, from: Square, to: Square) -> Option<CastleSide> {
    if piece.piece_type != PieceType::King || from.row() != to.row() {
        return None;
    }
    match to.col() as i8 - from.col() as i8 {
        2 => Some(CastleSide::Kingside),
        -2 => Some(CastleSide::Queenside),
        _ => None,
    }
}

impl Board {
    /// Is `mv` fully legal for the side to move?
    ///
    /// The board is edited provisionally while answering and is always left
    /// exactly as it was found. Nothing is legal while a promotion is pending.
    pub fn is_legal_move(&mut self, mv: &MoveDescriptor) -> bool {
        let (from, to) = (mv.from, mv.to);
        if from == to || self.pending_promotion.is_some() {
            return false;
        }

        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        if piece.color != self.get_active_color() {
            return false;
        }

        let target = self.piece_at(to);
        if target.is_some_and(|t| t.color == piece.color) {
            return false;
        }

        if mv.castle.is_some() && castle_side(piece, from, to) != mv.castle {
            debug!(%from, %to, "castling token does not match a castling king move");
            return false;
        }

        if let Some(promotion) = mv.promotion {
            let reaches_far_rank =
                piece.piece_type == PieceType::Pawn && to.row() == piece.color.promotion_row();
            if !reaches_far_rank || !PIECES_CAN_PROMOTE_TO.contains(&promotion) {
                debug!(%from, %to, "promotion to {} is not possible here", promotion);
                return false;
            }
        }

        if !self.follows_piece_geometry(piece, from, to) {
            return false;
        }

        if piece.piece_type == PieceType::Pawn && !self.pawn_occupation_allowed(piece, from, to) {
            return false;
        }

        if self.leaves_king_in_check(piece, from, to) {
            debug!(%from, %to, "move would leave the {} king in check", piece.color);
            return false;
        }

        true
    }

    fn follows_piece_geometry(&mut self, piece: Piece, from: Square, to: Square) -> bool {
        match piece.piece_type {
            PieceType::Pawn => self.follows_pawn_geometry(piece.color, from, to),
            PieceType::King if castle_side(piece, from, to).is_some() => {
                self.can_castle(piece.color, from, to)
            }
            _ => attacks_square(self, piece, from, to),
        }
    }

    fn follows_pawn_geometry(&self, color: Color, from: Square, to: Square) -> bool {
        let dir = color.pawn_direction();
        let d_row = to.row() as i8 - from.row() as i8;
        let d_col = to.col() as i8 - from.col() as i8;

        match (d_col.abs(), d_row) {
            (0, d) if d == dir => true,
            (0, d) if d == 2 * dir => {
                from.row() == color.pawn_start_row()
                    && from
                        .offset(dir, 0)
                        .is_some_and(|between| self.piece_at(between).is_none())
                    && self.piece_at(to).is_none()
            }
            (1, d) if d == dir => true,
            _ => false,
        }
    }

    /// Straight pawn moves need an empty destination, diagonal ones a capture
    fn pawn_occupation_allowed(&self, piece: Piece, from: Square, to: Square) -> bool {
        let target = self.piece_at(to);
        if from.col() == to.col() {
            return target.is_none();
        }
        if target.is_some_and(|t| t.color != piece.color) {
            return true;
        }
        self.en_passant_capture_square(piece, from, to).is_some()
    }

    /// Square of the pawn removed if `piece` moving `from`->`to` is an en passant capture.
    ///
    /// Must be asked before the move is applied: the destination is empty and equals
    /// the current en passant target, the mover stands on the row next to it, and an
    /// opposing pawn sits beside the mover.
    pub(crate) fn en_passant_capture_square(
        &self,
        piece: Piece,
        from: Square,
        to: Square,
    ) -> Option<Square> {
        if piece.piece_type != PieceType::Pawn
            || from.col() == to.col()
            || self.piece_at(to).is_some()
            || self.en_passant_target != Some(to)
            || from.row() != piece.color.en_passant_capture_row()
        {
            return None;
        }
        let captured = Square::new(from.row(), to.col())?;
        let is_enemy_pawn = self
            .piece_at(captured)
            .is_some_and(|p| p.piece_type == PieceType::Pawn && p.color != piece.color);
        is_enemy_pawn.then_some(captured)
    }

    /// Play the move on the live board, ask the check oracle, then undo.
    fn leaves_king_in_check(&mut self, piece: Piece, from: Square, to: Square) -> bool {
        let patch = self.apply_provisionally(piece, from, to);
        let in_check = self.is_in_check(piece.color);
        patch.revert(self);
        in_check
    }

    /// Relocate the piece, remove a normal or en passant capture, and move the
    /// castling rook. Flags and turn are left alone.
    fn apply_provisionally(&mut self, piece: Piece, from: Square, to: Square) -> BoardPatch {
        let mut patch = BoardPatch::new();
        if let Some(captured) = self.en_passant_capture_square(piece, from, to) {
            patch.set(self, captured, None);
        }
        patch.relocate(self, from, to);
        if let Some(side) = castle_side(piece, from, to) {
            if let (Some(rook_from), Some(rook_to)) = (
                Square::new(from.row(), side.rook_from_col()),
                Square::new(from.row(), side.rook_to_col()),
            ) {
                patch.relocate(self, rook_from, rook_to);
            }
        }
        patch
    }

    /// Every castling precondition: king and rook at home and never moved, nothing
    /// between them, and the king neither in check, nor passing through or landing
    /// on an attacked square.
    fn can_castle(&mut self, color: Color, from: Square, to: Square) -> bool {
        let Some(side) = castle_side(Piece::new(PieceType::King, color), from, to) else {
            return false;
        };
        let row = color.home_row();

        if from.row() != row || from.col() != 4 {
            debug!(%from, "invalid castling: king is not on its home square");
            return false;
        }
        if self.castling.king_moved(color) {
            debug!("invalid castling: {} king has moved", color);
            return false;
        }

        let Some(rook_square) = Square::new(row, side.rook_from_col()) else {
            return false;
        };
        let rook = Piece::new(PieceType::Rook, color);
        if self.piece_at(rook_square) != Some(rook) {
            debug!("invalid castling: no {} rook on {}", color, rook_square);
            return false;
        }
        if self.castling.rook_moved(color, side) {
            debug!("invalid castling: {} {:?} rook has moved", color, side);
            return false;
        }

        if !path_clear(self, from, rook_square) {
            debug!("invalid castling: path between king and rook is blocked");
            return false;
        }

        if self.is_in_check(color) {
            debug!("invalid castling: king is currently in check");
            return false;
        }

        let Some(passing) = from.offset(0, (to.col() as i8 - from.col() as i8).signum()) else {
            return false;
        };
        for square in [passing, to] {
            let mut patch = BoardPatch::new();
            patch.relocate(self, from, square);
            let attacked = self.is_in_check(color);
            patch.revert(self);
            if attacked {
                debug!("invalid castling: king passes through or lands on attacked {}", square);
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn mv(from: &str, to: &str) -> MoveDescriptor {
        MoveDescriptor::new(sq(from), sq(to))
    }

    fn assert_legal(board: &mut Board, from: &str, to: &str, expected: bool) {
        let before = board.clone();
        assert_eq!(board.is_legal_move(&mv(from, to)), expected, "{from}{to}");
        assert_eq!(*board, before, "validation changed the board for {from}{to}");
    }

    #[test]
    fn test_path_clear() {
        let b = Board::new();
        assert!(path_clear(&b, sq("a1"), sq("a2")));
        assert!(!path_clear(&b, sq("a1"), sq("a3")));
        assert!(path_clear(&b, sq("a3"), sq("h3")));
        assert!(!path_clear(&b, sq("c1"), sq("e3")));
    }

    #[test]
    fn test_opening_moves() {
        let mut b = Board::new();
        assert_legal(&mut b, "e2", "e4", true);
        assert_legal(&mut b, "e2", "e3", true);
        assert_legal(&mut b, "e2", "e5", false);
        assert_legal(&mut b, "e2", "d3", false);
        assert_legal(&mut b, "g1", "f3", true);
        assert_legal(&mut b, "g1", "e2", false);
        assert_legal(&mut b, "f1", "c4", false);
        assert_legal(&mut b, "a1", "a3", false);
        // black cannot move on white's turn
        assert_legal(&mut b, "e7", "e5", false);
        // no piece
        assert_legal(&mut b, "e4", "e5", false);
        // same square
        assert_legal(&mut b, "e2", "e2", false);
    }

    #[test]
    fn test_piece_geometry() {
        // . . . . k . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . Q . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . B . . K . N R
        let mut b = Board::from_placements(
            &["Ke1", "Qd4", "Bb1", "Ng1", "Rh1", "ke8"],
            Color::White,
        );
        assert_legal(&mut b, "d4", "d8", true);
        assert_legal(&mut b, "d4", "h8", true);
        assert_legal(&mut b, "d4", "a1", true);
        assert_legal(&mut b, "d4", "e6", false);
        assert_legal(&mut b, "b1", "h7", true);
        assert_legal(&mut b, "b1", "b2", false);
        assert_legal(&mut b, "g1", "h3", true);
        assert_legal(&mut b, "g1", "e2", true);
        assert_legal(&mut b, "g1", "g3", false);
        assert_legal(&mut b, "h1", "h8", true);
        // own knight blocks the rook
        assert_legal(&mut b, "h1", "f1", false);
        assert_legal(&mut b, "e1", "f2", true);
        assert_legal(&mut b, "e1", "e3", false);
    }

    #[test]
    fn test_pawn_cannot_capture_forward() {
        // . . . . k . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . p . . .
        // . . . . P . . .
        // . . . . . . . .
        // . . . . K . . .
        let mut b = Board::from_placements(&["Ke1", "Pe3", "pe4", "ke8"], Color::White);
        assert_legal(&mut b, "e3", "e4", false);
        assert_legal(&mut b, "e3", "d4", false);
    }

    #[test]
    fn test_pawn_double_push_blocked() {
        let mut b = Board::from_placements(
            &["Kh1", "Pd2", "nd3", "Pf2", "nf4", "ke8"],
            Color::White,
        );
        // piece directly in front
        assert_legal(&mut b, "d2", "d4", false);
        // piece on the landing square
        assert_legal(&mut b, "f2", "f4", false);
        assert_legal(&mut b, "f2", "f3", true);
    }

    #[test]
    fn test_pawn_captures() {
        let mut b = Board::from_placements(&["Ke1", "Pe4", "pd5", "Pf5", "ke8"], Color::White);
        assert_legal(&mut b, "e4", "d5", true);
        // own piece
        assert_legal(&mut b, "e4", "f5", false);
        b.set_side_to_move(Color::Black);
        assert_legal(&mut b, "d5", "e4", true);
        // backwards
        assert_legal(&mut b, "d5", "c6", false);
    }

    #[test]
    fn test_en_passant_requires_target() {
        // black pawn sits next to the white pawn, but it never made a double step
        let mut b = Board::from_placements(&["Ke1", "Pe5", "pd5", "ke8"], Color::White);
        assert_legal(&mut b, "e5", "d6", false);

        b.en_passant_target = Some(sq("d6"));
        assert_legal(&mut b, "e5", "d6", true);
        // wrong column
        assert_legal(&mut b, "e5", "f6", false);
    }

    #[test]
    fn test_en_passant_exposing_king_is_illegal() {
        // both pawns leave the fifth rank, opening the rook's line to the king
        // . . . . k . . .
        // . . . . . . . .
        // . . . . . . . .
        // K . . p P . . r
        let mut b = Board::from_placements(&["Ka5", "Pe5", "pd5", "rh5", "ke8"], Color::White);
        b.en_passant_target = Some(sq("d6"));
        assert_legal(&mut b, "e5", "d6", false);
        assert_legal(&mut b, "e5", "e6", true);
    }

    #[test]
    fn test_pinned_piece() {
        // . . . . r . . k
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . B . . .
        // . . . . K . . .
        let mut b = Board::from_placements(&["Ke1", "Be2", "re8", "kh8"], Color::White);
        assert_legal(&mut b, "e2", "d3", false);
        assert_legal(&mut b, "e2", "f3", false);
        assert_legal(&mut b, "e1", "d1", true);
    }

    #[test]
    fn test_king_cannot_step_into_check() {
        let mut b = Board::from_placements(&["Ke1", "rd8", "kh8"], Color::White);
        assert_legal(&mut b, "e1", "d1", false);
        assert_legal(&mut b, "e1", "d2", false);
        assert_legal(&mut b, "e1", "f1", true);
    }

    #[test]
    fn test_king_cannot_retreat_along_checking_line() {
        // the king stands on the rook's line; stepping away along it is still check
        let mut b = Board::from_placements(&["Ke2", "ra2", "kh8"], Color::White);
        assert_legal(&mut b, "e2", "f2", false);
        assert_legal(&mut b, "e2", "d2", false);
        assert_legal(&mut b, "e2", "e3", true);
    }

    #[test]
    fn test_must_resolve_check() {
        let mut b = Board::from_placements(&["Ke1", "Nb1", "Ra3", "re8", "kh8"], Color::White);
        // unrelated moves are illegal while in check
        assert_legal(&mut b, "b1", "c3", false);
        assert_legal(&mut b, "a3", "e3", true);
        assert_legal(&mut b, "e1", "d2", true);
    }

    fn castling_board() -> Board {
        // . . . . k . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // R . . . K . . R
        Board::from_placements(&["Ke1", "Ra1", "Rh1", "ke8"], Color::White)
    }

    #[test]
    fn test_castling_allowed() {
        let mut b = castling_board();
        assert_legal(&mut b, "e1", "g1", true);
        assert_legal(&mut b, "e1", "c1", true);
        assert!(b.is_legal_move(&MoveDescriptor::castle(Color::White, CastleSide::Kingside)));
    }

    #[test]
    fn test_castling_flags() {
        let mut b = castling_board();
        b.castling.mark_rook_moved(Color::White, CastleSide::Kingside);
        assert_legal(&mut b, "e1", "g1", false);
        assert_legal(&mut b, "e1", "c1", true);

        b.castling.mark_king_moved(Color::White);
        assert_legal(&mut b, "e1", "c1", false);
    }

    #[test]
    fn test_castling_needs_rook() {
        let mut b = Board::from_placements(&["Ke1", "Ra1", "Nh1", "ke8"], Color::White);
        assert_legal(&mut b, "e1", "g1", false);
        let mut b = Board::from_placements(&["Ke1", "Ra1", "rh1", "ke8"], Color::White);
        assert_legal(&mut b, "e1", "g1", false);
    }

    #[test]
    fn test_castling_blocked() {
        let mut b = Board::from_placements(&["Ke1", "Ra1", "Nb1", "Rh1", "ke8"], Color::White);
        // b1 is not crossed by the king but still lies between king and rook
        assert_legal(&mut b, "e1", "c1", false);
        assert_legal(&mut b, "e1", "g1", true);
    }

    #[test]
    fn test_castling_out_of_check() {
        let mut b = Board::from_placements(&["Ke1", "Ra1", "Rh1", "re5", "ke8"], Color::White);
        assert_legal(&mut b, "e1", "g1", false);
        assert_legal(&mut b, "e1", "c1", false);
    }

    #[test]
    fn test_castling_through_check() {
        // f1 attacked by the rook on f8
        let mut b = Board::from_placements(&["Ke1", "Ra1", "Rh1", "rf8", "kb8"], Color::White);
        assert_legal(&mut b, "e1", "g1", false);
        assert_legal(&mut b, "e1", "c1", true);
    }

    #[test]
    fn test_castling_into_check() {
        // g1 attacked by the bishop on c5
        let mut b = Board::from_placements(&["Ke1", "Ra1", "Rh1", "bc5", "ke8"], Color::White);
        assert_legal(&mut b, "e1", "g1", false);
        assert_legal(&mut b, "e1", "c1", true);
    }

    #[test]
    fn test_queenside_castling_b_file_attacked() {
        // only the rook crosses b1, so an attack on it does not matter
        let mut b = Board::from_placements(&["Ke1", "Ra1", "rb8", "ke8"], Color::White);
        assert_legal(&mut b, "e1", "c1", true);
    }

    #[test]
    fn test_black_castling() {
        let mut b = Board::from_placements(&["Ke1", "ke8", "ra8", "rh8"], Color::Black);
        assert_legal(&mut b, "e8", "g8", true);
        assert_legal(&mut b, "e8", "c8", true);
    }

    #[test]
    fn test_castling_token_must_match() {
        let mut b = castling_board();
        let mut m = mv("e1", "f1");
        m.castle = Some(CastleSide::Kingside);
        assert!(!b.is_legal_move(&m));
    }

    #[test]
    fn test_promotion_descriptor() {
        let mut b = Board::from_placements(&["Ke1", "Pb7", "ke8"], Color::White);
        assert!(b.is_legal_move(&mv("b7", "b8").with_promotion(PieceType::Queen)));
        assert!(b.is_legal_move(&mv("b7", "b8")));
        assert!(!b.is_legal_move(&mv("b7", "b8").with_promotion(PieceType::King)));
        assert!(!b.is_legal_move(&mv("e1", "e2").with_promotion(PieceType::Queen)));
    }
}
