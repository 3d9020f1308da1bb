//! Applying moves to the board once they are known to be legal.

use tracing::{debug, info};

use crate::board::Board;
use crate::error::PromotionError;
use crate::rules::castle_side;
use crate::types::*;

impl Board {
    /// Parse, validate and play a move for the side to move.
    ///
    /// Any rejection, from a malformed string to a move that would leave the king in
    /// check, is `Invalid` and leaves the board untouched.
    pub fn attempt_move(&mut self, notation: &str) -> MoveResult {
        if let Some(square) = self.pending_promotion {
            debug!(notation, "rejected: promotion on {} must be finalized first", square);
            return MoveResult::Invalid;
        }
        match self.parse_move(notation) {
            Ok(mv) => self.try_move(&mv),
            Err(e) => {
                debug!(notation, "rejected: {}", e);
                MoveResult::Invalid
            }
        }
    }

    /// Validate and play an already parsed move
    pub fn try_move(&mut self, mv: &MoveDescriptor) -> MoveResult {
        if self.pending_promotion.is_some() || !self.is_legal_move(mv) {
            debug!(%mv, "rejected: illegal move");
            return MoveResult::Invalid;
        }
        self.execute_move(mv)
    }

    /// Play a validated move. Everything the validator simulated happens here for
    /// real, plus the flag and en passant bookkeeping.
    fn execute_move(&mut self, mv: &MoveDescriptor) -> MoveResult {
        let (from, to) = (mv.from, mv.to);
        let Some(piece) = self.piece_at(from) else {
            return MoveResult::Invalid;
        };
        let color = piece.color;

        // must be known before the board changes
        let en_passant_capture = self.en_passant_capture_square(piece, from, to);

        if let Some(captured) = self.piece_at(to) {
            if captured.piece_type == PieceType::Rook {
                if let Some(side) = CastleSide::from_rook_home(captured.color, to) {
                    self.castling.mark_rook_moved(captured.color, side);
                }
            }
        }

        self.put(to, Some(piece));
        self.put(from, None);

        if let Some(captured) = en_passant_capture {
            self.put(captured, None);
            info!("{} pawn {}{} captures en passant on {}", color, from, to, captured);
        }

        match piece.piece_type {
            PieceType::King => {
                self.castling.mark_king_moved(color);
                if let Some(side) = castle_side(piece, from, to) {
                    self.move_castling_rook(color, side);
                    info!("{} castles {}", color, side.to_notation());
                }
            }
            PieceType::Rook => {
                if let Some(side) = CastleSide::from_rook_home(color, from) {
                    self.castling.mark_rook_moved(color, side);
                }
            }
            _ => {}
        }

        let is_double_push = piece.piece_type == PieceType::Pawn
            && (to.row() as i8 - from.row() as i8).abs() == 2;
        self.en_passant_target = if is_double_push {
            from.offset(color.pawn_direction(), 0)
        } else {
            None
        };

        if piece.piece_type == PieceType::Pawn && to.row() == color.promotion_row() {
            if let Some(piece_type) = mv.promotion {
                self.put(to, Some(Piece::new(piece_type, color)));
                self.switch_turn();
                info!("{} pawn {}{} promotes to {}", color, from, to, piece_type);
                return MoveResult::Valid;
            }
            self.pending_promotion = Some(to);
            info!("{} pawn {}{} waits for a promotion piece", color, from, to);
            return MoveResult::PromotionPending;
        }

        self.switch_turn();
        info!("{} plays {}", color, mv);
        MoveResult::Valid
    }

    fn move_castling_rook(&mut self, color: Color, side: CastleSide) {
        let row = color.home_row();
        if let (Some(rook_from), Some(rook_to)) = (
            Square::new(row, side.rook_from_col()),
            Square::new(row, side.rook_to_col()),
        ) {
            let rook = self.piece_at(rook_from);
            self.put(rook_to, rook);
            self.put(rook_from, None);
            self.castling.mark_rook_moved(color, side);
        }
    }

    /// Replace the pawn waiting on `square` and pass the turn.
    pub fn finalize_promotion(
        &mut self,
        square: Square,
        piece_type: PieceType,
    ) -> Result<(), PromotionError> {
        let Some(expected) = self.pending_promotion else {
            return Err(PromotionError::NotPending);
        };
        if expected != square {
            return Err(PromotionError::WrongSquare {
                expected,
                got: square,
            });
        }
        if !PIECES_CAN_PROMOTE_TO.contains(&piece_type) {
            return Err(PromotionError::InvalidPiece(piece_type));
        }
        let Some(pawn) = self
            .piece_at(square)
            .filter(|p| p.piece_type == PieceType::Pawn)
        else {
            return Err(PromotionError::NoPawn(square));
        };

        self.put(square, Some(Piece::new(piece_type, pawn.color)));
        self.pending_promotion = None;
        self.switch_turn();
        info!("{} pawn on {} promoted to {}", pawn.color, square, piece_type);
        Ok(())
    }
}
