use itertools::iproduct;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::Board;
use crate::rules::castle_side;
use crate::types::*;

impl Board {
    /// Every fully legal move of the side to move.
    ///
    /// Each (own piece, destination) pair goes through `is_legal_move`. Castling moves
    /// carry their castle side so they render as `O-O` / `O-O-O`. Promotions are
    /// listed once, without a piece; the caller picks it.
    pub fn legal_moves(&mut self) -> Vec<MoveDescriptor> {
        self.candidate_moves()
            .into_iter()
            .filter(|mv| self.is_legal_move(mv))
            .collect()
    }

    /// Stops at the first legal move found
    pub fn has_legal_move(&mut self) -> bool {
        self.candidate_moves()
            .into_iter()
            .any(|mv| self.is_legal_move(&mv))
    }

    /// Every (own piece, destination) pair, castling king moves tagged with their side
    fn candidate_moves(&self) -> Vec<MoveDescriptor> {
        let color = self.get_active_color();
        let sources: Vec<(Square, Piece)> = self.pieces(color).collect();

        iproduct!(sources, Square::all())
            .map(|((from, piece), to)| MoveDescriptor {
                castle: castle_side(piece, from, to),
                ..MoveDescriptor::new(from, to)
            })
            .collect()
    }

    /// One legal move of the side to move, picked with the caller's generator, in
    /// notation `attempt_move` accepts. `None` means checkmate or stalemate.
    pub fn legal_move_sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        self.legal_moves()
            .choose(rng)
            .map(MoveDescriptor::to_notation)
    }

    /// Checkmate or stalemate once the side to move has nothing left.
    /// A pending promotion is still part of the current move, so the game goes on.
    pub fn status(&mut self) -> Status {
        if self.pending_promotion.is_some() || self.has_legal_move() {
            return Status::Ongoing;
        }
        let color = self.get_active_color();
        if self.is_in_check(color) {
            Status::Checkmate(color.other_color())
        } else {
            Status::Stalemate
        }
    }
}
