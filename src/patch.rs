//! Provisional board edits.
//!
//! The validator answers "would this leave my king in check?" by editing the live
//! board, asking the check oracle, and putting every touched cell back. A
//! `BoardPatch` records the prior content of each cell it writes so the revert is
//! total, including nested patches (castling checks run inside the self-check
//! simulation).

use crate::board::Board;
use crate::types::{Piece, Square};

#[must_use = "a patch must be reverted or the board stays modified"]
#[derive(Debug, Default)]
pub struct BoardPatch {
    saved: Vec<(Square, Option<Piece>)>,
}

impl BoardPatch {
    pub fn new() -> Self {
        Self {
            saved: Vec::with_capacity(4),
        }
    }

    /// Overwrite `square`, remembering what was there
    pub fn set(&mut self, board: &mut Board, square: Square, piece: Option<Piece>) {
        self.saved.push((square, board.piece_at(square)));
        board.put(square, piece);
    }

    /// Move whatever stands on `from` to `to`, overwriting `to`
    pub fn relocate(&mut self, board: &mut Board, from: Square, to: Square) {
        let piece = board.piece_at(from);
        self.set(board, to, piece);
        self.set(board, from, None);
    }

    /// Restore the cells in reverse order of writing, so a cell touched twice
    /// ends with its original content.
    pub fn revert(self, board: &mut Board) {
        for (square, prior) in self.saved.into_iter().rev() {
            board.put(square, prior);
        }
    }
}
