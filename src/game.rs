use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::board::Board;
use crate::error::PromotionError;
use crate::types::*;

/// A board plus the list of moves played on it
pub struct Game {
    board: Board,
    moves: Vec<String>,
    silent: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Game::from_board(Board::new())
    }

    /// Continue from a position built with the setup interface
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            moves: Vec::new(),
            silent: true,
        }
    }

    /// Print the board after every move of `play_random`
    pub fn verbose(mut self) -> Self {
        self.silent = false;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Notation of every accepted move, in order. A promotion finalized later is
    /// appended to the pawn move, e.g. `e7e8` + `Q`.
    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn attempt_move(&mut self, notation: &str) -> MoveResult {
        let result = self.board.attempt_move(notation);
        if result != MoveResult::Invalid {
            self.moves.push(notation.trim().to_string());
        }
        result
    }

    pub fn play_move(&mut self, mv: &MoveDescriptor) -> MoveResult {
        let result = self.board.try_move(mv);
        if result != MoveResult::Invalid {
            self.moves.push(mv.to_notation());
        }
        result
    }

    pub fn finalize_promotion(
        &mut self,
        square: Square,
        piece_type: PieceType,
    ) -> Result<(), PromotionError> {
        self.board.finalize_promotion(square, piece_type)?;
        if let Some(last) = self.moves.last_mut() {
            last.push(piece_type.to_char());
        }
        Ok(())
    }

    pub fn status(&mut self) -> Status {
        self.board.status()
    }

    /// Play uniformly random legal moves until the game ends or `max_plies` moves
    /// have been made. Promotions get a random piece too.
    pub fn play_random<R: Rng + ?Sized>(&mut self, rng: &mut R, max_plies: usize) -> Status {
        for ply in 1..=max_plies {
            let Some(mv) = self.board.legal_moves().choose(rng).copied() else {
                break;
            };
            let color = self.board.get_active_color();
            match self.play_move(&mv) {
                MoveResult::Valid => {}
                MoveResult::PromotionPending => {
                    let piece_type = PIECES_CAN_PROMOTE_TO
                        .choose(rng)
                        .copied()
                        .unwrap_or(PieceType::Queen);
                    if let Err(e) = self.finalize_promotion(mv.to, piece_type) {
                        debug!("random promotion failed: {}", e);
                        break;
                    }
                }
                MoveResult::Invalid => {
                    debug!(%mv, "enumerated move was rejected");
                    break;
                }
            }
            if !self.silent {
                let last = self.moves.last().map_or("", String::as_str);
                println!("ply {}: {} plays {}", ply, color, last);
                self.board.draw_to_terminal();
                println!();
            }
        }
        let status = self.status();
        info!(plies = self.moves.len(), ?status, "random game stopped");
        status
    }

    /// Moves numbered in pairs, `1. e2e4 e7e5 2. ...`
    pub fn to_move_list(&self) -> String {
        self.moves
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| format!("{}. {}", i + 1, pair.join(" ")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
