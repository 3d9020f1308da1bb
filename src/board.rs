use tracing::{debug, info};

use crate::error::SetupError;
use crate::types::*;

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Whether each king and each castling rook has ever left its home square.
/// Rooks are tracked one by one, so losing one side keeps the other.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CastlingFlags {
    pub white_king_moved: bool,
    pub black_king_moved: bool,
    pub white_queenside_rook_moved: bool,
    pub white_kingside_rook_moved: bool,
    pub black_queenside_rook_moved: bool,
    pub black_kingside_rook_moved: bool,
}

impl CastlingFlags {
    pub fn king_moved(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_king_moved,
            Color::Black => self.black_king_moved,
        }
    }

    pub fn rook_moved(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::Queenside) => self.white_queenside_rook_moved,
            (Color::White, CastleSide::Kingside) => self.white_kingside_rook_moved,
            (Color::Black, CastleSide::Queenside) => self.black_queenside_rook_moved,
            (Color::Black, CastleSide::Kingside) => self.black_kingside_rook_moved,
        }
    }

    pub(crate) fn mark_king_moved(&mut self, color: Color) {
        match color {
            Color::White => self.white_king_moved = true,
            Color::Black => self.black_king_moved = true,
        }
    }

    pub(crate) fn mark_rook_moved(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::White, CastleSide::Queenside) => self.white_queenside_rook_moved = true,
            (Color::White, CastleSide::Kingside) => self.white_kingside_rook_moved = true,
            (Color::Black, CastleSide::Queenside) => self.black_queenside_rook_moved = true,
            (Color::Black, CastleSide::Kingside) => self.black_kingside_rook_moved = true,
        }
    }
}

/// The single mutable source of truth of a game.
///
/// Validation edits the grid provisionally (see `patch`), so a `Board` must not be
/// shared between threads while a validation runs; clone it instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    // who's move it is
    active_color: Color,
    pub(crate) castling: CastlingFlags,
    // valid for exactly one ply after a double pawn push
    pub(crate) en_passant_target: Option<Square>,
    // square of a pawn waiting for its promotion piece
    pub(crate) pending_promotion: Option<Square>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting position, white to move
    pub fn new() -> Board {
        let mut board = Board::empty();
        for (col, piece_type) in BACK_RANK.iter().enumerate() {
            for color in [Color::White, Color::Black] {
                board.squares[color.home_row() as usize][col] =
                    Some(Piece::new(*piece_type, color));
                board.squares[color.pawn_start_row() as usize][col] =
                    Some(Piece::new(PieceType::Pawn, color));
            }
        }
        board
    }

    /// No pieces, white to move, all castling flags cleared
    pub fn empty() -> Board {
        Board {
            squares: [[None; 8]; 8],
            active_color: Color::White,
            castling: CastlingFlags::default(),
            en_passant_target: None,
            pending_promotion: None,
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row() as usize][square.col() as usize]
    }

    pub fn piece_at_algebraic(&self, pos: &str) -> Option<Piece> {
        Square::from_algebraic(pos).and_then(|sq| self.piece_at(sq))
    }

    pub(crate) fn put(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.row() as usize][square.col() as usize] = piece;
    }

    /// Get the color of the side to move
    pub fn get_active_color(&self) -> Color {
        self.active_color
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.active_color = color;
    }

    pub(crate) fn switch_turn(&mut self) {
        self.active_color = self.active_color.other_color();
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    pub fn castling_flags(&self) -> &CastlingFlags {
        &self.castling
    }

    /// Square of a pawn that reached the far rank and still waits for its piece
    pub fn pending_promotion(&self) -> Option<Square> {
        self.pending_promotion
    }

    /// All pieces of `color` with their squares, in a8..h1 order
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| {
            self.piece_at(sq)
                .filter(|p| p.color == color)
                .map(|p| (sq, p))
        })
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, p)| p.piece_type == PieceType::King)
            .map(|(sq, _)| sq)
    }

    pub fn count_pieces(&self, color: Color, piece_type: PieceType) -> usize {
        self.pieces(color)
            .filter(|(_, p)| p.piece_type == piece_type)
            .count()
    }

    /// Clear the grid for manual setup. Castling flags and en passant are reset too.
    pub fn reset_to_empty(&mut self) {
        *self = Board {
            active_color: self.active_color,
            ..Board::empty()
        };
        info!("board cleared to a blank state");
    }

    /// Place a piece from notation like `Nf3` (white knight on f3) or `ka1`
    /// (black king on a1), respecting the per-side piece limits.
    pub fn place_piece(&mut self, placement: &str) -> Result<(), SetupError> {
        let invalid = || SetupError::InvalidPlacement(placement.to_string());
        let chars: Vec<char> = placement.trim().chars().collect();
        let [piece_char, file, rank] = chars.as_slice() else {
            return Err(invalid());
        };
        let piece_type = PieceType::from_char(*piece_char).ok_or_else(invalid)?;
        let square = Square::from_file_rank(*file, *rank).ok_or_else(invalid)?;
        let piece = Piece::new(piece_type, Color::from_case(*piece_char));

        if self.piece_at(square) != Some(piece) {
            let max = piece_type.max_per_side();
            if self.count_pieces(piece.color, piece_type) >= max {
                debug!(%square, "placement rejected, limit reached");
                return Err(SetupError::LimitReached {
                    piece: piece_type,
                    color: piece.color,
                    max,
                });
            }
        }

        self.put(square, Some(piece));
        info!("placed {} {} at {}", piece.color, piece_type, square);
        Ok(())
    }

    /// Both kings must be on the board before play starts
    pub fn validate_kings(&self) -> Result<(), SetupError> {
        for color in [Color::White, Color::Black] {
            if self.king_square(color).is_none() {
                return Err(SetupError::MissingKing(color));
            }
        }
        Ok(())
    }

    pub fn draw_board(&self) -> String {
        let mut string = String::from("  a b c d e f g h\n");
        for row in 0..8u8 {
            let rank = (b'8' - row) as char;
            string.push(rank);
            for col in 0..8u8 {
                string.push(' ');
                string.push(
                    Square::new(row, col)
                        .and_then(|sq| self.piece_at(sq))
                        .map_or('.', |p| p.to_char()),
                );
            }
            string.push(' ');
            string.push(rank);
            string.push('\n');
        }
        string.push_str("  a b c d e f g h\n");
        string.push_str(&format!("{} to move", self.active_color));
        string
    }

    pub fn draw_to_terminal(&self) {
        println!("{}", self.draw_board());
    }
}

#[cfg(test)]
impl Board {
    /// Empty board with the given placements, e.g. `["Ke1", "Rh1", "ke8"]`
    pub(crate) fn from_placements(placements: &[&str], active_color: Color) -> Board {
        let mut board = Board::empty();
        for placement in placements {
            board.place_piece(placement).unwrap();
        }
        board.set_side_to_move(active_color);
        board
    }
}
