use std::fmt;

use itertools::iproduct;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Uppercase letters are white pieces, everything else is black.
    pub fn from_case(c: char) -> Color {
        if c.is_uppercase() {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn other_color(&self) -> Color {
        if *self == Color::White {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Row holding this side's king and rooks at the start of the game
    pub fn home_row(&self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Row pawns of this side start on
    pub fn pawn_start_row(&self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Far row, where pawns of this side promote
    pub fn promotion_row(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Row delta of a single pawn step. Row 0 is rank 8, so white moves "up" with -1.
    pub fn pawn_direction(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row a pawn of this side must stand on to capture en passant
    /// (rank 5 for white, rank 4 for black)
    pub fn en_passant_capture_row(&self) -> u8 {
        match self {
            Color::White => 3,
            Color::Black => 4,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    /// How many pieces of this type one side may own during manual setup
    pub fn max_per_side(&self) -> usize {
        match self {
            PieceType::King | PieceType::Queen => 1,
            PieceType::Rook | PieceType::Knight | PieceType::Bishop => 2,
            PieceType::Pawn => 8,
        }
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::Pawn => "pawn",
            Self::Rook => "rook",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human())
    }
}

pub const PIECES_CAN_PROMOTE_TO: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

/// A piece never changes once created; promotion replaces it wholesale.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Piece {
        Piece { color, piece_type }
    }

    /// Display glyph: uppercase for white, lowercase for black
    pub fn to_char(&self) -> char {
        let c = self.piece_type.to_char();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }
}

/// A cell of the 8x8 grid. Row 0 is rank 8 (the far rank seen from white), column 0 is the a-file.
///
/// The fields are private so a `Square` is always on the board.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    pub fn new(row: u8, col: u8) -> Option<Square> {
        if row < 8 && col < 8 {
            Some(Square { row, col })
        } else {
            None
        }
    }

    /// Square from a file letter (`a`..`h`) and a rank digit (`1`..`8`)
    pub fn from_file_rank(file: char, rank: char) -> Option<Square> {
        let col = file_to_col(file)?;
        let row = rank_to_row(rank)?;
        Some(Square { row, col })
    }

    pub fn from_algebraic(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => Square::from_file_rank(file, rank),
            _ => None,
        }
    }

    pub fn to_algebraic(&self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.col) as char
    }

    pub fn rank_char(&self) -> char {
        (b'8' - self.row) as char
    }

    /// The square `d_row` rows and `d_col` columns away, if it is still on the board
    pub fn offset(&self, d_row: i8, d_col: i8) -> Option<Square> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// All 64 squares, row by row starting from a8
    pub fn all() -> impl Iterator<Item = Square> + Clone {
        iproduct!(0..8u8, 0..8u8).map(|(row, col)| Square { row, col })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

pub fn file_to_col(file: char) -> Option<u8> {
    match file {
        'a'..='h' => Some(file as u8 - b'a'),
        _ => None,
    }
}

pub fn rank_to_row(rank: char) -> Option<u8> {
    match rank {
        '1'..='8' => Some(b'8' - rank as u8),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub fn king_to_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }

    pub fn rook_from_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    /// The file next to the king's landing file, on the side the king came from
    pub fn rook_to_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    /// Which rook, if any, starts the game on `square` for `color`
    pub fn from_rook_home(color: Color, square: Square) -> Option<CastleSide> {
        if square.row() != color.home_row() {
            return None;
        }
        match square.col() {
            0 => Some(CastleSide::Queenside),
            7 => Some(CastleSide::Kingside),
            _ => None,
        }
    }

    pub fn to_notation(&self) -> &'static str {
        match self {
            CastleSide::Kingside => "O-O",
            CastleSide::Queenside => "O-O-O",
        }
    }
}

/// What the notation parser hands to the validator and the executor.
/// Created for one move attempt and dropped afterwards.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MoveDescriptor {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
    pub castle: Option<CastleSide>,
}

impl MoveDescriptor {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            castle: None,
        }
    }

    /// King move of a castling token, resolved on `color`'s home row
    pub fn castle(color: Color, side: CastleSide) -> Self {
        let row = color.home_row();
        Self {
            from: Square { row, col: 4 },
            to: Square {
                row,
                col: side.king_to_col(),
            },
            promotion: None,
            castle: Some(side),
        }
    }

    pub fn with_promotion(self, piece_type: PieceType) -> Self {
        Self {
            promotion: Some(piece_type),
            ..self
        }
    }

    pub fn is_kingside_castle(&self) -> bool {
        self.castle == Some(CastleSide::Kingside)
    }

    pub fn is_queenside_castle(&self) -> bool {
        self.castle == Some(CastleSide::Queenside)
    }

    /// Castling token, or source + destination (+ promotion letter)
    pub fn to_notation(&self) -> String {
        if let Some(side) = self.castle {
            return side.to_notation().to_string();
        }
        let mut s = format!("{}{}", self.from, self.to);
        if let Some(piece_type) = self.promotion {
            s.push(piece_type.to_char());
        }
        s
    }
}

impl fmt::Display for MoveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MoveResult {
    Valid,
    Invalid,
    /// The pawn reached the far rank; the turn passes once a piece is chosen.
    PromotionPending,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    Ongoing,
    /// Contains the winner
    Checkmate(Color),
    Stalemate,
}
