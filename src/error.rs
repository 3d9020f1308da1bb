use thiserror::Error;

use crate::types::{Color, PieceType, Square};

/// Why a move string could not be turned into a `MoveDescriptor`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty move")]
    Empty,
    #[error("unrecognized move format '{0}'; use e.g. 'e2e4', 'e4', 'exd5', 'e7e8Q', 'Nf3', 'Nbd7', 'N1d7' or 'O-O'")]
    UnrecognizedFormat(String),
    #[error("no {color} pawn on {square}")]
    NoPawnAt { color: Color, square: Square },
    #[error("{square} is not a promotion square for {color}")]
    NotPromotionRank { color: Color, square: Square },
    #[error("no pawn can reach {0}")]
    NoPawnCanReach(Square),
    #[error("more than one pawn can reach {0}")]
    AmbiguousPawnPush(Square),
    #[error("no {piece} can legally move to {to}")]
    NoLegalSource { piece: PieceType, to: Square },
    #[error("no {piece} from {disambiguator} can legally move to {to}")]
    NoLegalSourceWithDisambiguator {
        piece: PieceType,
        disambiguator: char,
        to: Square,
    },
    #[error("ambiguous {piece} move to {to}; specify the starting file or rank (e.g. 'Nbd7' or 'N1d7')")]
    Ambiguous { piece: PieceType, to: Square },
    #[error("still ambiguous {piece} move to {to} even with disambiguator {disambiguator}")]
    StillAmbiguous {
        piece: PieceType,
        disambiguator: char,
        to: Square,
    },
}

/// Rejections from the manual board setup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("invalid placement '{0}'; expected e.g. 'Nf3' (white knight on f3) or 'ka1' (black king on a1)")]
    InvalidPlacement(String),
    #[error("cannot place more than {max} {color} {piece}s")]
    LimitReached {
        piece: PieceType,
        color: Color,
        max: usize,
    },
    #[error("the {0} king is missing")]
    MissingKing(Color),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionError {
    #[error("no promotion is pending")]
    NotPending,
    #[error("the pending promotion is on {expected}, not {got}")]
    WrongSquare { expected: Square, got: Square },
    #[error("a pawn cannot promote to a {0}")]
    InvalidPiece(PieceType),
    #[error("no pawn on {0} to promote")]
    NoPawn(Square),
}
