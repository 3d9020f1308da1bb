//! Move notation parsing.
//!
//! Recognized forms, tried in this order:
//!
//! | Form                        | Example         |
//! | --------------------------- | --------------- |
//! | castling token              | `O-O`, `0-0-0`  |
//! | coordinates + promotion     | `e7e8Q`         |
//! | pawn capture shorthand      | `exd5`          |
//! | pawn push                   | `e4`            |
//! | full coordinates            | `e2e4`          |
//! | piece + file/rank + target  | `Nbd7`, `R1a3`  |
//! | piece + target              | `Nf3`           |
//!
//! Forms that name a piece rather than its square are resolved against the
//! current position through the legality check.

use tracing::trace;

use crate::board::Board;
use crate::error::ParseError;
use crate::types::*;

fn parse_castling_token(notation: &str) -> Option<CastleSide> {
    match notation {
        "O-O" | "0-0" => Some(CastleSide::Kingside),
        "O-O-O" | "0-0-0" => Some(CastleSide::Queenside),
        _ => None,
    }
}

/// Piece letters allowed in piece moves. Pawns are moved by square only.
fn named_piece(c: char) -> Option<PieceType> {
    match c {
        'N' => Some(PieceType::Knight),
        'B' => Some(PieceType::Bishop),
        'R' => Some(PieceType::Rook),
        'Q' => Some(PieceType::Queen),
        'K' => Some(PieceType::King),
        _ => None,
    }
}

fn promotion_piece(c: char) -> Option<PieceType> {
    PieceType::from_char(c).filter(|t| PIECES_CAN_PROMOTE_TO.contains(t))
}

fn is_file(c: char) -> bool {
    file_to_col(c).is_some()
}

fn is_rank(c: char) -> bool {
    rank_to_row(c).is_some()
}

/// A pawn captures onto a neighbouring file only
fn adjacent_files(a: char, b: char) -> bool {
    match (file_to_col(a), file_to_col(b)) {
        (Some(a), Some(b)) => a.abs_diff(b) == 1,
        _ => false,
    }
}

/// Narrows the candidate pieces of a piece move
#[derive(Debug, Clone, Copy)]
enum Disambiguator {
    File(u8),
    Rank(u8),
}

impl Disambiguator {
    fn from_char(c: char) -> Option<Self> {
        file_to_col(c)
            .map(Disambiguator::File)
            .or_else(|| rank_to_row(c).map(Disambiguator::Rank))
    }

    fn matches(&self, square: Square) -> bool {
        match *self {
            Disambiguator::File(col) => square.col() == col,
            Disambiguator::Rank(row) => square.row() == row,
        }
    }
}

impl Board {
    /// Turn a move string into a `MoveDescriptor` for the side to move.
    ///
    /// Only the shape of the move and, for piece and pawn-push forms, the choice of
    /// source square are decided here; full legality is checked when the move is tried.
    /// The board is left unchanged.
    pub fn parse_move(&mut self, notation: &str) -> Result<MoveDescriptor, ParseError> {
        let notation = notation.trim();
        if notation.is_empty() {
            return Err(ParseError::Empty);
        }

        if let Some(side) = parse_castling_token(notation) {
            return Ok(MoveDescriptor::castle(self.get_active_color(), side));
        }

        let chars: Vec<char> = notation.chars().collect();
        let square = |file: char, rank: char| {
            Square::from_file_rank(file, rank)
                .ok_or_else(|| ParseError::UnrecognizedFormat(notation.to_string()))
        };

        let parsed = match chars.as_slice() {
            &[f1, r1, f2, r2, p] if is_file(f1) && is_rank(r1) && is_file(f2) && is_rank(r2) => {
                match promotion_piece(p) {
                    Some(piece_type) => {
                        self.parse_promotion(square(f1, r1)?, square(f2, r2)?, piece_type)
                    }
                    None => Err(ParseError::UnrecognizedFormat(notation.to_string())),
                }
            }
            &[file, 'x', f2, r2] if adjacent_files(file, f2) && is_rank(r2) => {
                self.parse_pawn_capture(file, square(f2, r2)?)
            }
            &[file, rank] if is_file(file) && is_rank(rank) => {
                self.parse_pawn_push(square(file, rank)?)
            }
            &[f1, r1, f2, r2] if is_file(f1) && is_rank(r1) && is_file(f2) && is_rank(r2) => {
                Ok(MoveDescriptor::new(square(f1, r1)?, square(f2, r2)?))
            }
            &[p, d, file, rank] if is_file(file) && is_rank(rank) => {
                match (named_piece(p), Disambiguator::from_char(d)) {
                    (Some(piece_type), Some(disambiguator)) => self.resolve_piece_move(
                        piece_type,
                        Some((d, disambiguator)),
                        square(file, rank)?,
                    ),
                    _ => Err(ParseError::UnrecognizedFormat(notation.to_string())),
                }
            }
            &[p, file, rank] if is_file(file) && is_rank(rank) => match named_piece(p) {
                Some(piece_type) => self.resolve_piece_move(piece_type, None, square(file, rank)?),
                None => Err(ParseError::UnrecognizedFormat(notation.to_string())),
            },
            _ => Err(ParseError::UnrecognizedFormat(notation.to_string())),
        };

        if let Ok(mv) = &parsed {
            trace!(notation, %mv, "parsed move");
        }
        parsed
    }

    fn has_own_pawn(&self, square: Square) -> bool {
        self.piece_at(square) == Some(Piece::new(PieceType::Pawn, self.get_active_color()))
    }

    fn parse_promotion(
        &self,
        from: Square,
        to: Square,
        piece_type: PieceType,
    ) -> Result<MoveDescriptor, ParseError> {
        let color = self.get_active_color();
        if !self.has_own_pawn(from) {
            return Err(ParseError::NoPawnAt { color, square: from });
        }
        if to.row() != color.promotion_row() {
            return Err(ParseError::NotPromotionRank { color, square: to });
        }
        Ok(MoveDescriptor::new(from, to).with_promotion(piece_type))
    }

    /// `exd5`: the source rank is one step behind the destination
    fn parse_pawn_capture(&self, file: char, to: Square) -> Result<MoveDescriptor, ParseError> {
        let color = self.get_active_color();
        let from = to
            .offset(-color.pawn_direction(), 0)
            .and_then(|behind| Square::from_file_rank(file, behind.rank_char()))
            .ok_or(ParseError::NoPawnCanReach(to))?;
        if !self.has_own_pawn(from) {
            return Err(ParseError::NoPawnAt { color, square: from });
        }
        Ok(MoveDescriptor::new(from, to))
    }

    /// `e4`: one of the two squares behind the destination must hold the pawn
    fn parse_pawn_push(&mut self, to: Square) -> Result<MoveDescriptor, ParseError> {
        let back = -self.get_active_color().pawn_direction();
        let candidates: Vec<Square> = [to.offset(back, 0), to.offset(2 * back, 0)]
            .into_iter()
            .flatten()
            .filter(|&from| self.has_own_pawn(from))
            .collect();

        let mut legal: Vec<MoveDescriptor> = candidates
            .into_iter()
            .map(|from| MoveDescriptor::new(from, to))
            .filter(|mv| self.is_legal_move(mv))
            .collect();

        match legal.len() {
            0 => Err(ParseError::NoPawnCanReach(to)),
            1 => Ok(legal.remove(0)),
            _ => Err(ParseError::AmbiguousPawnPush(to)),
        }
    }

    /// `Nf3`, `Nbd7`, `R1a3`: exactly one piece of that type may legally reach `to`
    fn resolve_piece_move(
        &mut self,
        piece: PieceType,
        disambiguator: Option<(char, Disambiguator)>,
        to: Square,
    ) -> Result<MoveDescriptor, ParseError> {
        let sources: Vec<Square> = self
            .pieces(self.get_active_color())
            .filter(|(_, p)| p.piece_type == piece)
            .map(|(sq, _)| sq)
            .filter(|&sq| disambiguator.map_or(true, |(_, d)| d.matches(sq)))
            .collect();

        let mut legal: Vec<MoveDescriptor> = sources
            .into_iter()
            .map(|from| MoveDescriptor::new(from, to))
            .filter(|mv| self.is_legal_move(mv))
            .collect();

        match (legal.len(), disambiguator) {
            (1, _) => Ok(legal.remove(0)),
            (0, None) => Err(ParseError::NoLegalSource { piece, to }),
            (0, Some((d, _))) => Err(ParseError::NoLegalSourceWithDisambiguator {
                piece,
                disambiguator: d,
                to,
            }),
            (_, None) => Err(ParseError::Ambiguous { piece, to }),
            (_, Some((d, _))) => Err(ParseError::StillAmbiguous {
                piece,
                disambiguator: d,
                to,
            }),
        }
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

    fn parse(board: &mut Board, notation: &str) -> Result<MoveDescriptor, ParseError> {
        let before = board.clone();
        let parsed = board.parse_move(notation);
        assert_eq!(*board, before, "parsing {notation} changed the board");
        parsed
    }

    #[test]
    fn test_castling_tokens() {
        let mut b = Board::new();
        let kingside = MoveDescriptor::castle(Color::White, CastleSide::Kingside);
        let queenside = MoveDescriptor::castle(Color::White, CastleSide::Queenside);
        assert_eq!(parse(&mut b, "O-O"), Ok(kingside));
        assert_eq!(parse(&mut b, "0-0"), Ok(kingside));
        assert_eq!(parse(&mut b, "O-O-O"), Ok(queenside));
        b.set_side_to_move(Color::Black);
        let black = parse(&mut b, "0-0-0").unwrap();
        assert_eq!((black.from, black.to), (sq("e8"), sq("c8")));
        assert!(black.is_queenside_castle());
    }

    #[test]
    fn test_full_coordinates() {
        let mut b = Board::new();
        assert_eq!(parse(&mut b, "e2e4"), Ok(mv("e2", "e4")));
        assert_eq!(parse(&mut b, "  g1f3 "), Ok(mv("g1", "f3")));
        // shape only, legality is decided later
        assert_eq!(parse(&mut b, "e2e5"), Ok(mv("e2", "e5")));
    }

    #[test]
    fn test_pawn_push() {
        let mut b = Board::new();
        assert_eq!(parse(&mut b, "e4"), Ok(mv("e2", "e4")));
        assert_eq!(parse(&mut b, "e3"), Ok(mv("e2", "e3")));
        assert_eq!(parse(&mut b, "e5"), Err(ParseError::NoPawnCanReach(sq("e5"))));
        b.set_side_to_move(Color::Black);
        assert_eq!(parse(&mut b, "d5"), Ok(mv("d7", "d5")));
        assert_eq!(parse(&mut b, "d6"), Ok(mv("d7", "d6")));
    }

    #[test]
    fn test_pawn_push_stacked_pawns() {
        // the front pawn is the only one that can reach e4
        let mut b = Board::from_placements(&["Ke1", "Pe2", "Pe3", "ke8"], Color::White);
        assert_eq!(parse(&mut b, "e4"), Ok(mv("e3", "e4")));
    }

    #[test]
    fn test_pawn_capture_shorthand() {
        let mut b = Board::from_placements(&["Ke1", "Pe4", "pd5", "ke8"], Color::White);
        assert_eq!(parse(&mut b, "exd5"), Ok(mv("e4", "d5")));
        assert_eq!(
            parse(&mut b, "cxd5"),
            Err(ParseError::NoPawnAt {
                color: Color::White,
                square: sq("c4")
            })
        );
        // the capturing pawn comes from a neighbouring file
        for bad in ["exe5", "axd5", "hxa5"] {
            assert_eq!(
                parse(&mut b, bad),
                Err(ParseError::UnrecognizedFormat(bad.to_string()))
            );
        }
        assert_eq!(b.attempt_move("exe5"), MoveResult::Invalid);
        assert_eq!(
            b.piece_at(sq("e4")),
            Some(Piece::new(PieceType::Pawn, Color::White))
        );

        b.set_side_to_move(Color::Black);
        assert_eq!(parse(&mut b, "dxe4"), Ok(mv("d5", "e4")));
    }

    #[test]
    fn test_promotion_form() {
        let mut b = Board::from_placements(&["Ke1", "Pb7", "ke8"], Color::White);
        assert_eq!(
            parse(&mut b, "b7b8Q"),
            Ok(mv("b7", "b8").with_promotion(PieceType::Queen))
        );
        assert_eq!(
            parse(&mut b, "b7b8n"),
            Ok(mv("b7", "b8").with_promotion(PieceType::Knight))
        );
        assert_eq!(
            parse(&mut b, "a7a8Q"),
            Err(ParseError::NoPawnAt {
                color: Color::White,
                square: sq("a7")
            })
        );
        // a king is not a promotion piece, so the string is not a promotion at all
        assert_eq!(
            parse(&mut b, "b7b8K"),
            Err(ParseError::UnrecognizedFormat("b7b8K".to_string()))
        );

        let mut b = Board::from_placements(&["Ke1", "Pb6", "ke8"], Color::White);
        assert_eq!(
            parse(&mut b, "b6b7Q"),
            Err(ParseError::NotPromotionRank {
                color: Color::White,
                square: sq("b7")
            })
        );
    }

    #[test]
    fn test_piece_move() {
        let mut b = Board::new();
        assert_eq!(parse(&mut b, "Nf3"), Ok(mv("g1", "f3")));
        assert_eq!(parse(&mut b, "Nc3"), Ok(mv("b1", "c3")));
        assert_eq!(
            parse(&mut b, "Nd4"),
            Err(ParseError::NoLegalSource {
                piece: PieceType::Knight,
                to: sq("d4")
            })
        );
        assert_eq!(
            parse(&mut b, "Bc4"),
            Err(ParseError::NoLegalSource {
                piece: PieceType::Bishop,
                to: sq("c4")
            })
        );
    }

    #[test]
    fn test_piece_move_ambiguous() {
        // . . . . k . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . N . . . . .
        // . . . . . N . .
        // . . . . . . . K
        // R . . . . . . R
        let mut b = Board::from_placements(
            &["Kh2", "Ra1", "Rh1", "Nc4", "Nf3", "ke8"],
            Color::White,
        );
        // knights on c4 and f3 both reach d2
        assert_eq!(
            parse(&mut b, "Nd2"),
            Err(ParseError::Ambiguous {
                piece: PieceType::Knight,
                to: sq("d2")
            })
        );
        assert_eq!(parse(&mut b, "Ncd2"), Ok(mv("c4", "d2")));
        assert_eq!(parse(&mut b, "Nfd2"), Ok(mv("f3", "d2")));
        assert_eq!(parse(&mut b, "N4d2"), Ok(mv("c4", "d2")));
        assert_eq!(parse(&mut b, "N3d2"), Ok(mv("f3", "d2")));
        assert_eq!(
            parse(&mut b, "Nbd2"),
            Err(ParseError::NoLegalSourceWithDisambiguator {
                piece: PieceType::Knight,
                disambiguator: 'b',
                to: sq("d2")
            })
        );

        // rooks on a1 and h1 both reach e1, and share rank 1
        assert_eq!(
            parse(&mut b, "Re1"),
            Err(ParseError::Ambiguous {
                piece: PieceType::Rook,
                to: sq("e1")
            })
        );
        assert_eq!(
            parse(&mut b, "R1e1"),
            Err(ParseError::StillAmbiguous {
                piece: PieceType::Rook,
                disambiguator: '1',
                to: sq("e1")
            })
        );
        assert_eq!(parse(&mut b, "Rae1"), Ok(mv("a1", "e1")));
    }

    #[test]
    fn test_piece_move_pinned_piece_is_not_a_candidate() {
        // the knight on e2 is pinned, so Nc3 can only mean the b1 knight
        let mut b = Board::from_placements(&["Ke1", "Ne2", "Nb1", "re8", "kh8"], Color::White);
        assert_eq!(parse(&mut b, "Nc3"), Ok(mv("b1", "c3")));
    }

    #[test]
    fn test_unrecognized() {
        let mut b = Board::new();
        assert_eq!(parse(&mut b, ""), Err(ParseError::Empty));
        assert_eq!(parse(&mut b, "   "), Err(ParseError::Empty));
        for bad in [
            "hello", "e9", "i2i4", "Xf3", "Pe4", "nf3", "O-O-O-O", "e2-e4", "Nxf3", "e7e8=Q",
        ] {
            assert_eq!(
                parse(&mut b, bad),
                Err(ParseError::UnrecognizedFormat(bad.to_string())),
                "{bad}"
            );
        }
    }
}
