use tracing::error;

use crate::board::Board;
use crate::rules::attacks_square;
use crate::types::*;

impl Board {
    /// Is the king of `color` attacked by any opposing piece?
    ///
    /// A missing king means the setup skipped `validate_kings`; it is logged and
    /// reported as "not in check".
    pub fn is_in_check(&self, color: Color) -> bool {
        let Some(king) = self.king_square(color) else {
            error!("{} king not found on the board, cannot look for check", color);
            return false;
        };
        self.is_square_attacked(king, color.other_color())
    }

    /// Is `square` attacked by any piece of `by`?
    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        self.pieces(by)
            .any(|(from, piece)| attacks_square(self, piece, from, square))
    }
}
