use crate::board::Board;
use crate::types::*;

/// Count the leaf nodes of the legal move tree `depth` plies deep.
///
/// A pawn move onto the far rank counts once per promotion piece, which makes the
/// numbers comparable with published perft tables.
pub fn run_perft_test(board: &Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut board = board.clone();
    let moves = board.legal_moves();

    let mut nodes = 0;
    for m in moves {
        for m in expand_promotions(&board, m) {
            if depth == 1 {
                nodes += 1;
                continue;
            }
            let mut b = board.clone();
            if b.try_move(&m) == MoveResult::Valid {
                nodes += run_perft_test(&b, depth - 1);
            }
        }
    }
    nodes
}

fn expand_promotions(board: &Board, m: MoveDescriptor) -> Vec<MoveDescriptor> {
    let promotes = board.piece_at(m.from).is_some_and(|p| {
        p.piece_type == PieceType::Pawn && m.to.row() == p.color.promotion_row()
    });
    if promotes {
        PIECES_CAN_PROMOTE_TO
            .iter()
            .map(|piece_type| m.with_promotion(*piece_type))
            .collect()
    } else {
        vec![m]
    }
}
