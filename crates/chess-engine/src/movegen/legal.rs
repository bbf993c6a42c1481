//! Legality filter.

use super::{is_promotion_square, make_move, pseudo_moves};
use crate::rules::is_in_check;
use crate::{Board, CastlingRights, SquareSet};
use chess_core::{Color, MoveRecord, Piece, PieceKind, Square};

/// Generates the legal destinations for the piece on `from`.
///
/// Each pseudo-legal destination is played out on a scratch copy of the
/// board and dropped if it leaves the mover's own king attacked. A pawn
/// arriving on the last rank is treated as a queen for this test; the real
/// promotion choice comes later.
pub fn legal_moves(
    board: &Board,
    from: Square,
    last_move: Option<&MoveRecord>,
    castling: CastlingRights,
) -> SquareSet {
    let Some(piece) = board.piece_at(from) else {
        return SquareSet::EMPTY;
    };

    pseudo_moves(board, from, last_move, castling)
        .into_iter()
        .filter(|&to| keeps_king_safe(board, piece.color, from, to))
        .collect()
}

/// Plays `from`→`to` on a scratch board and reports whether `us` is out of check.
fn keeps_king_safe(board: &Board, us: Color, from: Square, to: Square) -> bool {
    let mut scratch = *board;
    if let Some(record) = make_move(&mut scratch, from, to) {
        if is_promotion_square(record.piece, to) {
            scratch.put(to, Piece::new(us, PieceKind::Queen));
        }
    }
    !is_in_check(&scratch, us)
}

/// Returns true if any piece of `color` has at least one legal move.
pub fn has_any_legal_move(
    board: &Board,
    color: Color,
    last_move: Option<&MoveRecord>,
    castling: CastlingRights,
) -> bool {
    board
        .pieces(color)
        .any(|(sq, _)| !legal_moves(board, sq, last_move, castling).is_empty())
}
