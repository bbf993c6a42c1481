//! Check, checkmate and stalemate detection.

use crate::movegen::{has_any_legal_move, is_attacked};
use crate::{Board, CastlingRights};
use chess_core::{Color, MoveRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal-condition status for the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Status {
    /// Nothing to report.
    #[default]
    Normal,
    /// The given color is in check but has a way out.
    Check { color: Color },
    /// The side to move is mated; `winner` is the other color.
    Checkmate { winner: Color },
    /// The side to move has no legal move and is not in check.
    Stalemate,
}

impl Status {
    /// Returns true if the game cannot continue.
    #[inline]
    pub const fn is_game_over(self) -> bool {
        matches!(self, Status::Checkmate { .. } | Status::Stalemate)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Normal => Ok(()),
            Status::Check { color } => write!(f, "Check to {}", color),
            Status::Checkmate { winner } => write!(f, "Checkmate! {} wins", winner),
            Status::Stalemate => write!(f, "Stalemate (draw)"),
        }
    }
}

/// Returns true if the king of `color` is attacked.
///
/// A board without that king counts as in check. Such a board can only come
/// from malformed loaded state, and this keeps it playable rather than fatal.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => is_attacked(board, king, color.opposite()),
        None => true,
    }
}

/// Derives the status for `to_move` on the given board.
pub fn evaluate(
    board: &Board,
    to_move: Color,
    last_move: Option<&MoveRecord>,
    castling: CastlingRights,
) -> Status {
    let in_check = is_in_check(board, to_move);
    let can_move = has_any_legal_move(board, to_move, last_move, castling);

    match (in_check, can_move) {
        (true, false) => Status::Checkmate {
            winner: to_move.opposite(),
        },
        (true, true) => Status::Check { color: to_move },
        (false, false) => Status::Stalemate,
        (false, true) => Status::Normal,
    }
}
