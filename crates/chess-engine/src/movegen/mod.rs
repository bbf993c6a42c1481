//! Move generation.
//!
//! [`pseudo_moves`] produces the destinations a piece's movement pattern
//! allows, ignoring whether its own king is left in check. [`legal_moves`]
//! filters those by playing each one out on a scratch board. [`make_move`]
//! applies a move's full board effect and is shared by the legality filter,
//! the game state machine and perft.

mod attacks;
mod legal;
pub mod perft;

use crate::{Board, CastlingRights, SquareSet};
use chess_core::{Color, MoveRecord, Piece, PieceKind, Rank, Special, Square};

pub use attacks::{
    attacks_from, bishop_attacks, is_attacked, king_attacks, knight_attacks, pawn_attacks,
    queen_attacks, ray_attacks, rook_attacks, squares_attacked_by,
};
pub use legal::{has_any_legal_move, legal_moves};

use attacks::{DIAGONALS, ORTHOGONALS};

/// Generates the pseudo-legal destinations for the piece on `from`.
///
/// An empty square yields an empty set. `last_move` is the move played just
/// before this one and decides en passant eligibility.
pub fn pseudo_moves(
    board: &Board,
    from: Square,
    last_move: Option<&MoveRecord>,
    castling: CastlingRights,
) -> SquareSet {
    let Some(piece) = board.piece_at(from) else {
        return SquareSet::EMPTY;
    };
    let own = board.occupied_by(piece.color);

    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece.color, last_move),
        PieceKind::Knight => knight_attacks(from) & !own,
        PieceKind::Bishop => ray_attacks(board, from, &DIAGONALS) & !own,
        PieceKind::Rook => ray_attacks(board, from, &ORTHOGONALS) & !own,
        PieceKind::Queen => queen_attacks(board, from) & !own,
        PieceKind::King => {
            (king_attacks(from) & !own) | castling_moves(board, from, piece.color, castling)
        }
    }
}

/// Generates pseudo-legal pawn pushes, captures and en passant.
fn pawn_moves(board: &Board, from: Square, us: Color, last_move: Option<&MoveRecord>) -> SquareSet {
    let mut moves = SquareSet::EMPTY;
    let dir = us.pawn_direction();

    // Single and double pushes
    if let Some(one) = from.offset(dir, 0).filter(|&sq| board.is_empty_at(sq)) {
        moves.insert(one);
        if from.rank_index() == us.pawn_rank() {
            if let Some(two) = from.offset(2 * dir, 0).filter(|&sq| board.is_empty_at(sq)) {
                moves.insert(two);
            }
        }
    }

    // Captures
    for target in pawn_attacks(from, us) {
        if board.color_at(target) == Some(us.opposite()) {
            moves.insert(target);
        }
    }

    if let Some(target) = en_passant_target(board, from, us, last_move) {
        moves.insert(target);
    }

    moves
}

/// Returns the en passant landing square for a pawn of `us` on `from`.
///
/// Only the immediately preceding move counts: it must have been an enemy
/// pawn double step ending right beside `from`.
fn en_passant_target(
    board: &Board,
    from: Square,
    us: Color,
    last_move: Option<&MoveRecord>,
) -> Option<Square> {
    let last = last_move?;
    if !last.is_double_pawn_step()
        || last.piece.color == us
        || board.piece_at(last.to) != Some(last.piece)
        || last.to.rank_index() != from.rank_index()
        || last.to.file_index().abs_diff(from.file_index()) != 1
    {
        return None;
    }
    let file_delta = last.to.file_index() as i8 - from.file_index() as i8;
    from.offset(us.pawn_direction(), file_delta)
}

/// Generates castling destinations for a king standing on `from`.
///
/// The king must be on its home square with the right still held, the rook
/// in its corner, every square between them empty, and the king's start,
/// pass-through and destination squares all free of enemy attack.
fn castling_moves(board: &Board, from: Square, us: Color, castling: CastlingRights) -> SquareSet {
    let mut moves = SquareSet::EMPTY;
    let rank = Rank::ALL[us.back_rank() as usize];
    let home = |file: u8| Square::new(chess_core::File::ALL[file as usize], rank);

    if from != home(4) {
        return moves;
    }

    let them = us.opposite();
    let rook = Some(Piece::new(us, PieceKind::Rook));
    let vacant = |files: &[u8]| files.iter().all(|&f| board.is_empty_at(home(f)));
    let safe = |files: &[u8]| files.iter().all(|&f| !is_attacked(board, home(f), them));

    if castling.can_castle_kingside(us)
        && board.piece_at(home(7)) == rook
        && vacant(&[5, 6])
        && safe(&[4, 5, 6])
    {
        moves.insert(home(6));
    }

    if castling.can_castle_queenside(us)
        && board.piece_at(home(0)) == rook
        && vacant(&[1, 2, 3])
        && safe(&[4, 3, 2])
    {
        moves.insert(home(2));
    }

    moves
}

/// Moves the piece on `from` to `to`, carrying out the move's full effect:
/// the en passant victim is removed and a castling rook is relocated.
///
/// Promotion is left to the caller; a pawn reaching the last rank stays a
/// pawn here. Returns `None` if `from` is empty.
pub fn make_move(board: &mut Board, from: Square, to: Square) -> Option<MoveRecord> {
    let piece = board.remove(from)?;
    let mut captured = board.remove(to);
    let mut special = None;

    match piece.kind {
        PieceKind::Pawn if from.file_index() != to.file_index() && captured.is_none() => {
            // The pawn being taken sits beside the origin, not on `to`.
            if let Some(victim) = Square::from_coords(from.rank_index(), to.file_index()) {
                captured = board.remove(victim);
            }
            special = Some(Special::EnPassant);
        }
        PieceKind::King if from.file_index().abs_diff(to.file_index()) == 2 => {
            let (rook_file, rook_to_file, tag) = if to.file_index() == 6 {
                (7, 5, Special::CastleKingside)
            } else {
                (0, 3, Special::CastleQueenside)
            };
            let rank = from.rank_index();
            if let (Some(rook_from), Some(rook_to)) = (
                Square::from_coords(rank, rook_file),
                Square::from_coords(rank, rook_to_file),
            ) {
                if let Some(rook) = board.remove(rook_from) {
                    board.put(rook_to, rook);
                }
            }
            special = Some(tag);
        }
        _ => {}
    }

    board.put(to, piece);

    Some(MoveRecord {
        piece,
        from,
        to,
        captured,
        special,
        promotion: None,
    })
}

/// Returns true if a pawn move to `to` must be followed by a promotion choice.
#[inline]
pub fn is_promotion_square(piece: Piece, to: Square) -> bool {
    piece.kind == PieceKind::Pawn && to.rank_index() == piece.color.promotion_rank()
}
