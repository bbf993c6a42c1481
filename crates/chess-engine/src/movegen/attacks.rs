//! Attack tables and the attack oracle.
//!
//! A square is attacked by a color if one of its pieces could land there,
//! castling aside. Pawns are the exception to "could land there": they attack
//! both forward diagonals whether or not anything stands on them.

use crate::{Board, SquareSet};
use chess_core::{Color, PieceKind, Square};

/// Knight leaps as (rank delta, file delta).
pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// King steps as (rank delta, file delta).
pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (1, -1),
    (1, 0),
    (1, 1),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Bishop ray directions.
pub(crate) const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Rook ray directions.
pub(crate) const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Precomputed knight attack tables.
const KNIGHT_ATTACKS: [SquareSet; 64] = leaper_table(&KNIGHT_OFFSETS);

/// Precomputed king attack tables.
const KING_ATTACKS: [SquareSet; 64] = leaper_table(&KING_OFFSETS);

/// Precomputed pawn attack tables [color][square].
const PAWN_ATTACKS: [[SquareSet; 64]; 2] = [
    leaper_table(&[(1, -1), (1, 1)]),
    leaper_table(&[(-1, -1), (-1, 1)]),
];

/// Computes the target set of a fixed-offset piece for all squares at
/// compile time.
const fn leaper_table(offsets: &[(i8, i8)]) -> [SquareSet; 64] {
    let mut table = [SquareSet::EMPTY; 64];
    let mut index = 0u8;

    while index < 64 {
        let rank = (index / 8) as i8;
        let file = (index % 8) as i8;
        let mut bits = 0u64;

        let mut i = 0;
        while i < offsets.len() {
            let (dr, df) = offsets[i];
            let r = rank + dr;
            let f = file + df;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                bits |= 1u64 << ((r * 8 + f) as u32);
            }
            i += 1;
        }

        table[index as usize] = SquareSet::from_bits(bits);
        index += 1;
    }

    table
}

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> SquareSet {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> SquareSet {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the diagonals a pawn of the given color attacks from the square.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> SquareSet {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Casts rays from `sq` along each direction. A ray ends at the board edge or
/// at the first occupied square, which is included whoever stands on it.
pub fn ray_attacks(board: &Board, sq: Square, directions: &[(i8, i8)]) -> SquareSet {
    let mut attacks = SquareSet::EMPTY;
    for &(dr, df) in directions {
        let mut current = sq.offset(dr, df);
        while let Some(target) = current {
            attacks.insert(target);
            if !board.is_empty_at(target) {
                break;
            }
            current = target.offset(dr, df);
        }
    }
    attacks
}

/// Returns bishop attacks from the given square.
#[inline]
pub fn bishop_attacks(board: &Board, sq: Square) -> SquareSet {
    ray_attacks(board, sq, &DIAGONALS)
}

/// Returns rook attacks from the given square.
#[inline]
pub fn rook_attacks(board: &Board, sq: Square) -> SquareSet {
    ray_attacks(board, sq, &ORTHOGONALS)
}

/// Returns queen attacks from the given square.
#[inline]
pub fn queen_attacks(board: &Board, sq: Square) -> SquareSet {
    bishop_attacks(board, sq) | rook_attacks(board, sq)
}

/// Returns the squares the piece on `sq` attacks. Empty if there is no piece.
pub fn attacks_from(board: &Board, sq: Square) -> SquareSet {
    let Some(piece) = board.piece_at(sq) else {
        return SquareSet::EMPTY;
    };
    match piece.kind {
        PieceKind::Pawn => pawn_attacks(sq, piece.color),
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Bishop => bishop_attacks(board, sq),
        PieceKind::Rook => rook_attacks(board, sq),
        PieceKind::Queen => queen_attacks(board, sq),
        PieceKind::King => king_attacks(sq),
    }
}

/// Returns every square the given color attacks.
pub fn squares_attacked_by(board: &Board, color: Color) -> SquareSet {
    let mut attacked = SquareSet::EMPTY;
    for (sq, _) in board.pieces(color) {
        attacked |= attacks_from(board, sq);
    }
    attacked
}

/// Returns true if the given square is attacked by the given color.
///
/// Looks outward from the target square, so it does not have to walk every
/// attacker on the board.
pub fn is_attacked(board: &Board, sq: Square, by_color: Color) -> bool {
    let holds = |squares: SquareSet, kinds: &[PieceKind]| {
        squares.iter().any(|from| {
            matches!(board.piece_at(from), Some(p) if p.color == by_color && kinds.contains(&p.kind))
        })
    };

    // A pawn of `by_color` attacks `sq` from where a pawn of the other color
    // standing on `sq` would attack.
    holds(pawn_attacks(sq, by_color.opposite()), &[PieceKind::Pawn])
        || holds(knight_attacks(sq), &[PieceKind::Knight])
        || holds(king_attacks(sq), &[PieceKind::King])
        || holds(
            bishop_attacks(board, sq),
            &[PieceKind::Bishop, PieceKind::Queen],
        )
        || holds(rook_attacks(board, sq), &[PieceKind::Rook, PieceKind::Queen])
}
