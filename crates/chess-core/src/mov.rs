//! Move records and special-move tags.

use crate::{Piece, PieceKind, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag for the special move families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Special {
    /// En passant capture.
    EnPassant,
    /// Kingside castling (O-O).
    CastleKingside,
    /// Queenside castling (O-O-O).
    CastleQueenside,
}

/// The piece a pawn may become on reaching the last rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    /// All promotion choices, in the order they are offered.
    pub const ALL: [Promotion; 4] = [
        Promotion::Queen,
        Promotion::Rook,
        Promotion::Bishop,
        Promotion::Knight,
    ];

    /// Returns the piece kind this promotion produces.
    #[inline]
    pub const fn kind(self) -> PieceKind {
        match self {
            Promotion::Queen => PieceKind::Queen,
            Promotion::Rook => PieceKind::Rook,
            Promotion::Bishop => PieceKind::Bishop,
            Promotion::Knight => PieceKind::Knight,
        }
    }

    /// Parses a promotion letter ('q', 'r', 'b', 'n'), ignoring case.
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' => Some(Promotion::Queen),
            'r' => Some(Promotion::Rook),
            'b' => Some(Promotion::Bishop),
            'n' => Some(Promotion::Knight),
            _ => None,
        }
    }

    /// Returns the lowercase letter for this promotion.
    #[inline]
    pub const fn to_char(self) -> char {
        self.kind().to_char()
    }
}

/// A committed move, as remembered for en passant and display.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRecord {
    /// The piece that moved, as it stood on the origin square.
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    /// The piece taken on the destination square or via en passant.
    pub captured: Option<Piece>,
    pub special: Option<Special>,
    pub promotion: Option<Promotion>,
}

impl MoveRecord {
    /// Returns true if this was a pawn advancing two ranks.
    #[inline]
    pub fn is_double_pawn_step(&self) -> bool {
        self.piece.kind == PieceKind::Pawn
            && self.from.rank_index().abs_diff(self.to.rank_index()) == 2
    }

    /// Returns the coordinate notation for this move (e.g., "e2e4", "e7e8n").
    pub fn to_coordinate(&self) -> String {
        match self.promotion {
            Some(p) => format!("{}{}{}", self.from, self.to, p.to_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Debug for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MoveRecord({} {}", self.piece.to_fen_char(), self.to_coordinate())?;
        if let Some(captured) = self.captured {
            write!(f, " x{}", captured.to_fen_char())?;
        }
        if let Some(special) = self.special {
            write!(f, " {:?}", special)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_coordinate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn record(piece: Piece, from: &str, to: &str) -> MoveRecord {
        MoveRecord {
            piece,
            from: sq(from),
            to: sq(to),
            captured: None,
            special: None,
            promotion: None,
        }
    }

    #[test]
    fn double_pawn_step() {
        let pawn = Piece::new(Color::White, PieceKind::Pawn);
        assert!(record(pawn, "e2", "e4").is_double_pawn_step());
        assert!(!record(pawn, "e2", "e3").is_double_pawn_step());

        let black_pawn = Piece::new(Color::Black, PieceKind::Pawn);
        assert!(record(black_pawn, "d7", "d5").is_double_pawn_step());

        let rook = Piece::new(Color::White, PieceKind::Rook);
        assert!(!record(rook, "a1", "a3").is_double_pawn_step());
    }

    #[test]
    fn coordinate_notation() {
        let pawn = Piece::new(Color::White, PieceKind::Pawn);
        assert_eq!(record(pawn, "e2", "e4").to_coordinate(), "e2e4");

        let mut promo = record(pawn, "e7", "e8");
        promo.promotion = Some(Promotion::Knight);
        assert_eq!(promo.to_coordinate(), "e7e8n");
        assert_eq!(format!("{}", promo), "e7e8n");
    }

    #[test]
    fn debug_shows_capture_and_tag() {
        let mut m = record(Piece::new(Color::White, PieceKind::Pawn), "e5", "d6");
        m.captured = Some(Piece::new(Color::Black, PieceKind::Pawn));
        m.special = Some(Special::EnPassant);
        assert_eq!(format!("{:?}", m), "MoveRecord(P e5d6 xp EnPassant)");
    }

    #[test]
    fn promotion_parsing() {
        assert_eq!(Promotion::from_char('n'), Some(Promotion::Knight));
        assert_eq!(Promotion::from_char('Q'), Some(Promotion::Queen));
        assert_eq!(Promotion::from_char('k'), None);
        assert_eq!(Promotion::Bishop.kind(), PieceKind::Bishop);
    }
}
