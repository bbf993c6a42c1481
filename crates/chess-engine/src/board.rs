//! Board contents and castling rights.

use chess_core::{Color, Fen, FenError, Piece, PieceKind, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::SquareSet;

/// Castling availability for both sides.
///
/// Rights only ever go away during a game; nothing here can grant one back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub const ALL: CastlingRights = CastlingRights {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    /// Parses a FEN castling field ("KQkq", "Kq", "-").
    pub fn from_fen(field: &str) -> Self {
        CastlingRights {
            white_kingside: field.contains('K'),
            white_queenside: field.contains('Q'),
            black_kingside: field.contains('k'),
            black_queenside: field.contains('q'),
        }
    }

    /// Writes the FEN castling field.
    pub fn to_fen(self) -> String {
        let mut out = String::new();
        if self.white_kingside {
            out.push('K');
        }
        if self.white_queenside {
            out.push('Q');
        }
        if self.black_kingside {
            out.push('k');
        }
        if self.black_queenside {
            out.push('q');
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }

    /// Returns true if the given side can castle kingside.
    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    /// Returns true if the given side can castle queenside.
    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    /// Removes castling rights for a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.remove_kingside(color);
        self.remove_queenside(color);
    }

    /// Removes kingside castling for a color.
    #[inline]
    pub fn remove_kingside(&mut self, color: Color) {
        match color {
            Color::White => self.white_kingside = false,
            Color::Black => self.black_kingside = false,
        }
    }

    /// Removes queenside castling for a color.
    #[inline]
    pub fn remove_queenside(&mut self, color: Color) {
        match color {
            Color::White => self.white_queenside = false,
            Color::Black => self.black_queenside = false,
        }
    }

    /// Clears the rights a move from `from` to `to` by `moved` gives up.
    ///
    /// A king move drops both of its side's rights. Leaving a rook corner, or
    /// landing on one (capturing the rook there), drops that corner's right.
    pub fn update(&mut self, moved: Piece, from: Square, to: Square) {
        if moved.kind == PieceKind::King {
            self.remove_color(moved.color);
        }
        for sq in [from, to] {
            match sq {
                Square::A1 => self.remove_queenside(Color::White),
                Square::H1 => self.remove_kingside(Color::White),
                Square::A8 => self.remove_queenside(Color::Black),
                Square::H8 => self.remove_kingside(Color::Black),
                _ => {}
            }
        }
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::ALL
    }
}

/// The 8×8 grid of optional occupants.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Board {
    /// Creates a board with no pieces.
    pub const fn empty() -> Self {
        Board {
            squares: [None; 64],
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Board::empty();
        for color in Color::ALL {
            for (file, kind) in BACK_RANK.into_iter().enumerate() {
                let file = file as u8;
                board.squares[(color.back_rank() * 8 + file) as usize] =
                    Some(Piece::new(color, kind));
                board.squares[(color.pawn_rank() * 8 + file) as usize] =
                    Some(Piece::new(color, PieceKind::Pawn));
            }
        }
        board
    }

    /// Creates a board from a FEN piece placement field.
    pub fn from_placement(placement: &str) -> Result<Self, FenError> {
        Ok(Board {
            squares: Fen::parse_placement(placement)?,
        })
    }

    /// Creates a board from already parsed square contents.
    pub const fn from_squares(squares: [Option<Piece>; 64]) -> Self {
        Board { squares }
    }

    /// Returns the occupant of every square, indexed by [`Square::index`].
    #[inline]
    pub const fn squares(&self) -> &[Option<Piece>; 64] {
        &self.squares
    }

    /// Returns the FEN piece placement field.
    pub fn to_placement(&self) -> String {
        Fen::placement_to_string(&self.squares)
    }

    /// Returns the piece at the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index() as usize]
    }

    /// Places a piece, replacing whatever stood there.
    #[inline]
    pub fn put(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.index() as usize] = Some(piece);
    }

    /// Empties a square, returning its former occupant.
    #[inline]
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index() as usize].take()
    }

    /// Returns true if no piece stands on the square.
    #[inline]
    pub fn is_empty_at(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Returns the color of the piece on the square, if any.
    #[inline]
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        self.piece_at(sq).map(|p| p.color)
    }

    /// Finds the king of the given color.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        Square::all().find(|&sq| self.piece_at(sq) == Some(king))
    }

    /// Iterates over the pieces of one color, a1 first.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some(piece) if piece.color == color => Some((sq, piece)),
            _ => None,
        })
    }

    /// Returns the set of occupied squares.
    pub fn occupied(&self) -> SquareSet {
        Square::all().filter(|&sq| !self.is_empty_at(sq)).collect()
    }

    /// Returns the set of squares occupied by one color.
    pub fn occupied_by(&self, color: Color) -> SquareSet {
        self.pieces(color).map(|(sq, _)| sq).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl TryFrom<String> for Board {
    type Error = FenError;

    fn try_from(placement: String) -> Result<Self, Self::Error> {
        Board::from_placement(&placement)
    }
}

impl From<Board> for String {
    fn from(board: Board) -> Self {
        board.to_placement()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board({})", self.to_placement())?;
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let c = Square::from_coords(rank, file)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', |p| p.to_fen_char());
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}
