//! Chess position representation.

use chess_core::{Color, Fen, FenError, MoveRecord, Piece, PieceKind, Promotion, Square};
use serde::{Deserialize, Serialize};

use crate::movegen::{is_promotion_square, legal_moves, make_move};
use crate::rules::{self, Status};
use crate::{Board, CastlingRights, SquareSet};

/// Everything the rules need to know about the current position.
///
/// Unlike [`Game`](crate::Game), a position has no selection, pending
/// promotion or history. It is the value the game snapshots for undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub board: Board,

    /// The side to move.
    pub side_to_move: Color,

    /// Castling rights.
    pub castling: CastlingRights,

    /// The move played just before this position, if any. Decides en
    /// passant eligibility.
    pub last_move: Option<MoveRecord>,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Position {
            board: Board::startpos(),
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            last_move: None,
        }
    }

    /// Creates a position from a FEN string.
    ///
    /// An en passant square becomes a synthetic double step of the side that
    /// just moved, so the capture is offered exactly as after a real one.
    /// The move clocks are read but not kept.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = Fen::parse(fen)?;
        let board = Board::from_squares(parsed.placement);
        let last_move = parsed
            .en_passant
            .and_then(|ep| synthetic_double_step(&board, parsed.active_color.opposite(), ep));

        Ok(Position {
            board,
            side_to_move: parsed.active_color,
            castling: CastlingRights::from_fen(&parsed.castling),
            last_move,
        })
    }

    /// Converts the position to a FEN string.
    ///
    /// The en passant field is derived from the last move. Clocks are not
    /// tracked and are always written as `0 1`.
    pub fn to_fen(&self) -> String {
        Fen {
            placement: *self.board.squares(),
            active_color: self.side_to_move,
            castling: self.castling.to_fen(),
            en_passant: self.en_passant_square(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
        .to_fen()
    }

    /// Returns the square a pawn could capture onto en passant, if the last
    /// move was a double step.
    pub fn en_passant_square(&self) -> Option<Square> {
        let last = self.last_move.as_ref().filter(|m| m.is_double_pawn_step())?;
        last.from.offset(last.piece.color.pawn_direction(), 0)
    }

    /// Returns the legal destinations of the piece on `from`, whichever side
    /// it belongs to.
    pub fn legal_destinations(&self, from: Square) -> SquareSet {
        legal_moves(&self.board, from, self.last_move.as_ref(), self.castling)
    }

    /// Lists every legal (origin, destination) pair for the side to move.
    pub fn legal_moves(&self) -> Vec<(Square, Square)> {
        self.board
            .pieces(self.side_to_move)
            .flat_map(|(from, _)| {
                self.legal_destinations(from)
                    .into_iter()
                    .map(move |to| (from, to))
            })
            .collect()
    }

    /// Returns true if moving the piece on `from` to `to` needs a promotion
    /// choice.
    pub fn is_promotion(&self, from: Square, to: Square) -> bool {
        self.board
            .piece_at(from)
            .is_some_and(|piece| is_promotion_square(piece, to))
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        rules::is_in_check(&self.board, self.side_to_move)
    }

    /// Derives the status for the side to move.
    pub fn status(&self) -> Status {
        rules::evaluate(
            &self.board,
            self.side_to_move,
            self.last_move.as_ref(),
            self.castling,
        )
    }

    /// Carries out the board effect of a move and the castling rights it
    /// gives up, leaving the turn and last move untouched.
    ///
    /// No legality check is made. Returns `None` if `from` is empty.
    pub fn advance(&mut self, from: Square, to: Square) -> Option<MoveRecord> {
        let record = make_move(&mut self.board, from, to)?;
        self.castling.update(record.piece, from, to);
        Some(record)
    }

    /// Replaces the pawn that reached the last rank with the chosen piece.
    pub fn promote(&mut self, record: &mut MoveRecord, choice: Promotion) {
        self.board
            .put(record.to, Piece::new(record.piece.color, choice.kind()));
        record.promotion = Some(choice);
    }

    /// Records the move as the last one and passes the turn.
    pub fn finish(&mut self, record: MoveRecord) {
        self.last_move = Some(record);
        self.side_to_move = self.side_to_move.opposite();
    }

    /// Plays a whole move in one step. A pawn reaching the last rank becomes
    /// `promotion`, or a queen if none is given.
    ///
    /// No legality check is made. Returns `None` if `from` is empty.
    pub fn play(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Promotion>,
    ) -> Option<MoveRecord> {
        let mut record = self.advance(from, to)?;
        if is_promotion_square(record.piece, to) {
            self.promote(&mut record, promotion.unwrap_or(Promotion::Queen));
        }
        self.finish(record);
        Some(record)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

/// Rebuilds the double step that a FEN en passant square implies.
///
/// Returns `None` unless the square sits right behind a pawn of `mover`
/// that could have just made that step.
fn synthetic_double_step(board: &Board, mover: Color, ep: Square) -> Option<MoveRecord> {
    let dir = mover.pawn_direction();
    let from = ep.offset(-dir, 0)?;
    let to = ep.offset(dir, 0)?;
    let pawn = Piece::new(mover, PieceKind::Pawn);

    if from.rank_index() != mover.pawn_rank() || board.piece_at(to) != Some(pawn) {
        return None;
    }

    Some(MoveRecord {
        piece: pawn,
        from,
        to,
        captured: None,
        special: None,
        promotion: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Special;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn startpos_fen_roundtrip() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(), Fen::STARTPOS);
        assert_eq!(Position::from_fen(Fen::STARTPOS).unwrap(), pos);
    }

    #[test]
    fn custom_fen_roundtrip() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn clocks_are_not_kept() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 12 40").unwrap();
        assert_eq!(pos.to_fen(), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
    }

    #[test]
    fn en_passant_field_becomes_last_move() {
        let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1";
        let pos = Position::from_fen(fen).unwrap();
        let last = pos.last_move.unwrap();
        assert_eq!(last.from, sq("d7"));
        assert_eq!(last.to, sq("d5"));
        assert_eq!(last.piece, Piece::new(Color::Black, PieceKind::Pawn));
        assert_eq!(pos.en_passant_square(), Some(sq("d6")));
        assert!(pos.legal_destinations(sq("e5")).contains(sq("d6")));
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn en_passant_field_without_pawn_is_dropped() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - d6 0 1").unwrap();
        assert_eq!(pos.last_move, None);
    }

    #[test]
    fn position_no_castling() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w - - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.castling, CastlingRights::NONE);
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn position_black_to_move() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.side_to_move, Color::Black);
        assert_eq!(pos.en_passant_square(), Some(sq("e3")));
    }

    #[test]
    fn invalid_fen_is_rejected() {
        assert!(Position::from_fen("not a fen").is_err());
    }

    #[test]
    fn startpos_moves() {
        let pos = Position::startpos();
        assert_eq!(pos.legal_moves().len(), 20);
        assert!(!pos.is_check());
        assert_eq!(pos.status(), Status::Normal);
    }

    #[test]
    fn play_double_step_sets_en_passant() {
        let mut pos = Position::startpos();
        let record = pos.play(sq("e2"), sq("e4"), None).unwrap();
        assert!(record.is_double_pawn_step());
        assert_eq!(pos.side_to_move, Color::Black);
        assert_eq!(pos.last_move, Some(record));
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn advance_updates_castling_only() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let record = pos.advance(Square::E1, Square::G1).unwrap();
        assert_eq!(record.special, Some(Special::CastleKingside));
        assert!(!pos.castling.can_castle_kingside(Color::White));
        assert!(!pos.castling.can_castle_queenside(Color::White));
        assert!(pos.castling.can_castle_kingside(Color::Black));
        assert_eq!(pos.side_to_move, Color::White);
        assert_eq!(pos.last_move, None);
    }

    #[test]
    fn play_promotes() {
        let mut pos = Position::from_fen("8/4P3/8/8/8/8/8/k6K w - - 0 1").unwrap();
        assert!(pos.is_promotion(sq("e7"), sq("e8")));
        let record = pos.play(sq("e7"), sq("e8"), Some(Promotion::Knight)).unwrap();
        assert_eq!(record.promotion, Some(Promotion::Knight));
        assert_eq!(
            pos.board.piece_at(sq("e8")),
            Some(Piece::new(Color::White, PieceKind::Knight))
        );

        let mut pos = Position::from_fen("8/4P3/8/8/8/8/8/k6K w - - 0 1").unwrap();
        pos.play(sq("e7"), sq("e8"), None).unwrap();
        assert_eq!(
            pos.board.piece_at(sq("e8")),
            Some(Piece::new(Color::White, PieceKind::Queen))
        );
    }

    #[test]
    fn play_from_empty_square() {
        let mut pos = Position::startpos();
        assert_eq!(pos.play(sq("e4"), sq("e5"), None), None);
        assert_eq!(pos, Position::startpos());
    }

    #[test]
    fn serde_roundtrip() {
        let mut pos = Position::startpos();
        pos.play(sq("g1"), sq("f3"), None).unwrap();
        let json = serde_json::to_string(&pos).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pos);
    }
}
