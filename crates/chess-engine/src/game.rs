//! The game state machine.
//!
//! [`Game`] owns the authoritative [`Position`] and is the only thing that
//! commits moves to it. Play is driven by square clicks through
//! [`Game::select_or_move`]: the first click selects a piece, the second
//! moves it. A pawn reaching the last rank suspends play until
//! [`Game::choose_promotion`] is called. Every commit pushes a snapshot that
//! [`Game::undo`] can restore.

use crate::movegen::is_promotion_square;
use crate::rules::Status;
use crate::view::GameView;
use crate::{Board, CastlingRights, Position, SquareSet};
use chess_core::{Color, FenError, MoveRecord, Piece, Promotion, Square};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Error type for game operations.
///
/// A rejected operation never changes the game.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    /// Only a promotion choice is accepted until the pending one is resolved.
    #[error("a promotion choice is pending")]
    PromotionPending,
    #[error("no promotion is pending")]
    NoPromotionPending,
    #[error("nothing to undo")]
    NothingToUndo,
    /// The move is not legal in the current position.
    #[error("illegal move: {from}{to}")]
    IllegalMove { from: Square, to: Square },
    /// The move text could not be parsed.
    #[error("invalid move text: {0:?}")]
    InvalidMoveText(String),
}

/// Pieces taken so far, grouped by the color that took them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPieces {
    pub by_white: Vec<Piece>,
    pub by_black: Vec<Piece>,
}

impl CapturedPieces {
    /// Returns the pieces taken by `capturer`, in capture order.
    pub fn by(&self, capturer: Color) -> &[Piece] {
        match capturer {
            Color::White => &self.by_white,
            Color::Black => &self.by_black,
        }
    }

    /// Returns the pieces taken by `capturer`, sorted by kind for display.
    pub fn sorted(&self, capturer: Color) -> Vec<Piece> {
        let mut pieces = self.by(capturer).to_vec();
        pieces.sort();
        pieces
    }

    fn push(&mut self, capturer: Color, piece: Piece) {
        match capturer {
            Color::White => self.by_white.push(piece),
            Color::Black => self.by_black.push(piece),
        }
    }
}

/// Which square, if any, the player has picked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Selection {
    #[default]
    Idle,
    Selected {
        from: Square,
        destinations: SquareSet,
    },
}

/// A move that reached the last rank and waits for its promotion piece.
///
/// The pawn already stands on `record.to`. The captured piece and last move
/// are only finalized once the choice is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPromotion {
    pub record: MoveRecord,
}

/// A copy of everything undo restores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Snapshot {
    position: Position,
    captured: CapturedPieces,
}

/// What an accepted operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "kebab-case")]
pub enum Notice {
    /// A piece was picked up.
    Selected {
        square: Square,
        destinations: SquareSet,
    },
    /// The selection was dropped.
    Deselected,
    /// The click had no effect.
    Ignored,
    /// A piece of the side to move was clicked but cannot move.
    NoLegalMoves { square: Square },
    /// A move was committed and the turn passed.
    Moved { record: MoveRecord, status: Status },
    /// A pawn reached the last rank; a promotion choice is now required.
    PromotionRequired { square: Square },
    Undone { status: Status },
    Reset,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Selected { square, destinations } => {
                write!(f, "Selected {} ({} moves)", square, destinations.len())
            }
            Notice::Deselected => write!(f, "Selection cleared"),
            Notice::Ignored => Ok(()),
            Notice::NoLegalMoves { square } => {
                write!(f, "The piece on {} has no legal moves", square)
            }
            Notice::Moved { record, status } => match status {
                Status::Normal => write!(f, "Played {}", record),
                _ => write!(f, "Played {}. {}", record, status),
            },
            Notice::PromotionRequired { square } => {
                write!(f, "Choose a promotion piece for {}", square)
            }
            Notice::Undone { status } => match status {
                Status::Normal => write!(f, "Move undone"),
                _ => write!(f, "Move undone. {}", status),
            },
            Notice::Reset => write!(f, "New game"),
        }
    }
}

/// A chess game driven by square clicks, with undo history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    position: Position,
    captured: CapturedPieces,
    selection: Selection,
    pending: Option<PendingPromotion>,
    history: Vec<Snapshot>,
    status: Status,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    /// Creates a game from a custom starting position.
    pub fn from_position(position: Position) -> Self {
        Game {
            status: position.status(),
            position,
            captured: CapturedPieces::default(),
            selection: Selection::Idle,
            pending: None,
            history: Vec::new(),
        }
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Returns a reference to the current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn board(&self) -> &Board {
        &self.position.board
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    pub fn castling(&self) -> CastlingRights {
        self.position.castling
    }

    /// Returns the last fully committed move.
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.position.last_move.as_ref()
    }

    pub fn captured(&self) -> &CapturedPieces {
        &self.captured
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Returns the square of the pawn waiting for its promotion piece.
    pub fn pending_promotion(&self) -> Option<Square> {
        self.pending.map(|p| p.record.to)
    }

    /// Returns the status for the side to move. Always `Normal` while a
    /// promotion is pending.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns the number of moves that can be undone.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.pending.is_none() && !self.history.is_empty()
    }

    /// Converts the current position to a FEN string.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// Returns a snapshot for rendering.
    pub fn view(&self) -> GameView {
        GameView::new(self)
    }

    /// Returns the legal destinations of the piece on `square`, for
    /// highlighting. Works for either side's pieces.
    pub fn legal_destinations(&self, square: Square) -> SquareSet {
        self.position.legal_destinations(square)
    }

    /// Handles a click on `square`.
    ///
    /// With nothing selected, a piece of the side to move is picked up. With a
    /// piece selected, a legal destination commits the move, another piece of
    /// the side to move is picked up instead, and anything else deselects.
    pub fn select_or_move(&mut self, square: Square) -> Result<Notice, GameError> {
        if self.pending.is_some() {
            return Err(GameError::PromotionPending);
        }

        match self.selection {
            Selection::Selected { from, destinations } if destinations.contains(square) => {
                self.commit(from, square)
            }
            Selection::Selected { .. } if !self.is_own_piece(square) => {
                debug!(%square, "deselected");
                self.selection = Selection::Idle;
                Ok(Notice::Deselected)
            }
            _ => Ok(self.select(square)),
        }
    }

    fn is_own_piece(&self, square: Square) -> bool {
        self.position.board.color_at(square) == Some(self.position.side_to_move)
    }

    fn select(&mut self, square: Square) -> Notice {
        self.selection = Selection::Idle;
        if !self.is_own_piece(square) {
            return Notice::Ignored;
        }

        let destinations = self.legal_destinations(square);
        if destinations.is_empty() {
            debug!(%square, "no legal moves");
            return Notice::NoLegalMoves { square };
        }

        debug!(%square, moves = destinations.len(), "selected");
        self.selection = Selection::Selected {
            from: square,
            destinations,
        };
        Notice::Selected {
            square,
            destinations,
        }
    }

    fn commit(&mut self, from: Square, to: Square) -> Result<Notice, GameError> {
        let mut next = self.position;
        let record = next
            .advance(from, to)
            .ok_or(GameError::IllegalMove { from, to })?;

        self.history.push(Snapshot {
            position: self.position,
            captured: self.captured.clone(),
        });
        self.position = next;
        self.selection = Selection::Idle;

        if is_promotion_square(record.piece, to) {
            debug!(?record, "awaiting promotion");
            self.pending = Some(PendingPromotion { record });
            self.status = Status::Normal;
            return Ok(Notice::PromotionRequired { square: to });
        }

        Ok(self.finalize(record))
    }

    /// Books the capture, records the last move, passes the turn and
    /// refreshes the status.
    fn finalize(&mut self, record: MoveRecord) -> Notice {
        if let Some(captured) = record.captured {
            self.captured.push(record.piece.color, captured);
        }
        self.position.finish(record);
        debug!(?record, "move committed");
        self.refresh_status();
        Notice::Moved {
            record,
            status: self.status,
        }
    }

    fn refresh_status(&mut self) {
        let status = self.position.status();
        if status != self.status && status != Status::Normal {
            info!(%status, "status changed");
        }
        self.status = status;
    }

    /// Resolves a pending promotion with the chosen piece and finishes the
    /// move.
    pub fn choose_promotion(&mut self, choice: Promotion) -> Result<Notice, GameError> {
        let PendingPromotion { mut record } =
            self.pending.take().ok_or(GameError::NoPromotionPending)?;
        self.position.promote(&mut record, choice);
        debug!(square = %record.to, ?choice, "promoted");
        Ok(self.finalize(record))
    }

    /// Takes back the most recent commit.
    ///
    /// Refused while a promotion is pending.
    pub fn undo(&mut self) -> Result<Notice, GameError> {
        if self.pending.is_some() {
            return Err(GameError::PromotionPending);
        }
        let snapshot = self.history.pop().ok_or(GameError::NothingToUndo)?;
        self.position = snapshot.position;
        self.captured = snapshot.captured;
        self.selection = Selection::Idle;
        debug!(remaining = self.history.len(), "undone");
        self.refresh_status();
        Ok(Notice::Undone {
            status: self.status,
        })
    }

    /// Starts over from the initial position, dropping all history. Allowed
    /// at any time, including while a promotion is pending.
    pub fn reset(&mut self) -> Notice {
        debug!("reset");
        *self = Game::new();
        Notice::Reset
    }

    /// Plays a whole move, as a select click followed by a move click.
    ///
    /// A move to the last rank leaves the promotion pending.
    pub fn play(&mut self, from: Square, to: Square) -> Result<Notice, GameError> {
        if self.pending.is_some() {
            return Err(GameError::PromotionPending);
        }
        if !self.is_own_piece(from) || !self.legal_destinations(from).contains(to) {
            return Err(GameError::IllegalMove { from, to });
        }
        self.commit(from, to)
    }

    /// Plays a move in coordinate notation, such as `e2e4` or `e7e8n`.
    ///
    /// Without a promotion letter a move to the last rank leaves the
    /// promotion pending. A promotion letter on any other move is rejected.
    pub fn play_uci(&mut self, text: &str) -> Result<Notice, GameError> {
        let invalid = || GameError::InvalidMoveText(text.to_string());
        let (from, to, promotion) = parse_coordinate(text).ok_or_else(invalid)?;

        if promotion.is_some() && !self.position.is_promotion(from, to) {
            return Err(GameError::IllegalMove { from, to });
        }

        let notice = self.play(from, to)?;
        match promotion {
            Some(choice) => self.choose_promotion(choice),
            None => Ok(notice),
        }
    }
}

/// Parses `e2e4` or `e7e8q` into its parts.
fn parse_coordinate(text: &str) -> Option<(Square, Square, Option<Promotion>)> {
    let text = text.trim();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return None;
    }
    let from = Square::from_algebraic(&text[0..2])?;
    let to = Square::from_algebraic(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        Some(c) => Some(Promotion::from_char(c)?),
        None => None,
    };
    Some((from, to, promotion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::PieceKind;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn click(game: &mut Game, s: &str) -> Notice {
        game.select_or_move(sq(s)).unwrap()
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.status(), Status::Normal);
        assert_eq!(game.selection(), Selection::Idle);
        assert_eq!(game.history_len(), 0);
        assert!(!game.can_undo());
        assert_eq!(game.castling(), CastlingRights::ALL);
    }

    #[test]
    fn select_then_move() {
        let mut game = Game::new();
        let notice = click(&mut game, "e2");
        assert!(matches!(notice, Notice::Selected { square, .. } if square == sq("e2")));

        let notice = click(&mut game, "e4");
        let Notice::Moved { record, status } = notice else {
            panic!("expected a move, got {:?}", notice);
        };
        assert_eq!(record.to_coordinate(), "e2e4");
        assert_eq!(status, Status::Normal);
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.selection(), Selection::Idle);
        assert_eq!(game.history_len(), 1);
    }

    #[test]
    fn clicking_opponent_piece_while_idle_is_ignored() {
        let mut game = Game::new();
        assert_eq!(click(&mut game, "e7"), Notice::Ignored);
        assert_eq!(click(&mut game, "e4"), Notice::Ignored);
        assert_eq!(game.selection(), Selection::Idle);
    }

    #[test]
    fn piece_without_moves_gives_notice() {
        let mut game = Game::new();
        assert_eq!(
            click(&mut game, "a1"),
            Notice::NoLegalMoves { square: Square::A1 }
        );
        assert_eq!(game.selection(), Selection::Idle);
    }

    #[test]
    fn reselect_own_piece() {
        let mut game = Game::new();
        click(&mut game, "e2");
        let notice = click(&mut game, "g1");
        assert!(matches!(notice, Notice::Selected { square, .. } if square == Square::G1));

        // Switching to a piece that cannot move drops the selection.
        assert_eq!(
            click(&mut game, "d1"),
            Notice::NoLegalMoves { square: Square::D1 }
        );
        assert_eq!(game.selection(), Selection::Idle);
    }

    #[test]
    fn clicking_elsewhere_deselects() {
        let mut game = Game::new();
        click(&mut game, "e2");
        assert_eq!(click(&mut game, "e5"), Notice::Deselected);
        assert_eq!(game.selection(), Selection::Idle);
        assert_eq!(game.side_to_move(), Color::White);
    }

    #[test]
    fn play_rejects_illegal_and_leaves_state() {
        let mut game = Game::new();
        let before = game.clone();
        assert_eq!(
            game.play(sq("e2"), sq("e5")),
            Err(GameError::IllegalMove {
                from: sq("e2"),
                to: sq("e5")
            })
        );
        // Black may not move first.
        assert!(game.play(sq("e7"), sq("e5")).is_err());
        assert_eq!(game, before);
    }

    #[test]
    fn play_uci_parses_and_rejects() {
        let mut game = Game::new();
        game.play_uci("g1f3").unwrap();
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(
            game.play_uci("xx"),
            Err(GameError::InvalidMoveText("xx".to_string()))
        );
        assert!(matches!(
            game.play_uci("e7e5q"),
            Err(GameError::IllegalMove { .. })
        ));
        assert!(matches!(
            game.play_uci("e7e5k"),
            Err(GameError::InvalidMoveText(_))
        ));
    }

    #[test]
    fn fools_mate() {
        let mut game = Game::new();
        for mv in ["f2f3", "e7e5", "g2g4"] {
            game.play_uci(mv).unwrap();
        }
        let notice = game.play_uci("d8h4").unwrap();
        let mate = Status::Checkmate {
            winner: Color::Black,
        };
        assert!(matches!(notice, Notice::Moved { status, .. } if status == mate));
        assert_eq!(game.status(), mate);
        assert!(game.status().is_game_over());
    }

    #[test]
    fn check_and_mate_are_reported() {
        let mut game = Game::new();
        for mv in ["e2e4", "f7f6", "d2d4"] {
            game.play_uci(mv).unwrap();
        }
        game.play_uci("g7g5").unwrap();
        game.play_uci("d1h5").unwrap();
        assert_eq!(
            game.status(),
            Status::Checkmate {
                winner: Color::White
            }
        );

        let mut game = Game::new();
        for mv in ["e2e4", "f7f5", "d1h5"] {
            game.play_uci(mv).unwrap();
        }
        assert_eq!(
            game.status(),
            Status::Check {
                color: Color::Black
            }
        );
    }

    fn promotion_game() -> Game {
        // White pawn on g7 can push to g8 or take the rook on h8.
        Game::from_fen("4k2r/6P1/8/8/8/8/8/4K3 w k - 0 1").unwrap()
    }

    #[test]
    fn promotion_waits_for_choice() {
        let mut game = promotion_game();
        let notice = game.play(sq("g7"), sq("h8")).unwrap();
        assert_eq!(notice, Notice::PromotionRequired { square: sq("h8") });
        assert_eq!(game.pending_promotion(), Some(sq("h8")));
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.last_move(), None);
        assert!(game.captured().by(Color::White).is_empty());
        assert_eq!(game.status(), Status::Normal);

        assert_eq!(
            game.select_or_move(sq("e1")),
            Err(GameError::PromotionPending)
        );
        assert_eq!(game.undo(), Err(GameError::PromotionPending));
        assert!(!game.can_undo());

        let notice = game.choose_promotion(Promotion::Knight).unwrap();
        let Notice::Moved { record, .. } = notice else {
            panic!("expected a move, got {:?}", notice);
        };
        assert_eq!(record.promotion, Some(Promotion::Knight));
        assert_eq!(
            game.board().piece_at(sq("h8")),
            Some(Piece::new(Color::White, PieceKind::Knight))
        );
        assert_eq!(
            game.captured().by(Color::White),
            &[Piece::new(Color::Black, PieceKind::Rook)]
        );
        assert_eq!(game.last_move(), Some(&record));
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.pending_promotion(), None);
        assert!(!game.castling().can_castle_kingside(Color::Black));
    }

    #[test]
    fn promotion_choice_without_pending() {
        let mut game = Game::new();
        assert_eq!(
            game.choose_promotion(Promotion::Queen),
            Err(GameError::NoPromotionPending)
        );
    }

    #[test]
    fn play_uci_with_promotion_letter() {
        let mut game = promotion_game();
        game.play_uci("g7g8r").unwrap();
        assert_eq!(
            game.board().piece_at(sq("g8")),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
        assert_eq!(
            game.status(),
            Status::Check {
                color: Color::Black
            }
        );
    }

    #[test]
    fn undo_restores_previous_state() {
        let mut game = Game::new();
        game.play_uci("e2e4").unwrap();
        let before = game.clone();
        game.play_uci("d7d5").unwrap();
        game.play_uci("e4d5").unwrap();
        assert_eq!(game.captured().by(Color::White).len(), 1);

        game.undo().unwrap();
        game.undo().unwrap();
        assert_eq!(game, before);

        game.undo().unwrap();
        assert_eq!(game, Game::new());
        assert_eq!(game.undo(), Err(GameError::NothingToUndo));
    }

    #[test]
    fn undo_clears_selection() {
        let mut game = Game::new();
        game.play_uci("e2e4").unwrap();
        click(&mut game, "e7");
        assert!(matches!(game.selection(), Selection::Selected { .. }));
        game.undo().unwrap();
        assert_eq!(game.selection(), Selection::Idle);
    }

    #[test]
    fn reset_during_promotion() {
        let mut game = promotion_game();
        game.play(sq("g7"), sq("g8")).unwrap();
        assert_eq!(game.reset(), Notice::Reset);
        assert_eq!(game, Game::new());
    }

    #[test]
    fn captured_sorted_for_display() {
        let mut captured = CapturedPieces::default();
        captured.push(Color::Black, Piece::new(Color::White, PieceKind::Queen));
        captured.push(Color::Black, Piece::new(Color::White, PieceKind::Pawn));
        captured.push(Color::Black, Piece::new(Color::White, PieceKind::Knight));
        let kinds: Vec<PieceKind> = captured
            .sorted(Color::Black)
            .iter()
            .map(|p| p.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![PieceKind::Pawn, PieceKind::Knight, PieceKind::Queen]
        );
    }

    #[test]
    fn notice_text() {
        assert_eq!(
            Notice::NoLegalMoves { square: Square::A1 }.to_string(),
            "The piece on a1 has no legal moves"
        );
        assert_eq!(Notice::Ignored.to_string(), "");
    }

    #[test]
    fn serde_roundtrip_mid_promotion() {
        let mut game = promotion_game();
        game.play(sq("g7"), sq("h8")).unwrap();
        let json = serde_json::to_string(&game).unwrap();
        let mut back: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(back, game);
        back.choose_promotion(Promotion::Queen).unwrap();
        assert_eq!(back.side_to_move(), Color::Black);
    }

    #[test]
    fn parse_coordinate_text() {
        assert_eq!(
            parse_coordinate("e7e8n"),
            Some((sq("e7"), sq("e8"), Some(Promotion::Knight)))
        );
        assert_eq!(parse_coordinate(" e2e4 "), Some((sq("e2"), sq("e4"), None)));
        assert_eq!(parse_coordinate("e2e9"), None);
        assert_eq!(parse_coordinate("e2e4qq"), None);
    }
}
