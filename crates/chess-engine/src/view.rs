//! Render-friendly snapshot of a game.

use crate::game::Selection;
use crate::rules::Status;
use crate::Game;
use chess_core::{Color, Piece, Square};
use serde::Serialize;

/// Everything a front end needs to draw the game, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    /// Eight rows from rank 8 down to rank 1, each from file a to h.
    pub rows: [[Option<Piece>; 8]; 8],
    pub side_to_move: Color,
    /// Pieces taken by white, sorted by kind.
    pub captured_by_white: Vec<Piece>,
    /// Pieces taken by black, sorted by kind.
    pub captured_by_black: Vec<Piece>,
    /// The last move as `from→to`, e.g. `e2→e4`.
    pub last_move: Option<String>,
    /// Remaining castling rights, e.g. `W K-side`.
    pub castling: Vec<&'static str>,
    pub selected: Option<Square>,
    /// Legal destinations of the selected piece, ascending.
    pub destinations: Vec<Square>,
    pub pending_promotion: Option<Square>,
    pub status: Status,
}

impl GameView {
    pub fn new(game: &Game) -> Self {
        let board = game.board();
        let mut rows = [[None; 8]; 8];
        for (row, cells) in rows.iter_mut().enumerate() {
            let rank = 7 - row as u8;
            for (file, cell) in cells.iter_mut().enumerate() {
                *cell = Square::from_coords(rank, file as u8).and_then(|sq| board.piece_at(sq));
            }
        }

        let rights = game.castling();
        let castling = [
            (rights.white_kingside, "W K-side"),
            (rights.white_queenside, "W Q-side"),
            (rights.black_kingside, "B K-side"),
            (rights.black_queenside, "B Q-side"),
        ]
        .into_iter()
        .filter_map(|(held, badge)| held.then_some(badge))
        .collect();

        let (selected, destinations) = match game.selection() {
            Selection::Idle => (None, Vec::new()),
            Selection::Selected { from, destinations } => {
                (Some(from), destinations.iter().collect())
            }
        };

        GameView {
            rows,
            side_to_move: game.side_to_move(),
            captured_by_white: game.captured().sorted(Color::White),
            captured_by_black: game.captured().sorted(Color::Black),
            last_move: game.last_move().map(|m| format!("{}→{}", m.from, m.to)),
            castling,
            selected,
            destinations,
            pending_promotion: game.pending_promotion(),
            status: game.status(),
        }
    }

    /// Returns the piece on `square`.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.rows[7 - square.rank_index() as usize][square.file_index() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::PieceKind;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn startpos_view() {
        let view = Game::new().view();
        assert_eq!(
            view.rows[0][0],
            Some(Piece::new(Color::Black, PieceKind::Rook))
        );
        assert_eq!(
            view.rows[7][4],
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(view.rows[4], [None; 8]);
        assert_eq!(view.side_to_move, Color::White);
        assert_eq!(view.last_move, None);
        assert_eq!(
            view.castling,
            vec!["W K-side", "W Q-side", "B K-side", "B Q-side"]
        );
        assert_eq!(view.selected, None);
        assert!(view.destinations.is_empty());
        assert_eq!(view.status, Status::Normal);
    }

    #[test]
    fn view_after_moves() {
        let mut game = Game::new();
        for mv in ["e2e4", "d7d5", "e4d5", "e8d7"] {
            game.play_uci(mv).unwrap();
        }
        game.select_or_move(sq("d1")).unwrap();

        let view = game.view();
        assert_eq!(view.last_move.as_deref(), Some("e8→d7"));
        assert_eq!(
            view.captured_by_white,
            vec![Piece::new(Color::Black, PieceKind::Pawn)]
        );
        assert!(view.captured_by_black.is_empty());
        assert_eq!(view.castling, vec!["W K-side", "W Q-side"]);
        assert_eq!(view.selected, Some(Square::D1));
        assert_eq!(view.destinations.first(), Some(&sq("e2")));
        assert_eq!(
            view.piece_at(sq("d5")),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
    }

    #[test]
    fn view_serializes() {
        let json = serde_json::to_value(Game::new().view()).unwrap();
        assert_eq!(json["side_to_move"], "white");
        assert_eq!(json["status"]["kind"], "normal");
        assert_eq!(json["rows"][0][4]["kind"], "king");
    }
}
