//! Text rendering of a game view.

use chess_core::{Piece, Square};
use chess_engine::{GameView, Status};
use std::fmt;

/// Draws the board and the info panel.
///
/// The selected square is bracketed, empty destinations show `*` and
/// capturable pieces are wrapped in parentheses. `flipped` puts black at the
/// bottom.
pub struct Screen<'a> {
    pub view: &'a GameView,
    pub flipped: bool,
    pub message: Option<&'a str>,
}

pub fn render(view: &GameView, flipped: bool, message: Option<&str>) -> String {
    Screen {
        view,
        flipped,
        message,
    }
    .to_string()
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.view;
        let files: Vec<u8> = if self.flipped {
            (0..8).rev().collect()
        } else {
            (0..8).collect()
        };
        let ranks: Vec<u8> = if self.flipped {
            (0..8).collect()
        } else {
            (0..8).rev().collect()
        };

        let header: String = files
            .iter()
            .map(|&file| format!(" {} ", (b'a' + file) as char))
            .collect();
        writeln!(f, "  {}", header)?;

        for &rank in &ranks {
            write!(f, "{} ", rank + 1)?;
            for &file in &files {
                if let Some(square) = Square::from_coords(rank, file) {
                    f.write_str(&cell(view, square))?;
                }
            }
            writeln!(f, " {}", rank + 1)?;
        }
        writeln!(f, "  {}", header)?;
        writeln!(f)?;

        write!(f, "Turn: {}", view.side_to_move)?;
        if view.status != Status::Normal {
            write!(f, " | {}", view.status)?;
        }
        writeln!(f)?;
        if view.status.is_game_over() {
            writeln!(f, "Game over. Reset to play again.")?;
        }

        if let Some(square) = view.pending_promotion {
            writeln!(f, "Promote on {}: q, r, b or n", square)?;
        }
        if let Some(message) = self.message.filter(|m| !m.is_empty()) {
            writeln!(f, "{}", message)?;
        }

        writeln!(
            f,
            "Last move: {}",
            view.last_move.as_deref().unwrap_or("-")
        )?;
        if view.castling.is_empty() {
            writeln!(f, "Castling: -")?;
        } else {
            writeln!(f, "Castling: {}", view.castling.join(", "))?;
        }
        writeln!(f, "Captured by White: {}", glyphs(&view.captured_by_white))?;
        writeln!(f, "Captured by Black: {}", glyphs(&view.captured_by_black))
    }
}

fn cell(view: &GameView, square: Square) -> String {
    let piece = view.piece_at(square);
    let glyph = piece.map_or('·', Piece::glyph);

    if view.selected == Some(square) {
        format!("[{}]", glyph)
    } else if view.destinations.contains(&square) {
        match piece {
            Some(_) => format!("({})", glyph),
            None => " * ".to_string(),
        }
    } else {
        format!(" {} ", glyph)
    }
}

fn glyphs(pieces: &[Piece]) -> String {
    if pieces.is_empty() {
        return "-".to_string();
    }
    pieces.iter().map(|p| p.glyph()).collect()
}
