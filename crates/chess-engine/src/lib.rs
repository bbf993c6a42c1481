//! Chess rules engine.
//!
//! This crate provides:
//! - [`Board`] - the 8×8 grid of optional pieces
//! - [`SquareSet`] - a set of squares, returned by attack and move queries
//! - [`Position`] - board, side to move, castling rights and last move
//! - [`Game`] - the click-driven state machine with promotion and undo
//! - Attack, move generation and legality queries in [`movegen`]
//! - Check, checkmate and stalemate detection in [`rules`]
//!
//! # Architecture
//!
//! Moves are generated per square. The pseudo-legal generator follows each
//! piece's movement pattern; the legality filter plays every candidate out on
//! a scratch copy of the board and drops those that leave the mover's king
//! attacked. [`movegen::make_move`] is the single path that applies a move to
//! a board, so the filter, the game and perft all agree on what a move does.
//!
//! # Example
//!
//! ```
//! use chess_core::{Color, Square};
//! use chess_engine::{Game, Status};
//!
//! let mut game = Game::new();
//! let e2 = Square::from_algebraic("e2").unwrap();
//! println!("e2 can reach {} squares", game.legal_destinations(e2).len());
//!
//! for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
//!     game.play_uci(mv).unwrap();
//! }
//! assert_eq!(game.status(), Status::Checkmate { winner: Color::Black });
//! ```

mod board;
mod game;
pub mod movegen;
mod position;
pub mod rules;
mod square_set;
mod view;

pub use board::{Board, CastlingRights};
pub use game::{CapturedPieces, Game, GameError, Notice, PendingPromotion, Selection};
pub use movegen::{
    has_any_legal_move, is_attacked, legal_moves, make_move, pseudo_moves, squares_attacked_by,
};
pub use position::Position;
pub use rules::{is_in_check, Status};
pub use square_set::SquareSet;
pub use view::GameView;
