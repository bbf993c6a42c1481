//! Core types for chess.
//!
//! This crate provides the fundamental types used across the rules engine:
//! - [`Piece`], [`PieceKind`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`MoveRecord`], [`Special`] and [`Promotion`] for committed moves
//! - FEN parsing and serialization

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{MoveRecord, Promotion, Special};
pub use piece::{Piece, PieceKind};
pub use square::{File, Rank, Square};
