//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.
//! Moves are applied through [`Position::play`], the same path the game
//! commits through.

use crate::Position;
use chess_core::{Promotion, Square};

/// A move as perft walks it: a pawn reaching the last rank fans out into
/// one move per promotion choice.
fn expanded_moves(position: &Position) -> Vec<(Square, Square, Option<Promotion>)> {
    let mut moves = Vec::new();
    for (from, to) in position.legal_moves() {
        if position.is_promotion(from, to) {
            moves.extend(Promotion::ALL.iter().map(|&p| (from, to, Some(p))));
        } else {
            moves.push((from, to, None));
        }
    }
    moves
}

/// Counts the number of leaf nodes at the given depth.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = expanded_moves(position);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for (from, to, promotion) in moves {
        let mut next = *position;
        if next.play(from, to, promotion).is_some() {
            nodes += perft(&next, depth - 1);
        }
    }
    nodes
}

/// Perft with divide - shows node count for each move at depth-1.
/// Useful for debugging to identify which moves have incorrect counts.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(String, u64)> {
    let mut results = Vec::new();

    for (from, to, promotion) in expanded_moves(position) {
        let mut next = *position;
        let Some(record) = next.play(from, to, promotion) else {
            continue;
        };
        let nodes = if depth > 1 {
            perft(&next, depth - 1)
        } else {
            1
        };
        results.push((record.to_coordinate(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 0 1";

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    // Starting position perft values (well-known and verified)
    #[test]
    fn perft_startpos_depth_1() {
        assert_eq!(perft(&Position::startpos(), 1), 20);
    }

    #[test]
    fn perft_startpos_depth_2() {
        assert_eq!(perft(&Position::startpos(), 2), 400);
    }

    #[test]
    fn perft_startpos_depth_3() {
        assert_eq!(perft(&Position::startpos(), 3), 8902);
    }

    // The mailbox generator is slow in debug builds.
    #[test]
    #[ignore]
    fn perft_startpos_depth_4() {
        assert_eq!(perft(&Position::startpos(), 4), 197281);
    }

    // Kiwipete - a position with lots of special moves
    #[test]
    fn perft_kiwipete_depth_1() {
        assert_eq!(perft(&position(KIWIPETE), 1), 48);
    }

    #[test]
    fn perft_kiwipete_depth_2() {
        assert_eq!(perft(&position(KIWIPETE), 2), 2039);
    }

    #[test]
    #[ignore]
    fn perft_kiwipete_depth_3() {
        assert_eq!(perft(&position(KIWIPETE), 3), 97862);
    }

    // Position 3: Check evasion, en passant, promotion
    #[test]
    fn perft_position3_depth_1() {
        assert_eq!(perft(&position(POSITION_3), 1), 14);
    }

    #[test]
    fn perft_position3_depth_2() {
        assert_eq!(perft(&position(POSITION_3), 2), 191);
    }

    #[test]
    fn perft_position3_depth_3() {
        assert_eq!(perft(&position(POSITION_3), 3), 2812);
    }

    // Position 4: Lots of promotions and captures
    #[test]
    fn perft_position4_depth_1() {
        assert_eq!(perft(&position(POSITION_4), 1), 6);
    }

    #[test]
    fn perft_position4_depth_2() {
        assert_eq!(perft(&position(POSITION_4), 2), 264);
    }

    #[test]
    fn perft_position4_depth_3() {
        assert_eq!(perft(&position(POSITION_4), 3), 9467);
    }

    #[test]
    fn perft_position5_depth_1() {
        assert_eq!(perft(&position(POSITION_5), 1), 44);
    }

    #[test]
    fn perft_position5_depth_2() {
        assert_eq!(perft(&position(POSITION_5), 2), 1486);
    }

    #[test]
    fn perft_position5_depth_3() {
        assert_eq!(perft(&position(POSITION_5), 3), 62379);
    }

    #[test]
    fn perft_divide_works() {
        let results = perft_divide(&Position::startpos(), 1);
        assert_eq!(results.len(), 20);
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 20);
        assert_eq!(results[0].0, "a2a3");
    }

    #[test]
    fn perft_divide_lists_each_promotion() {
        let results = perft_divide(&position("8/P7/8/8/8/8/8/k6K w - - 0 1"), 1);
        let names: Vec<&str> = results.iter().map(|(m, _)| m.as_str()).collect();
        for promo in ["a7a8b", "a7a8n", "a7a8q", "a7a8r"] {
            assert!(names.contains(&promo), "missing {}", promo);
        }
    }
}
