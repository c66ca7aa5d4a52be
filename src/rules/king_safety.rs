// src/rules/king_safety.rs

use crate::board::Color;
use crate::game::Game;
use crate::moves::types::Move;
use crate::rules::Rule;

/// Drops any move that would leave the mover's own king in check.
/// Probes with `push_quiet`/`pop_quiet` so no resolution cascade or
/// hash update fires for the trial application. Grounded in
/// `original_source/core/rules.py::KingSafetyRule`.
pub struct KingSafety;

impl Rule for KingSafety {
    fn apply(&self, game: &mut Game, color: Color, moves: Vec<Move>) -> Vec<Move> {
        moves
            .into_iter()
            .filter(|mv| {
                game.push_quiet(mv.clone()).expect("a candidate from the generator is always structurally applicable");
                let leaves_king_in_check = game.in_check(color);
                game.pop_quiet().expect("the quiet push just above guarantees a matching pop");
                !leaves_king_in_check
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color as C, PieceKind};
    use crate::game::Game;

    #[test]
    fn pinned_piece_cannot_move_off_the_pin_line() {
        let mut game = Game::new_chess_only();
        for sq in ["a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1", "a2", "b2", "c2", "d2", "f2", "g2", "h2"] {
            game.board_mut().remove(sq.parse().unwrap());
        }
        for sq in ["a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8", "a7", "b7", "c7", "d7", "f7", "g7", "h7"] {
            game.board_mut().remove(sq.parse().unwrap());
        }
        game.board_mut().spawn(C::White, PieceKind::King, "e1".parse().unwrap());
        game.board_mut().spawn(C::White, PieceKind::Pawn, "e2".parse().unwrap());
        game.board_mut().spawn(C::Black, PieceKind::King, "e8".parse().unwrap());
        game.board_mut().spawn(C::Black, PieceKind::Rook, "e7".parse().unwrap());

        let legal = game.legal_moves(C::White);
        assert!(legal.iter().all(|m| m.from_sq() != "e2".parse().unwrap() || m.to_sq() == "e3".parse().unwrap() || m.to_sq() == "e4".parse().unwrap()));
    }
}
