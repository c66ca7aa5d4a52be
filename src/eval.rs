// src/eval.rs
//
// Material-only static evaluator for the CLI demo. Not a search engine:
// no alpha-beta, no move ordering, no transposition table, no opening
// book. Grounded in the teacher's own material table.

use crate::board::Color;
use crate::game::Game;

/// Material balance from White's perspective, summed over every piece
/// still on the board. Positive favors White, negative favors Black.
pub fn evaluate_material(game: &Game) -> i32 {
    game.board()
        .all_pieces()
        .map(|p| {
            let value = p.kind.material_value();
            if p.color == Color::White { value } else { -value }
        })
        .sum()
}
