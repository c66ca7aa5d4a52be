// src/moves/movegen.rs

use crate::board::Color;
use crate::game::Game;
use crate::moves::abilities::generate_moves;
use crate::moves::types::Move;

/// Pseudo-legal moves for every `color`-piece on the board, base chess
/// geometry only. `ChainKill`'s remote captures and the `CaptureDefense`/
/// `KingSafety` filters are applied afterward by the rule pipeline
/// (`Game::legal_moves`).
pub fn pseudo_legal_moves(game: &Game, color: Color) -> Vec<Move> {
    game.board().pieces_of(color).flat_map(|p| generate_moves(p, game)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_twenty_pseudo_legal_moves_per_side() {
        let game = Game::new_chess_only();
        assert_eq!(pseudo_legal_moves(&game, Color::White).len(), 20);
        assert_eq!(pseudo_legal_moves(&game, Color::Black).len(), 20);
    }
}
