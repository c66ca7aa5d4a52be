// src/rules/chain_kill.rs

use crate::arcane::{Ability, Element};
use crate::board::Color;
use crate::game::Game;
use crate::moves::abilities::virtual_capture_targets;
use crate::moves::types::Move;
use crate::rules::Rule;

/// Injects `RemoteCapture` options for every piece holding Chain Kill:
/// for each adjacent allied square, recompute that piece's native
/// capture geometry as if it stood there. Grounded in
/// `original_source/arcane/rules.py::ChainKillRule`.
pub struct ChainKill;

impl Rule for ChainKill {
    fn apply(&self, game: &mut Game, color: Color, moves: Vec<Move>) -> Vec<Move> {
        let mut out = moves;

        let attacker_el = game.config(color).element;
        let defender_el = game.config(color.opponent()).element;

        // Earth nullifies remote offensive capture unless the attacker is Fire.
        if defender_el == Element::Earth && attacker_el != Element::Fire {
            return out;
        }
        // Fire's offensive abilities are ineffective against Water armies.
        if attacker_el == Element::Fire && defender_el == Element::Water {
            return out;
        }

        let chain_killers: Vec<_> = game
            .board()
            .pieces_of(color)
            .filter(|p| game.has_ability(p, Ability::ChainKill))
            .cloned()
            .collect();

        for piece in chain_killers {
            for ally_sq in piece.pos.adjacent_squares() {
                let Some(ally) = game.board().piece_at(ally_sq) else {
                    continue;
                };
                if ally.color != color {
                    continue;
                }
                for target in virtual_capture_targets(&piece, ally_sq, game) {
                    out.push(Move::RemoteCapture {
                        from: piece.pos,
                        to: target,
                        origin_sq: ally_sq,
                    });
                }
            }
        }
        out
    }
}
