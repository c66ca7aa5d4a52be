// src/rules/capture_defense.rs

use crate::arcane::{Ability, Element};
use crate::board::Color;
use crate::game::Game;
use crate::moves::abilities::{capture_origin, direction_from_target_to_origin};
use crate::moves::types::Move;
use crate::rules::Rule;

/// Removes captures the defending piece negates: Block Path (if the
/// attack arrives from the piece's chosen blocked direction), Stalwart
/// (defender holds against a weaker attacker), Belligerent (defender
/// fights back against a stronger one). An Air attacker negates all
/// three unless the defender is Earth. Grounded in
/// `original_source/arcane/rules.py::CaptureDefenseRule`.
pub struct CaptureDefense;

impl Rule for CaptureDefense {
    fn apply(&self, game: &mut Game, color: Color, moves: Vec<Move>) -> Vec<Move> {
        let attacker_el = game.config(color).element;
        let defender_el = game.config(color.opponent()).element;
        let air_negates_defense = attacker_el == Element::Air && defender_el != Element::Earth;

        moves
            .into_iter()
            .filter(|mv| {
                let captured_sq = match mv {
                    Move::EnPassant { captured_sq, .. } => *captured_sq,
                    _ => mv.to_sq(),
                };

                let Some(cap) = game.board().piece_at(captured_sq).cloned() else {
                    return true;
                };
                if cap.color == color {
                    return true;
                }
                if air_negates_defense {
                    return true;
                }
                let Some(attacker) = game.board().piece_at(mv.from_sq()).cloned() else {
                    return false;
                };

                if game.has_ability(&cap, Ability::BlockPath) {
                    if let Some(blocked) = cap.meta.block_dir() {
                        let origin = capture_origin(mv);
                        if let Some(d) = direction_from_target_to_origin(captured_sq, origin) {
                            if d == blocked {
                                return false;
                            }
                        }
                    }
                }

                let ar = attacker.kind.rank();
                let dr = cap.kind.rank();
                if game.has_ability(&cap, Ability::Stalwart) && ar < dr {
                    return false;
                }
                if game.has_ability(&cap, Ability::Belligerent) && ar > dr {
                    return false;
                }

                true
            })
            .collect()
    }
}
