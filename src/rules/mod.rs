// src/rules/mod.rs
//
// The rule pipeline filters/augments a side's pseudo-legal moves,
// left-to-right: ChainKill injects remote captures, CaptureDefense
// removes captures the defender negates, KingSafety removes moves
// that leave the mover's own king in check. Materialized `Vec<Move>`
// rather than lazy iterators throughout, since `KingSafety` needs
// `push_quiet`/`pop_quiet` between stages.

pub mod capture_defense;
pub mod chain_kill;
pub mod king_safety;

pub use capture_defense::CaptureDefense;
pub use chain_kill::ChainKill;
pub use king_safety::KingSafety;

use crate::board::Color;
use crate::game::Game;
use crate::moves::types::Move;

pub trait Rule {
    fn apply(&self, game: &mut Game, color: Color, moves: Vec<Move>) -> Vec<Move>;
}

pub fn pipeline() -> Vec<Box<dyn Rule>> {
    vec![Box::new(ChainKill), Box::new(CaptureDefense), Box::new(KingSafety)]
}
