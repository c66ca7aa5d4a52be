// src/arcane/decision.rs

use crate::board::{CardinalDir, Piece, Uid};
use crate::error::NeedDecision;
use crate::moves::Move;

/// External input the Resolution System solicits at four fixed points.
/// Grounded in `original_source/arcane/decisions.py`'s `DecisionProvider`
/// Protocol; an interactive implementation answers by returning
/// `Err(NeedDecision)` instead of a value, which `Game::push` catches,
/// rewinding all effects applied so far back to the pre-apply depth and
/// surfacing `EngineError::NeedDecision` to the caller (§5, §7). The
/// host then re-`push`es once the user has supplied the missing answer.
pub trait DecisionProvider {
    fn choose_block_path_dir(&mut self, piece: &Piece) -> Result<CardinalDir, NeedDecision>;

    /// `candidates` are uids of pieces eligible for Double Kill; never empty.
    fn choose_double_kill_target(&mut self, candidates: &[Uid]) -> Result<Uid, NeedDecision>;

    /// `candidates` are uids of graveyard pieces eligible for resurrection.
    fn choose_necromancer_resurrect(&mut self, candidates: &[Uid]) -> Result<Uid, NeedDecision>;

    /// `candidates` are legal moves for the defending side; `forbidden` is
    /// the move Redo is erasing. The provider picks the replacement ply.
    fn choose_redo_replay(&mut self, candidates: &[Move], forbidden: &Move) -> Result<Move, NeedDecision>;
}

/// Deterministic defaults: first option everywhere, first legal move
/// structurally unequal to `forbidden` for the Redo replay. Never signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDecisions;

impl DecisionProvider for DefaultDecisions {
    fn choose_block_path_dir(&mut self, _piece: &Piece) -> Result<CardinalDir, NeedDecision> {
        Ok(CardinalDir::North)
    }

    fn choose_double_kill_target(&mut self, candidates: &[Uid]) -> Result<Uid, NeedDecision> {
        Ok(candidates[0])
    }

    fn choose_necromancer_resurrect(&mut self, candidates: &[Uid]) -> Result<Uid, NeedDecision> {
        Ok(candidates[0])
    }

    fn choose_redo_replay(&mut self, candidates: &[Move], forbidden: &Move) -> Result<Move, NeedDecision> {
        Ok(candidates
            .iter()
            .find(|m| !m.structurally_equal(forbidden))
            .cloned()
            .unwrap_or_else(|| candidates[0].clone()))
    }
}
