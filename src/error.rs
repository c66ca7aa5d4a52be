// src/error.rs

use std::fmt;

use crate::board::Color;
use crate::moves::Move;

/// The six error kinds the engine surfaces. "Corrupt board" is not a
/// variant here: per design, an internal invariant violation (missing
/// king, dangling uid, ...) is a bug, not a recoverable error, and is
/// reported via `panic!` at the point of detection (mirroring the base
/// crate's `Board::king_square`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The submitted move is not a member of `legal_moves(side_to_move)`.
    IllegalMove { mover_color: Color },
    /// Decode-time failure: bad kind tag, missing field, unknown promotion type.
    MalformedMove(String),
    /// `pop`/`pop_quiet` on an empty stack.
    EmptyUndo,
    /// Army construction failed `PlayerConfig::validate`.
    InvalidConfiguration(String),
    /// The `DecisionProvider` needs external input; the caller must pop
    /// back to the pre-apply depth and retry with the decision supplied.
    NeedDecision(NeedDecision),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeedDecision {
    BlockPathDirection,
    DoubleKillTarget,
    NecromancerResurrect,
    RedoReplay { forbidden: Box<Move> },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::IllegalMove { mover_color } => {
                write!(f, "move is not legal for {mover_color:?} in the current position")
            }
            EngineError::MalformedMove(reason) => write!(f, "malformed move record: {reason}"),
            EngineError::EmptyUndo => write!(f, "pop called with an empty undo stack"),
            EngineError::InvalidConfiguration(reason) => {
                write!(f, "invalid army configuration: {reason}")
            }
            EngineError::NeedDecision(kind) => write!(f, "decision required: {kind:?}"),
        }
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
