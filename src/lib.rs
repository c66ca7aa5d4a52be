pub mod arcane;
pub mod board;
pub mod error;
#[cfg(feature = "cli")]
pub mod eval;
pub mod fen;
pub mod game;
pub mod hash;
#[cfg(feature = "cli")]
pub mod logger;
pub mod moves;
pub mod rules;
pub mod snapshot;
pub mod square;

pub use error::{EngineError, EngineResult, NeedDecision};
pub use game::Game;
