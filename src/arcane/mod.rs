// src/arcane/mod.rs

pub mod decision;
pub mod resolution;
pub mod state;

pub use decision::{DecisionProvider, DefaultDecisions};
pub use resolution::{ArcaneUndoable, RedoPending, ResolutionSystem, UndoExtras};
pub use state::{Ability, AbilityScope, ArcaneState, Element, Item, Loadout, PlayerConfig, SolarTarget, SOLAR_MAX_USES};
