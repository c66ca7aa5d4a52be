// src/arcane/state.rs

use std::collections::{HashMap, HashSet};

use crate::board::{Color, PieceKind, Uid};
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Element {
    Earth,
    Fire,
    Water,
    Air,
    Lightning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Item {
    Multitasker,
    PoisonedDagger,
    DualGloves,
    TripleGloves,
    HeadmasterRing,
    Pot,
    Solar,
}

impl Item {
    pub fn slot_cost(self) -> u32 {
        match self {
            Item::Multitasker => 1,
            Item::PoisonedDagger => 1,
            Item::DualGloves => 1,
            Item::TripleGloves => 2,
            Item::HeadmasterRing => 3,
            Item::Pot => 1,
            Item::Solar => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Ability {
    ChainKill,
    BlockPath,
    Stalwart,
    Belligerent,
    Redo,
    DoubleKill,
    QuantumKill,
    Necromancer,
}

/// Abilities attach army-wide or to a single piece type; the latter
/// requires Lightning or Multitasker (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AbilityScope {
    Army,
    PieceType(PieceKind),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Loadout {
    pub abilities: Vec<(Ability, AbilityScope)>,
}

impl Loadout {
    pub fn has(&self, ability: Ability, kind: PieceKind) -> bool {
        self.abilities.iter().any(|(a, scope)| {
            *a == ability
                && match scope {
                    AbilityScope::Army => true,
                    AbilityScope::PieceType(k) => *k == kind,
                }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerConfig {
    pub element: Element,
    pub items: HashSet<Item>,
    pub loadout: Loadout,
}

impl PlayerConfig {
    /// 1 + bonus from gloves/ring: Dual +1, Triple +2, Headmaster Ring +3.
    pub fn ability_slot_count(&self) -> u32 {
        let bonus = if self.items.contains(&Item::TripleGloves) {
            2
        } else if self.items.contains(&Item::HeadmasterRing) {
            3
        } else if self.items.contains(&Item::DualGloves) {
            1
        } else {
            0
        };
        1 + bonus
    }

    pub fn validate(&self) -> EngineResult<()> {
        let cost: u32 = self.items.iter().map(|i| i.slot_cost()).sum();
        if cost > 4 {
            return Err(EngineError::InvalidConfiguration(format!(
                "item slot cost {cost} exceeds the budget of 4"
            )));
        }

        let triple = self.items.contains(&Item::TripleGloves);
        let dual = self.items.contains(&Item::DualGloves);
        let headmaster = self.items.contains(&Item::HeadmasterRing);
        if triple && (dual || headmaster) {
            return Err(EngineError::InvalidConfiguration(
                "Triple Gloves cannot be combined with Dual Gloves or the Headmaster Ring".into(),
            ));
        }
        if headmaster && (dual || triple) {
            return Err(EngineError::InvalidConfiguration(
                "the Headmaster Ring cannot be combined with Dual or Triple Gloves".into(),
            ));
        }

        if self.items.contains(&Item::Multitasker) && self.element == Element::Lightning {
            return Err(EngineError::InvalidConfiguration(
                "Multitasker cannot be equipped by a Lightning army".into(),
            ));
        }

        if self.loadout.abilities.len() as u32 > self.ability_slot_count() {
            return Err(EngineError::InvalidConfiguration(format!(
                "{} abilities slotted but only {} ability slots available",
                self.loadout.abilities.len(),
                self.ability_slot_count()
            )));
        }

        let piece_targeting_allowed = self.element == Element::Lightning || self.items.contains(&Item::Multitasker);
        for (ability, scope) in &self.loadout.abilities {
            if matches!(scope, AbilityScope::PieceType(_)) && !piece_targeting_allowed {
                return Err(EngineError::InvalidConfiguration(format!(
                    "{ability:?} is piece-type-targeted but the army has neither Lightning nor Multitasker"
                )));
            }
        }

        Ok(())
    }
}

pub const SOLAR_MAX_USES: u32 = 3;

/// Resource pools that evolve over the life of a game. `redo_max`,
/// `necro_max`/`necro_bonus`, and `solar_uses` are monotonic and
/// deliberately excluded from `Undo` snapshots (§3, §8).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ArcaneState {
    pub redo_charges: HashMap<Uid, u32>,
    pub redo_max: HashMap<Uid, u32>,
    pub necro_pool: HashMap<Color, u32>,
    pub necro_max: HashMap<Color, u32>,
    pub necro_bonus: HashMap<Color, u32>,
    pub solar_uses: HashMap<Color, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolarTarget {
    NecromancerPool(Color),
    RedoCharge(Uid),
}

fn resource_multiplier(side_element: Element, opponent_element: Element) -> u32 {
    if side_element == Element::Water && opponent_element != Element::Lightning {
        2
    } else {
        1
    }
}

impl ArcaneState {
    /// Resource bootstrapping at game start (§4.7): Solar uses, the
    /// Necromancer pool per color, and Redo charges for every piece
    /// whose loadout grants it Redo.
    pub fn bootstrap(
        white_cfg: &PlayerConfig,
        black_cfg: &PlayerConfig,
        redo_holders: impl IntoIterator<Item = (Uid, Color, PieceKind)>,
    ) -> Self {
        let mut state = ArcaneState::default();
        for (cfg, color, opponent_el) in [
            (white_cfg, Color::White, black_cfg.element),
            (black_cfg, Color::Black, white_cfg.element),
        ] {
            let solar = if cfg.items.contains(&Item::Solar) { SOLAR_MAX_USES } else { 0 };
            state.solar_uses.insert(color, solar);

            let has_necro = cfg.loadout.abilities.iter().any(|(a, _)| *a == Ability::Necromancer);
            let base = if has_necro { resource_multiplier(cfg.element, opponent_el) } else { 0 };
            state.necro_pool.insert(color, base);
            state.necro_max.insert(color, base);
            state.necro_bonus.insert(color, 0);
        }

        for (uid, color, kind) in redo_holders {
            let (cfg, opponent_el) = if color == Color::White {
                (white_cfg, black_cfg.element)
            } else {
                (black_cfg, white_cfg.element)
            };
            if !cfg.loadout.has(Ability::Redo, kind) {
                continue;
            }
            let mult = resource_multiplier(cfg.element, opponent_el);
            state.redo_max.insert(uid, mult);
            state.redo_charges.insert(uid, mult);
        }
        state
    }

    pub fn spend_solar(&mut self, color: Color, target: SolarTarget) -> EngineResult<()> {
        let uses = self.solar_uses.entry(color).or_insert(0);
        if *uses == 0 {
            return Err(EngineError::InvalidConfiguration(format!("{color:?} has no remaining Solar uses")));
        }
        *uses -= 1;
        match target {
            SolarTarget::NecromancerPool(c) => {
                *self.necro_bonus.entry(c).or_insert(0) += 1;
                *self.necro_max.entry(c).or_insert(0) += 1;
                *self.necro_pool.entry(c).or_insert(0) += 1;
            }
            SolarTarget::RedoCharge(uid) => {
                *self.redo_max.entry(uid).or_insert(0) += 1;
                *self.redo_charges.entry(uid).or_insert(0) += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(element: Element, items: &[Item]) -> PlayerConfig {
        PlayerConfig {
            element,
            items: items.iter().copied().collect(),
            loadout: Loadout::default(),
        }
    }

    #[test]
    fn triple_gloves_excludes_dual_and_headmaster() {
        let cfg = config(Element::Earth, &[Item::TripleGloves, Item::DualGloves]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn multitasker_excludes_lightning() {
        let cfg = config(Element::Lightning, &[Item::Multitasker]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn piece_targeted_ability_requires_lightning_or_multitasker() {
        let mut cfg = config(Element::Earth, &[]);
        cfg.loadout.abilities.push((Ability::Redo, AbilityScope::PieceType(PieceKind::Pawn)));
        assert!(cfg.validate().is_err());
        cfg.items.insert(Item::Multitasker);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn solar_topup_is_monotonic_and_exhaustible() {
        let mut state = ArcaneState::default();
        state.solar_uses.insert(Color::White, 1);
        state.spend_solar(Color::White, SolarTarget::NecromancerPool(Color::White)).unwrap();
        assert_eq!(state.solar_uses[&Color::White], 0);
        assert!(state.spend_solar(Color::White, SolarTarget::NecromancerPool(Color::White)).is_err());
    }
}
