// src/arcane/resolution.rs
//
// The `MoveApplied` handler: a fixed ordered case-analysis over a
// capture's arcane consequences. Grounded in `original_source/arcane/system.py`.

use std::collections::HashMap;

use crate::arcane::decision::DecisionProvider;
use crate::arcane::state::{Ability, Element, Item};
use crate::board::{Color, Piece, PieceKind, Uid};
use crate::error::NeedDecision;
use crate::game::Game;
use crate::moves::types::{Move, ReversalEntry};
use crate::square::Square;

/// One-shot pre-resolution snapshot of arcane state, stored in an
/// `Undo`'s `extras` so `pop` can restore it without touching the
/// monotonic bonuses layered on top (§3, §9). `necro_pool_base`/
/// `necro_max_base` are the pool/max values with `necro_bonus` already
/// subtracted out; restoring recomposes `base + <bonus at restore
/// time>`, so a Solar top-up applied between this snapshot and the
/// matching `pop` survives the rewind instead of being reverted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArcaneUndoable {
    pub necro_pool_base: HashMap<Color, u32>,
    pub necro_max_base: HashMap<Color, u32>,
    pub graveyard: HashMap<Color, Vec<(Piece, Square)>>,
}

/// Pending Redo rewind bookkeeping, recorded before the rewind so undo
/// can report what happened even though the rewound plies have their
/// own independent `Undo` records.
#[derive(Debug, Clone, PartialEq)]
pub struct RedoPending {
    pub defender_uid: Uid,
    pub forbidden: Move,
    pub rewind_plies: u8,
}

/// The opaque bag the arcane subsystem attaches to every `Undo`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UndoExtras {
    pub arcane_undoable: Option<ArcaneUndoable>,
    pub redo_pending: Option<RedoPending>,
}

/// Stateless; all resolution state lives on `Game`/`ArcaneState`. Kept
/// as a unit struct (rather than free functions) so `Game` can hold it
/// as a named listener field alongside the optional `PositionTracker`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolutionSystem;

fn air_negates(attacker_el: Element, defender_el: Element) -> bool {
    attacker_el == Element::Air && defender_el != Element::Earth
}

impl ResolutionSystem {
    /// `mover` is the pre-move actor (the pawn for Promotion, the
    /// non-moving attacker for RemoteCapture); `captured` is the primary
    /// victim `Move::apply` already removed from the board, if any.
    ///
    /// Returns `Err(NeedDecision)` if the `DecisionProvider` declined to
    /// answer synchronously at one of the four solicitation points; the
    /// caller (`Game::push`) is responsible for rewinding to its
    /// pre-apply depth in that case (§5, §7).
    pub fn on_move_applied(
        &self,
        game: &mut Game,
        mv: &Move,
        mover: &Piece,
        captured: Option<&Piece>,
    ) -> Result<(), NeedDecision> {
        let post_capturer_sq = match mv {
            Move::RemoteCapture { from, .. } => *from,
            _ => mv.to_sq(),
        };

        if let Some(post_capturer) = game.board().piece_at(post_capturer_sq).cloned() {
            if game.has_ability(&post_capturer, Ability::BlockPath) {
                let prior_meta = post_capturer.meta.clone();
                let dir = game.decisions_mut().choose_block_path_dir(&post_capturer)?;
                game.top_undo_mut().meta_snapshots.push((post_capturer.uid, prior_meta));
                if let Some(p) = game.board_mut().piece_at_mut(post_capturer_sq) {
                    p.meta.set_block_dir(dir);
                }
                tracing::debug!(uid = post_capturer.uid, ?dir, "block_path direction selected");
            }
        }

        let Some(captured) = captured else { return Ok(()) };

        let captured_sq = match mv {
            Move::EnPassant { captured_sq, .. } => *captured_sq,
            Move::RemoteCapture { to, .. } => *to,
            _ => mv.to_sq(),
        };

        tracing::debug!(mover = mover.uid, captured = captured.uid, %captured_sq, "resolving capture");
        snapshot_arcane_undoable(game);
        game.graveyard_mut(captured.color).push((captured.clone(), captured_sq));

        let attacker_el = game.config(mover.color).element;
        let defender_el = game.config(captured.color).element;

        if self.try_redo(game, mover, captured, attacker_el, defender_el)? {
            return Ok(());
        }

        let fire_vs_water_noop = attacker_el == Element::Fire && defender_el == Element::Water;
        if attacker_el == Element::Fire {
            run_offensive_triggers(game, mover, captured, captured_sq, fire_vs_water_noop)?;
            run_poisoned_dagger(game, mover, captured, post_capturer_sq);
        } else {
            let dagger_fired = run_poisoned_dagger(game, mover, captured, post_capturer_sq);
            let capturer_present = !dagger_fired || game.board().piece_at(post_capturer_sq).is_some();
            if capturer_present {
                run_offensive_triggers(game, mover, captured, captured_sq, fire_vs_water_noop)?;
            }
        }
        Ok(())
    }

    fn try_redo(
        &self,
        game: &mut Game,
        mover: &Piece,
        captured: &Piece,
        attacker_el: Element,
        defender_el: Element,
    ) -> Result<bool, NeedDecision> {
        if air_negates(attacker_el, defender_el) {
            return Ok(false);
        }
        if !game.has_ability(captured, Ability::Redo) {
            return Ok(false);
        }
        let charges = game.arcane().redo_charges.get(&captured.uid).copied().unwrap_or(0);
        let depth = game.stack_len();
        if charges == 0 || depth < 2 {
            return Ok(false);
        }

        let rewind_plies: u8 = if depth >= 4 { 4 } else { 2 };
        let forbidden = game.nth_move_from_top(rewind_plies as usize).clone();

        if let Some(v) = game.arcane_mut().redo_charges.get_mut(&captured.uid) {
            *v = v.saturating_sub(1);
        }
        game.top_undo_mut().extras.redo_pending = Some(RedoPending {
            defender_uid: captured.uid,
            forbidden: forbidden.clone(),
            rewind_plies,
        });

        tracing::debug!(defender = captured.uid, rewind_plies, "redo rewind triggered");
        for _ in 0..rewind_plies {
            game.pop().expect("redo rewind: stack depth already checked");
        }

        let defender_color = captured.color;
        let legal = game.legal_moves(defender_color);
        let candidates: Vec<Move> = legal.into_iter().filter(|m| !m.structurally_equal(&forbidden)).collect();
        let pool = if candidates.is_empty() { vec![forbidden.clone()] } else { candidates };
        let replay = game.decisions_mut().choose_redo_replay(&pool, &forbidden)?;
        match game.push(replay) {
            Ok(()) => Ok(true),
            Err(crate::error::EngineError::NeedDecision(nd)) => Err(nd),
            Err(e) => panic!("redo replay push failed unexpectedly: {e:?}"),
        }
    }
}

fn snapshot_arcane_undoable(game: &mut Game) {
    let base = |pool: &HashMap<Color, u32>, color: Color| {
        let bonus = game.arcane().necro_bonus.get(&color).copied().unwrap_or(0);
        pool.get(&color).copied().unwrap_or(0).saturating_sub(bonus)
    };
    let necro_pool_base = [Color::White, Color::Black]
        .into_iter()
        .map(|c| (c, base(&game.arcane().necro_pool, c)))
        .collect();
    let necro_max_base = [Color::White, Color::Black]
        .into_iter()
        .map(|c| (c, base(&game.arcane().necro_max, c)))
        .collect();
    let snapshot = ArcaneUndoable {
        necro_pool_base,
        necro_max_base,
        graveyard: [
            (Color::White, game.graveyard(Color::White).to_vec()),
            (Color::Black, game.graveyard(Color::Black).to_vec()),
        ]
        .into_iter()
        .collect(),
    };
    game.top_undo_mut().extras.arcane_undoable = Some(snapshot);
}

/// Removes `post_capturer` if the defender holds Poisoned Dagger and
/// `rank(mover) <= rank(captured)`. Returns whether it fired.
fn run_poisoned_dagger(game: &mut Game, mover: &Piece, captured: &Piece, post_capturer_sq: Square) -> bool {
    if !game.config(captured.color).items.contains(&Item::PoisonedDagger) {
        return false;
    }
    if mover.kind.rank() > captured.kind.rank() {
        return false;
    }
    let Some(pc) = game.board().piece_at(post_capturer_sq).cloned() else {
        return false;
    };
    game.board_mut().remove(post_capturer_sq);
    bury(game, pc, post_capturer_sq);
    tracing::debug!(victim = post_capturer_sq.to_string(), "poisoned dagger fired");
    true
}

fn run_offensive_triggers(
    game: &mut Game,
    mover: &Piece,
    captured: &Piece,
    captured_sq: Square,
    fire_vs_water_noop: bool,
) -> Result<(), NeedDecision> {
    if fire_vs_water_noop {
        return Ok(());
    }
    let attacker_el = game.config(mover.color).element;
    let defender_el = game.config(captured.color).element;
    if attacker_el == Element::Lightning && defender_el == Element::Air && game.draw_bool(0.5) {
        tracing::debug!("offensive triggers misfired");
        return Ok(());
    }

    if game.has_ability(mover, Ability::DoubleKill) {
        let candidates: Vec<Uid> = captured_sq
            .adjacent_squares()
            .filter_map(|sq| game.board().piece_at(sq).cloned())
            .filter(|p| p.color != mover.color && p.kind.rank() <= mover.kind.rank())
            .map(|p| p.uid)
            .collect();
        if !candidates.is_empty() {
            let chosen = game.decisions_mut().choose_double_kill_target(&candidates)?;
            remove_by_uid(game, chosen);
        }
    }

    if game.has_ability(mover, Ability::QuantumKill) {
        let candidates: Vec<Uid> = game
            .board()
            .all_pieces()
            .filter(|p| p.color != mover.color && p.kind.rank() <= mover.kind.rank())
            .map(|p| p.uid)
            .collect();
        if !candidates.is_empty() {
            let idx = game.draw_uniform_index(candidates.len());
            remove_by_uid(game, candidates[idx]);
        }
    }

    if game.has_ability(mover, Ability::Necromancer)
        && captured.kind.rank() > mover.kind.rank()
        && game.arcane().necro_pool.get(&mover.color).copied().unwrap_or(0) > 0
    {
        let candidates: Vec<Uid> = game
            .graveyard(mover.color)
            .iter()
            .filter(|(p, sq)| p.kind != PieceKind::King && game.board().is_empty(*sq))
            .map(|(p, _)| p.uid)
            .collect();
        if !candidates.is_empty() {
            let chosen = game.decisions_mut().choose_necromancer_resurrect(&candidates)?;
            resurrect(game, mover.color, chosen);
        }
    }
    Ok(())
}

/// Records a piece's removal (Poisoned Dagger firing on the
/// post-capturer, or Double/Quantum Kill) in whichever reversal class
/// keeps undo from double-restoring it. A piece already in `added`
/// (a promotion that was just materialized) is dropped from `added`
/// outright rather than logged as captured (§4.4 step 6). A piece
/// already in `changed` (a Normal/EnPassant mover, or a RemoteCapture
/// attacker, that the move itself relocated) has that entry's
/// pre-move snapshot moved into `captured` instead of appending a new
/// one, so `unapply` restores it to its pre-move square exactly once
/// rather than placing it at its current square and then separately
/// trying to take it by uid out of a board position it no longer
/// occupies.
fn bury(game: &mut Game, piece: Piece, at: Square) {
    let undo = game.top_undo_mut();
    if let Some(idx) = undo.added.iter().position(|p| p.uid == piece.uid) {
        undo.added.remove(idx);
    } else if let Some(idx) = undo.changed.iter().position(|e| e.piece.uid == piece.uid) {
        let entry = undo.changed.remove(idx);
        undo.captured.push(entry);
    } else {
        undo.captured.push(ReversalEntry {
            piece: piece.clone(),
            prior_pos: piece.pos,
            prior_has_moved: piece.has_moved,
        });
    }
    game.graveyard_mut(piece.color).push((piece, at));
}

fn remove_by_uid(game: &mut Game, uid: Uid) {
    let Some(pos) = game.board().find_by_uid(uid).map(|p| p.pos) else {
        return;
    };
    if let Some(piece) = game.board_mut().remove(pos) {
        bury(game, piece, pos);
    }
}

fn resurrect(game: &mut Game, color: Color, uid: Uid) {
    let grave = game.graveyard_mut(color);
    let Some(idx) = grave.iter().position(|(p, _)| p.uid == uid) else {
        return;
    };
    let (piece, sq) = grave.remove(idx);
    if let Some(v) = game.arcane_mut().necro_pool.get_mut(&color) {
        *v = v.saturating_sub(1);
    }
    let mut revived = piece;
    revived.pos = sq;
    game.board_mut().place(revived.clone());
    game.top_undo_mut().added.push(revived);
    tracing::debug!(uid, %sq, "necromancer resurrection");
}
