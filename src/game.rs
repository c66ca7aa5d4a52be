// src/game.rs
//
// The mutable engine state: board, side to move, undo stack, per-army
// arcane configuration/resources, the rule pipeline, and the position
// tracker. `push`/`pop` are the event-emitting variants (resolution
// cascade + hash/repetition tracking); `push_quiet`/`pop_quiet` skip
// both and are what `KingSafety` and perft use. Grounded in
// `original_source/core/game.py` and `original_source/arcane/game.py`.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arcane::{Ability, ArcaneState, DecisionProvider, DefaultDecisions, Element, PlayerConfig, ResolutionSystem};
use crate::board::{Board, Color, Piece, Square, Uid};
use crate::hash::PositionTracker;
use crate::moves::abilities;
use crate::moves::movegen;
use crate::moves::types::{Move, Undo};
use crate::rules::{self, Rule};
use crate::error::{EngineError, EngineResult};

pub struct Game {
    board: Board,
    side_to_move: Color,
    last_move: Option<Move>,
    stack: Vec<Undo>,
    rules: Vec<Box<dyn Rule>>,
    tracker: PositionTracker,
    configs: HashMap<Color, PlayerConfig>,
    arcane: ArcaneState,
    graveyards: HashMap<Color, Vec<(Piece, Square)>>,
    rng: StdRng,
    decisions: Box<dyn DecisionProvider>,
}

impl Game {
    /// Standard chess starting position with the given armies, decision
    /// provider, and RNG seed. Fails if either `PlayerConfig` violates
    /// the item/ability budget (§4.7).
    pub fn new(white: PlayerConfig, black: PlayerConfig, decisions: Box<dyn DecisionProvider>, seed: u64) -> EngineResult<Self> {
        Game::with_board(Board::new(), white, black, decisions, seed)
    }

    /// Same as `new` but with a caller-supplied board, for custom test
    /// positions and scenario setups. Side to move is always White;
    /// use `with_board_and_side` to bootstrap a position with Black to
    /// move (e.g. loaded from a FEN string).
    pub fn with_board(
        board: Board,
        white: PlayerConfig,
        black: PlayerConfig,
        decisions: Box<dyn DecisionProvider>,
        seed: u64,
    ) -> EngineResult<Self> {
        Game::with_board_and_side(board, Color::White, white, black, decisions, seed)
    }

    /// Same as `with_board`, but the side to move is explicit rather than
    /// always White. Needed to bootstrap positions (typically from FEN)
    /// where Black is on the move.
    pub fn with_board_and_side(
        board: Board,
        side_to_move: Color,
        white: PlayerConfig,
        black: PlayerConfig,
        decisions: Box<dyn DecisionProvider>,
        seed: u64,
    ) -> EngineResult<Self> {
        white.validate()?;
        black.validate()?;

        let redo_holders: Vec<(Uid, Color, crate::board::PieceKind)> =
            board.all_pieces().map(|p| (p.uid, p.color, p.kind)).collect();
        let arcane = ArcaneState::bootstrap(&white, &black, redo_holders);

        let mut tracker = PositionTracker::new();
        tracker.sync_from_board(&board, side_to_move);

        let mut configs = HashMap::new();
        configs.insert(Color::White, white);
        configs.insert(Color::Black, black);

        Ok(Game {
            board,
            side_to_move,
            last_move: None,
            stack: Vec::new(),
            rules: rules::pipeline(),
            tracker,
            configs,
            arcane,
            graveyards: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
            decisions,
        })
    }

    /// Standard chess, both armies Earth-elemental with empty loadouts:
    /// no arcane ability ever triggers. Used by tests that only care
    /// about base movement/legality.
    pub fn new_chess_only() -> Self {
        let inert = |e| PlayerConfig { element: e, items: Default::default(), loadout: Default::default() };
        Game::new(inert(Element::Earth), inert(Element::Earth), Box::new(DefaultDecisions), 1337)
            .expect("two inert Earth configs always validate")
    }

    // --- accessors -------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    pub fn config(&self, color: Color) -> &PlayerConfig {
        self.configs.get(&color).expect("both colors are configured at construction")
    }

    pub fn has_ability(&self, piece: &Piece, ability: Ability) -> bool {
        self.config(piece.color).loadout.has(ability, piece.kind)
    }

    pub fn arcane(&self) -> &ArcaneState {
        &self.arcane
    }

    pub fn arcane_mut(&mut self) -> &mut ArcaneState {
        &mut self.arcane
    }

    pub fn graveyard(&self, color: Color) -> &[(Piece, Square)] {
        self.graveyards.get(&color).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn graveyard_mut(&mut self, color: Color) -> &mut Vec<(Piece, Square)> {
        self.graveyards.entry(color).or_default()
    }

    pub fn decisions_mut(&mut self) -> &mut dyn DecisionProvider {
        self.decisions.as_mut()
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn top_undo_mut(&mut self) -> &mut Undo {
        self.stack.last_mut().expect("resolution only runs with an undo already pushed")
    }

    /// The move `n` plies back from the top of the stack (`n=1` is the
    /// move just applied). Mirrors `game._stack[-n]` in the original.
    pub fn nth_move_from_top(&self, n: usize) -> &Move {
        &self.stack[self.stack.len() - n].mv
    }

    pub fn zobrist_hash(&self) -> u64 {
        self.tracker.hash()
    }

    pub fn recompute_hash(&self) -> u64 {
        self.tracker.recompute_hash(&self.board, self.side_to_move)
    }

    pub fn is_threefold_repetition(&self) -> bool {
        self.tracker.repetitions_of_current() >= 3
    }

    // --- RNG ---------------------------------------------------------

    /// Draws `true` with probability `p`. Used for every misfire/RNG
    /// gate named in the elemental matrix.
    pub fn draw_bool(&mut self, p: f64) -> bool {
        self.rng.random::<f64>() < p
    }

    /// Draws a uniform index in `0..len`. `len` must be nonzero.
    pub fn draw_uniform_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    // --- elemental queries -------------------------------------------

    /// True iff `piece`'s own army is Air and the opponent is not
    /// Earth: the sole gate on slider ray passthrough (§4.4). Not
    /// ability-scoped — purely elemental.
    pub fn slide_can_pass_through(&self, piece: &Piece) -> bool {
        let mover_el = self.config(piece.color).element;
        let defender_el = self.config(piece.color.opponent()).element;
        mover_el == Element::Air && defender_el != Element::Earth
    }

    /// The second, independent Lightning-vs-Air draw gating whether a
    /// Chain Kill remote capture actually lands, distinct from the
    /// Resolution System's own offensive-trigger misfire roll.
    /// Grounded in `original_source/arcane/moves.py::arcane_remote_capture_should_capture`.
    pub(crate) fn remote_capture_should_capture(&mut self, attacker: Color, defender: Color) -> bool {
        let attacker_el = self.config(attacker).element;
        let defender_el = self.config(defender).element;
        if defender_el == Element::Earth && attacker_el != Element::Fire {
            return false;
        }
        if attacker_el == Element::Fire && defender_el == Element::Water {
            return false;
        }
        if attacker_el == Element::Lightning && defender_el == Element::Air {
            return self.draw_bool(0.5);
        }
        true
    }

    fn remote_capture_gate(&mut self, mv: &Move, mover: &Piece) -> Option<bool> {
        if let Move::RemoteCapture { to, .. } = mv {
            if let Some(target) = self.board.piece_at(*to) {
                if target.color != mover.color {
                    return Some(self.remote_capture_should_capture(mover.color, target.color));
                }
            }
        }
        None
    }

    // --- move generation ----------------------------------------------

    pub fn pseudo_legal_moves(&self, color: Color) -> Vec<Move> {
        movegen::pseudo_legal_moves(self, color)
    }

    /// Pseudo-legal moves run through the full rule pipeline: ChainKill
    /// injection, CaptureDefense vetoes, KingSafety self-check filter.
    pub fn legal_moves(&mut self, color: Color) -> Vec<Move> {
        let mut moves = movegen::pseudo_legal_moves(self, color);
        let rules = std::mem::take(&mut self.rules);
        for rule in &rules {
            moves = rule.apply(self, color, moves);
        }
        self.rules = rules;
        moves
    }

    // --- push/pop ------------------------------------------------------

    fn resolve_mover(&self, mv: &Move) -> EngineResult<Piece> {
        let mover = self
            .board
            .piece_at(mv.from_sq())
            .cloned()
            .ok_or(EngineError::IllegalMove { mover_color: self.side_to_move })?;
        if mover.color != self.side_to_move {
            return Err(EngineError::IllegalMove { mover_color: self.side_to_move });
        }
        Ok(mover)
    }

    /// Apply `mv`, run the Resolution System's capture cascade, and
    /// update the Zobrist/repetition tracker. The tracker is updated
    /// before the resolution cascade runs, so its re-entrant
    /// `push`/`pop` calls (Redo rewind) always see a consistent,
    /// already-committed position rather than a half-applied one.
    ///
    /// If the `DecisionProvider` returns `Err(NeedDecision)` at any of
    /// the resolution cascade's solicitation points, every effect this
    /// call (and any nested Redo replay) applied is unwound via `pop`
    /// until the undo stack is back at its pre-apply depth, and
    /// `EngineError::NeedDecision` is returned instead (§5, §7). The
    /// position is left exactly as it was before `push` was called.
    pub fn push(&mut self, mv: Move) -> EngineResult<()> {
        let pre_apply_depth = self.stack.len();
        let mover = self.resolve_mover(&mv)?;

        let legal = self.legal_moves(self.side_to_move);
        if !legal.iter().any(|m| m.structurally_equal(&mv)) {
            return Err(EngineError::IllegalMove { mover_color: self.side_to_move });
        }

        let remote_gate = self.remote_capture_gate(&mv, &mover);
        let prev_side = self.side_to_move;
        let prev_last_move = self.last_move.clone();
        let mut undo = crate::moves::execute::apply_move(&mv, &mut self.board, prev_side, prev_last_move, remote_gate);

        self.side_to_move = prev_side.opponent();
        self.last_move = Some(mv.clone());
        crate::moves::execute::update_clocks(&mut self.board, prev_side, &mut undo);

        let captured = undo.captured_piece.clone();
        self.stack.push(undo);

        self.tracker.on_applied(&self.board, self.side_to_move, &mv, &mover, captured.as_ref());
        self.tracker.mark_attack_cache_dirty();

        tracing::debug!(mv = %mv, mover = mover.uid, "move applied");
        match ResolutionSystem.on_move_applied(self, &mv, &mover, captured.as_ref()) {
            Ok(()) => Ok(()),
            Err(decision) => {
                tracing::debug!(?decision, pre_apply_depth, "rewinding to pre-apply depth");
                while self.stack.len() > pre_apply_depth {
                    self.pop().expect("rewind: stack only grows during apply, never below entry depth");
                }
                Err(EngineError::NeedDecision(decision))
            }
        }
    }

    /// Reverse the most recently applied move, restoring board state,
    /// clocks, per-piece meta, and any arcane snapshot the resolution
    /// cascade recorded. Panics via `EmptyUndo` if the stack is empty.
    pub fn pop(&mut self) -> EngineResult<()> {
        let undo = self.stack.pop().ok_or(EngineError::EmptyUndo)?;

        self.side_to_move = undo.prev_side;
        self.last_move = undo.prev_last_move.clone();
        crate::moves::execute::restore_clocks(&mut self.board, &undo);
        crate::moves::execute::unapply(&mut self.board, &undo);

        for (uid, meta) in &undo.meta_snapshots {
            if let Some(p) = self.board.find_by_uid_mut(*uid) {
                p.meta = meta.clone();
            }
        }
        if let Some(snapshot) = &undo.extras.arcane_undoable {
            for (color, base) in &snapshot.necro_pool_base {
                let bonus = self.arcane.necro_bonus.get(color).copied().unwrap_or(0);
                self.arcane.necro_pool.insert(*color, base + bonus);
            }
            for (color, base) in &snapshot.necro_max_base {
                let bonus = self.arcane.necro_bonus.get(color).copied().unwrap_or(0);
                self.arcane.necro_max.insert(*color, base + bonus);
            }
            self.graveyards = snapshot.graveyard.clone();
        }

        self.tracker.on_undone(&self.board, self.side_to_move);
        self.tracker.mark_attack_cache_dirty();
        tracing::debug!(mv = %undo.mv, "move undone");
        Ok(())
    }

    /// Apply `mv` without running the resolution cascade or updating
    /// the Zobrist/repetition tracker; only the attack-cache dirty bit
    /// is set. Used by `KingSafety`'s self-check probe and by perft.
    pub fn push_quiet(&mut self, mv: Move) -> EngineResult<()> {
        let mover = self.resolve_mover(&mv)?;
        let remote_gate = self.remote_capture_gate(&mv, &mover);
        let prev_side = self.side_to_move;
        let prev_last_move = self.last_move.clone();
        let mut undo = crate::moves::execute::apply_move(&mv, &mut self.board, prev_side, prev_last_move, remote_gate);

        self.side_to_move = prev_side.opponent();
        self.last_move = Some(mv);
        crate::moves::execute::update_clocks(&mut self.board, prev_side, &mut undo);

        self.stack.push(undo);
        self.tracker.mark_attack_cache_dirty();
        Ok(())
    }

    pub fn pop_quiet(&mut self) -> EngineResult<()> {
        let undo = self.stack.pop().ok_or(EngineError::EmptyUndo)?;
        self.side_to_move = undo.prev_side;
        self.last_move = undo.prev_last_move.clone();
        crate::moves::execute::restore_clocks(&mut self.board, &undo);
        crate::moves::execute::unapply(&mut self.board, &undo);
        for (uid, meta) in &undo.meta_snapshots {
            if let Some(p) = self.board.find_by_uid_mut(*uid) {
                p.meta = meta.clone();
            }
        }
        self.tracker.mark_attack_cache_dirty();
        Ok(())
    }

    // --- attacks / check -------------------------------------------------

    /// True if any `by`-colored piece pseudo-legally attacks `sq`.
    /// Rebuilds the lazily-cached per-color attack bitboards first if
    /// the position changed since the last rebuild (§4.5).
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        if self.tracker.is_attack_cache_dirty() {
            self.rebuild_attack_cache();
        }
        (self.tracker.attack_bb(by) >> sq.index()) & 1 != 0
    }

    pub fn in_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.board.king_square(color), color.opponent())
    }

    /// A read-only view of the current state (§6), for an embedding host
    /// to serialize or diff against a later snapshot. `checkmate` runs a
    /// full `legal_moves` probe, so this takes `&mut self` like any other
    /// legality query.
    pub fn snapshot(&mut self) -> crate::snapshot::StateSnapshot {
        use crate::snapshot::{ArcaneResourceSnapshot, StateSnapshot};

        let side = self.side_to_move;
        let check = self.in_check(side);
        let checkmate = check && self.legal_moves(side).is_empty();

        let arcane = [Color::White, Color::Black]
            .into_iter()
            .map(|c| {
                (
                    c,
                    ArcaneResourceSnapshot {
                        necro_pool: self.arcane.necro_pool.get(&c).copied().unwrap_or(0),
                        necro_max: self.arcane.necro_max.get(&c).copied().unwrap_or(0),
                        solar_uses: self.arcane.solar_uses.get(&c).copied().unwrap_or(0),
                    },
                )
            })
            .collect();
        let graveyards = [Color::White, Color::Black]
            .into_iter()
            .map(|c| (c, self.graveyard(c).to_vec()))
            .collect();

        StateSnapshot::build(
            side,
            self.last_move.clone(),
            self.board.all_pieces().cloned(),
            self.stack.len() as u32,
            self.board.halfmove_clock,
            self.board.fullmove_number,
            check,
            checkmate,
            graveyards,
            arcane,
            self.arcane.redo_charges.clone(),
        )
    }

    fn rebuild_attack_cache(&self) {
        let mut bb = [0u64; 2];
        for p in self.board.all_pieces() {
            for sq in abilities::generate_attacks(p, self) {
                bb[p.color as usize] |= 1u64 << sq.index();
            }
        }
        self.tracker.set_attack_bb(bb[0], bb[1]);
    }
}
