// src/snapshot.rs
//
// The read-only state snapshot and its `diff` operation (§6): the data
// shape an embedding host (the out-of-scope JSON facade) would consume,
// kept in scope here as plain serde-derived structs with no wire format
// opinion of their own. Grounded in `original_source/core/state.py`'s
// snapshot/diff shape; `serde`+`bincode` play the same checkpoint role
// the teacher's stack gives them for polyglot book entries (DESIGN.md).

use std::collections::HashMap;

use crate::board::{Color, Meta, Piece, PieceKind, Uid};
use crate::moves::types::Move;
use crate::square::Square;

/// One piece's externally-visible state, keyed by `uid` in `StateSnapshot::pieces`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PieceSnapshot {
    pub color: Color,
    pub kind: PieceKind,
    pub pos: Square,
    pub has_moved: bool,
    pub meta: Meta,
    pub symbol: char,
}

impl PieceSnapshot {
    fn from_piece(p: &Piece) -> Self {
        PieceSnapshot {
            color: p.color,
            kind: p.kind,
            pos: p.pos,
            has_moved: p.has_moved,
            meta: p.meta.clone(),
            symbol: p.kind.symbol(p.color),
        }
    }
}

/// A side's arcane resource levels at the moment of the snapshot.
/// Redo is per-piece rather than per-side, so it is keyed by uid here
/// rather than folded into this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArcaneResourceSnapshot {
    pub necro_pool: u32,
    pub necro_max: u32,
    pub solar_uses: u32,
}

/// A read-only view of engine state, consumed by the (out-of-scope)
/// JSON facade. `ply` is the undo stack depth, i.e. the number of
/// plies played since the position this `Game` was constructed with.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateSnapshot {
    pub side_to_move: Color,
    pub last_move: Option<Move>,
    pub pieces: HashMap<Uid, PieceSnapshot>,
    pub ply: u32,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub check: bool,
    pub checkmate: bool,
    pub graveyards: HashMap<Color, Vec<(Piece, Square)>>,
    pub arcane: HashMap<Color, ArcaneResourceSnapshot>,
    pub redo_charges: HashMap<Uid, u32>,
}

impl StateSnapshot {
    pub(crate) fn build(
        side_to_move: Color,
        last_move: Option<Move>,
        pieces: impl Iterator<Item = Piece>,
        ply: u32,
        halfmove_clock: u32,
        fullmove_number: u32,
        check: bool,
        checkmate: bool,
        graveyards: HashMap<Color, Vec<(Piece, Square)>>,
        arcane: HashMap<Color, ArcaneResourceSnapshot>,
        redo_charges: HashMap<Uid, u32>,
    ) -> Self {
        StateSnapshot {
            side_to_move,
            last_move,
            pieces: pieces.map(|p| (p.uid, PieceSnapshot::from_piece(&p))).collect(),
            ply,
            halfmove_clock,
            fullmove_number,
            check,
            checkmate,
            graveyards,
            arcane,
            redo_charges,
        }
    }
}

/// One piece's position change between two snapshots, in `SnapshotDiff::moved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MovedEntry {
    pub uid: Uid,
    pub from: Square,
    pub to: Square,
}

/// One piece's meta change between two snapshots, in `SnapshotDiff::meta_changed`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetaChangedEntry {
    pub uid: Uid,
    pub before: Meta,
    pub after: Meta,
}

/// `diff(before, after)`'s result: every uid added, removed, moved, or
/// meta-changed between two snapshots, keyed on uid (§6).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotDiff {
    pub added: Vec<Uid>,
    pub removed: Vec<Uid>,
    pub moved: Vec<MovedEntry>,
    pub meta_changed: Vec<MetaChangedEntry>,
}

/// Compare two snapshots (typically before/after one `push`) and report
/// which pieces appeared, disappeared, moved, or changed meta.
pub fn diff(before: &StateSnapshot, after: &StateSnapshot) -> SnapshotDiff {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut moved = Vec::new();
    let mut meta_changed = Vec::new();

    for (&uid, after_piece) in &after.pieces {
        match before.pieces.get(&uid) {
            None => added.push(uid),
            Some(before_piece) => {
                if before_piece.pos != after_piece.pos {
                    moved.push(MovedEntry { uid, from: before_piece.pos, to: after_piece.pos });
                }
                if before_piece.meta != after_piece.meta {
                    meta_changed.push(MetaChangedEntry {
                        uid,
                        before: before_piece.meta.clone(),
                        after: after_piece.meta.clone(),
                    });
                }
            }
        }
    }
    for &uid in before.pieces.keys() {
        if !after.pieces.contains_key(&uid) {
            removed.push(uid);
        }
    }

    added.sort_unstable();
    removed.sort_unstable();
    moved.sort_unstable_by_key(|m| m.uid);
    meta_changed.sort_unstable_by_key(|m| m.uid);

    SnapshotDiff { added, removed, moved, meta_changed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;

    #[test]
    fn snapshot_of_startpos_has_32_pieces_no_check_no_checkmate() {
        let mut game = Game::new_chess_only();
        let snap = game.snapshot();
        assert_eq!(snap.pieces.len(), 32);
        assert!(!snap.check);
        assert!(!snap.checkmate);
        assert_eq!(snap.ply, 0);
        assert_eq!(snap.side_to_move, Color::White);
    }

    #[test]
    fn diff_after_one_push_reports_exactly_one_move() {
        let mut game = Game::new_chess_only();
        let before = game.snapshot();
        let mv = game.legal_moves(Color::White).into_iter().next().unwrap();
        let from = mv.from_sq();
        let to = mv.to_sq();
        game.push(mv).unwrap();
        let after = game.snapshot();

        let d = diff(&before, &after);
        assert!(d.added.is_empty());
        assert!(d.removed.is_empty());
        assert_eq!(d.moved.len(), 1);
        assert_eq!(d.moved[0].from, from);
        assert_eq!(d.moved[0].to, to);
    }

    #[test]
    fn snapshot_round_trips_through_bincode() {
        let mut game = Game::new_chess_only();
        let snap = game.snapshot();
        let bytes = bincode::serialize(&snap).expect("snapshot serializes");
        let back: StateSnapshot = bincode::deserialize(&bytes).expect("snapshot deserializes");
        assert_eq!(back, snap);
    }

    #[test]
    fn checkmate_flag_is_set_for_fools_mate() {
        let mut game = Game::new_chess_only();
        let moves = ["f2f3", "e7e5", "g2g4", "d8h4"];
        for m in moves {
            let (from, to) = m.split_at(2);
            let from: Square = from.parse().unwrap();
            let to: Square = to.parse().unwrap();
            let color = game.side_to_move();
            let mv = game
                .legal_moves(color)
                .into_iter()
                .find(|mv| mv.from_sq() == from && mv.to_sq() == to)
                .unwrap_or_else(|| panic!("{m} should be legal"));
            game.push(mv).unwrap();
        }
        let snap = game.snapshot();
        assert!(snap.check);
        assert!(snap.checkmate);
    }
}
