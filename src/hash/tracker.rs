// src/hash/tracker.rs
//
// Incremental Zobrist hash, repetition counter, and the lazy per-color
// attack bitboard cache. The closed `Move` enum means every move class
// is handled explicitly — no "unknown move, fall back to a full
// recompute" branch is needed, unlike the dynamically-typed original
// this is grounded on (`original_source/core/tracker.py`).

use std::cell::Cell;
use std::collections::HashMap;

use crate::board::{Board, Color, Piece};
use crate::hash::zobrist::{castle_hash, ep_file_to_hash, ep_key, psq_key, side_key};
use crate::moves::types::Move;

pub struct PositionTracker {
    hash: u64,
    castle_rights: u8,
    ep_file: Option<u8>,
    rep: HashMap<u64, u32>,

    att_dirty: Cell<bool>,
    att_bb: Cell<[u64; 2]>,
}

impl PositionTracker {
    pub fn new() -> Self {
        PositionTracker {
            hash: 0,
            castle_rights: 0,
            ep_file: None,
            rep: HashMap::new(),
            att_dirty: Cell::new(true),
            att_bb: Cell::new([0, 0]),
        }
    }

    /// (Re)derive the tracker's state from scratch against `board`.
    /// Called once at game construction.
    pub fn sync_from_board(&mut self, board: &Board, side_to_move: Color) {
        self.castle_rights = board.castling_rights;
        self.ep_file = ep_file_to_hash(board, side_to_move);
        self.hash = self.recompute_hash(board, side_to_move);
        self.rep.clear();
        self.rep.insert(self.hash, 1);
        self.att_dirty.set(true);
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn repetitions_of_current(&self) -> u32 {
        self.rep.get(&self.hash).copied().unwrap_or(0)
    }

    pub fn recompute_hash(&self, board: &Board, side_to_move: Color) -> u64 {
        let mut h = 0u64;
        for p in board.all_pieces() {
            h ^= psq_key(p.color, p.kind, p.pos.index());
        }
        if side_to_move == Color::Black {
            h ^= side_key();
        }
        h ^= castle_hash(board.castling_rights);
        if let Some(f) = ep_file_to_hash(board, side_to_move) {
            h ^= ep_key(f);
        }
        h
    }

    pub fn is_attack_cache_dirty(&self) -> bool {
        self.att_dirty.get()
    }

    pub fn mark_attack_cache_dirty(&self) {
        self.att_dirty.set(true);
    }

    pub fn attack_bb(&self, color: Color) -> u64 {
        self.att_bb.get()[color as usize]
    }

    pub fn set_attack_bb(&self, white: u64, black: u64) {
        self.att_bb.set([white, black]);
        self.att_dirty.set(false);
    }

    /// Incrementally update the hash for the move that was just applied
    /// to `board` (post-state already reflects the move). `mover` is
    /// the pre-move actor, `captured` the primary victim if any.
    pub fn on_applied(&mut self, board: &Board, side_to_move: Color, mv: &Move, mover: &Piece, captured: Option<&Piece>) {
        let mut h = self.hash;
        h ^= castle_hash(self.castle_rights);
        if let Some(f) = self.ep_file {
            h ^= ep_key(f);
        }
        h ^= side_key();

        match mv {
            Move::RemoteCapture { to, .. } => {
                if let Some(cap) = captured {
                    h ^= psq_key(cap.color, cap.kind, to.index());
                }
            }
            Move::Castle { from, to, rook_from, rook_to } => {
                h ^= psq_key(mover.color, mover.kind, from.index());
                h ^= psq_key(mover.color, mover.kind, to.index());
                h ^= psq_key(mover.color, crate::board::PieceKind::Rook, rook_from.index());
                h ^= psq_key(mover.color, crate::board::PieceKind::Rook, rook_to.index());
            }
            Move::EnPassant { from, to, captured_sq } => {
                h ^= psq_key(mover.color, mover.kind, from.index());
                h ^= psq_key(mover.color, mover.kind, to.index());
                if let Some(cap) = captured {
                    h ^= psq_key(cap.color, cap.kind, captured_sq.index());
                }
            }
            Move::Promotion { from, to, promote_to } => {
                h ^= psq_key(mover.color, mover.kind, from.index());
                if let Some(cap) = captured {
                    h ^= psq_key(cap.color, cap.kind, to.index());
                }
                h ^= psq_key(mover.color, *promote_to, to.index());
            }
            Move::Normal { from, to, .. } => {
                h ^= psq_key(mover.color, mover.kind, from.index());
                if let Some(cap) = captured {
                    h ^= psq_key(cap.color, cap.kind, to.index());
                }
                h ^= psq_key(mover.color, mover.kind, to.index());
            }
        }

        self.castle_rights = board.castling_rights;
        self.ep_file = ep_file_to_hash(board, side_to_move);
        h ^= castle_hash(self.castle_rights);
        if let Some(f) = self.ep_file {
            h ^= ep_key(f);
        }

        self.hash = h;
        *self.rep.entry(h).or_insert(0) += 1;
    }

    /// Undo the repetition bookkeeping for the position being left.
    /// `board`/`side_to_move` must already reflect the fully-restored
    /// pre-move position (the caller runs this after `unapply`), so the
    /// new hash is simply recomputed rather than incrementally reversed.
    pub fn on_undone(&mut self, board: &Board, side_to_move: Color) {
        if let Some(count) = self.rep.get_mut(&self.hash) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.rep.remove(&self.hash);
            }
        }
        self.castle_rights = board.castling_rights;
        self.ep_file = ep_file_to_hash(board, side_to_move);
        self.hash = self.recompute_hash(board, side_to_move);
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        PositionTracker::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn sync_then_recompute_agree() {
        let board = Board::new();
        let mut t = PositionTracker::new();
        t.sync_from_board(&board, Color::White);
        assert_eq!(t.hash(), t.recompute_hash(&board, Color::White));
        assert_eq!(t.repetitions_of_current(), 1);
    }

    #[test]
    fn black_to_move_flips_side_key() {
        let board = Board::new();
        let mut white = PositionTracker::new();
        white.sync_from_board(&board, Color::White);
        let mut black = PositionTracker::new();
        black.sync_from_board(&board, Color::Black);
        assert_ne!(white.hash(), black.hash());
    }
}
